//! CSV export for takeoff rows
//!
//! Writes the per-shape quantity table so it can be opened in a
//! spreadsheet. Output starts with a UTF-8 byte order mark by default.

use crate::measurement::ExportRow;
use std::io::Write;

/// UTF-8 byte order mark
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column headers, in output order
pub const HEADERS: [&str; 7] = ["No", "Item", "Value", "Unit", "Subtraction", "Link", "Remarks"];

/// Error types for CSV export
#[derive(Debug, thiserror::Error)]
pub enum CsvExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CsvExportResult<T> = Result<T, CsvExportError>;

/// Configuration for CSV export
#[derive(Debug, Clone)]
pub struct CsvExportConfig {
    /// Include column headers in the output
    pub include_headers: bool,

    /// CSV delimiter character
    pub delimiter: u8,

    /// Prefix the output with a UTF-8 byte order mark
    pub byte_order_mark: bool,
}

impl Default for CsvExportConfig {
    fn default() -> Self {
        Self {
            include_headers: true,
            delimiter: b',',
            byte_order_mark: true,
        }
    }
}

/// Export quantity rows to CSV format
///
/// Values are the formatted magnitudes shown in the table, so a
/// subtraction appears as `▲ 10.00` with `Yes` in the subtraction column.
pub fn export_rows_csv<W: Write>(
    mut writer: W,
    rows: &[ExportRow],
    config: &CsvExportConfig,
) -> CsvExportResult<()> {
    if config.byte_order_mark {
        writer.write_all(BOM)?;
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(false)
        .from_writer(writer);

    if config.include_headers {
        csv_writer.write_record(HEADERS)?;
    }

    for row in rows {
        csv_writer.write_record([
            row.index.to_string().as_str(),
            row.label.as_str(),
            row.formatted_value.as_str(),
            row.unit_symbol.as_str(),
            if row.is_subtraction { "Yes" } else { "" },
            row.link_url.as_str(),
            row.remarks.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
