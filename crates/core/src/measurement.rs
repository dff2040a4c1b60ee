//! Quantity aggregation
//!
//! Turns stored pixel-space shapes plus the active calibration into
//! real-world quantities: one row per shape and one signed total per
//! `(label, unit)` group. Nothing is computed without a calibration; a
//! missing calibration is reported, never replaced by a 1:1 ratio.

use crate::annotation::{Shape, ShapeKind};
use crate::calibration::Calibration;
use crate::error::{TakeoffError, TakeoffResult};
use crate::policy::{format_magnitude, format_signed_total};
use crate::store::AnnotationStore;

/// Computed quantity for one committed shape
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct QuantityRow {
    /// 1-based display number (current history position)
    pub number: usize,
    pub kind: ShapeKind,
    pub label: String,
    /// Unsigned magnitude in real units
    pub value: f64,
    /// Unit symbol, e.g. `m` or `m²`
    pub unit: String,
    pub subtraction: bool,
    pub remarks: String,
    pub link_url: String,
}

impl QuantityRow {
    /// Contribution to the row's group total
    pub fn signed_value(&self) -> f64 {
        if self.subtraction {
            -self.value
        } else {
            self.value
        }
    }

    /// Magnitude to 2 decimals, flagged with a marker for subtractions
    pub fn formatted_value(&self) -> String {
        format_magnitude(self.value, self.subtraction)
    }
}

/// Signed total for all shapes sharing a label and unit
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GroupTotal {
    pub label: String,
    pub unit: String,
    pub total: f64,
}

impl GroupTotal {
    /// Display key, e.g. `Gravel (m²)`
    pub fn key(&self) -> String {
        format!("{} ({})", self.label, self.unit)
    }

    pub fn formatted_total(&self) -> String {
        format_signed_total(self.total)
    }
}

/// Row handed to tabular presentation and CSV export
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ExportRow {
    pub index: usize,
    pub label: String,
    pub formatted_value: String,
    pub unit_symbol: String,
    pub is_subtraction: bool,
    pub remarks: String,
    pub link_url: String,
}

impl From<&QuantityRow> for ExportRow {
    fn from(row: &QuantityRow) -> Self {
        Self {
            index: row.number,
            label: row.label.clone(),
            formatted_value: row.formatted_value(),
            unit_symbol: row.unit.clone(),
            is_subtraction: row.subtraction,
            remarks: row.remarks.clone(),
            link_url: row.link_url.clone(),
        }
    }
}

/// Computes quantities for stored shapes under an optional calibration
#[derive(Debug, Clone, Copy)]
pub struct QuantityAggregator<'a> {
    calibration: Option<&'a Calibration>,
}

impl<'a> QuantityAggregator<'a> {
    /// Create an aggregator for the current calibration state
    pub fn new(calibration: Option<&'a Calibration>) -> Self {
        Self { calibration }
    }

    fn calibration(&self) -> TakeoffResult<&'a Calibration> {
        self.calibration.ok_or(TakeoffError::CalibrationAbsent)
    }

    /// Unsigned real-world quantity of one shape
    pub fn shape_value(&self, shape: &Shape) -> TakeoffResult<f64> {
        let calibration = self.calibration()?;
        Ok(shape.kind().policy().real_quantity(shape.points(), calibration.ratio()))
    }

    /// One row per shape, in history order
    pub fn rows(&self, store: &AnnotationStore) -> TakeoffResult<Vec<QuantityRow>> {
        let calibration = self.calibration()?;

        Ok(store
            .numbered()
            .map(|(number, shape)| {
                let policy = shape.kind().policy();
                let metadata = shape.metadata();
                QuantityRow {
                    number,
                    kind: shape.kind(),
                    label: metadata.label.clone(),
                    value: policy.real_quantity(shape.points(), calibration.ratio()),
                    unit: policy.unit_symbol(calibration.unit()),
                    subtraction: metadata.subtraction,
                    remarks: metadata.remarks.clone(),
                    link_url: metadata.link_url.clone(),
                }
            })
            .collect())
    }

    /// Signed totals grouped by `(label, unit)` in first-appearance order
    pub fn totals(&self, store: &AnnotationStore) -> TakeoffResult<Vec<GroupTotal>> {
        let mut totals: Vec<GroupTotal> = Vec::new();

        for row in self.rows(store)? {
            match totals.iter_mut().find(|t| t.label == row.label && t.unit == row.unit) {
                Some(total) => total.total += row.signed_value(),
                None => totals.push(GroupTotal {
                    total: row.signed_value(),
                    label: row.label,
                    unit: row.unit,
                }),
            }
        }

        Ok(totals)
    }

    /// Rows formatted for tabular presentation
    pub fn export_rows(&self, store: &AnnotationStore) -> TakeoffResult<Vec<ExportRow>> {
        Ok(self.rows(store)?.iter().map(ExportRow::from).collect())
    }
}
