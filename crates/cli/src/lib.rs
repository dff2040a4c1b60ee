pub mod script;
pub mod source;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use takeoff_core::{
    export_rows_csv, CsvExportConfig, ExportRow, MeasureMode, Preferences, Session,
};
use takeoff_render::{OverlayRenderer, OverlayRequest};
use takeoff_storage::Storage;
use tracing_subscriber::EnvFilter;

use crate::script::{apply_step, Draft, Script};
use crate::source::{format_name, ImageSource, RasterSource};

#[derive(Debug, Parser)]
#[command(name = "takeoff-cli")]
#[command(about = "Site plan measurement and quantity takeoff")]
pub struct Cli {
    /// Log more detail to stderr (repeat for debug output).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print machine-readable plan image metadata.
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Replay an interaction script against a plan and print the takeoff.
    Replay {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        /// Write the rendered overlay as PNG.
        #[arg(long)]
        overlay: Option<PathBuf>,
        /// Write the quantity table as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Load and save preferences in this directory instead of the platform data directory.
        #[arg(long, value_name = "DIR")]
        prefs_dir: Option<PathBuf>,
        /// Stop at the first rejected step.
        #[arg(long)]
        strict: bool,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    path: String,
    format: Option<&'static str>,
    width: u32,
    height: u32,
}

#[derive(Debug, Serialize)]
struct ReplayOutput {
    image: ImageOutput,
    mode: MeasureMode,
    zoom: f64,
    calibration: Option<CalibrationOutput>,
    shape_count: usize,
    pending_points: usize,
    /// Shape numbers that can be copied as subtractions
    copy_sources: Vec<usize>,
    /// `None` until a scale calibration exists
    rows: Option<Vec<ExportRow>>,
    totals: Option<Vec<TotalOutput>>,
    rejected: Vec<RejectedStep>,
}

#[derive(Debug, Serialize)]
struct ImageOutput {
    width: u32,
    height: u32,
}

#[derive(Debug, Serialize)]
struct CalibrationOutput {
    ratio: f64,
    real_length: f64,
    unit: String,
}

#[derive(Debug, Serialize)]
struct TotalOutput {
    label: String,
    unit: String,
    total: String,
}

#[derive(Debug, Serialize)]
struct RejectedStep {
    step: usize,
    op: &'static str,
    error: String,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Info { file } => run_info(&file),
        Commands::Replay { image, script, overlay, csv, prefs_dir, strict } => run_replay(
            &image,
            &script,
            ReplayTargets { overlay: overlay.as_deref(), csv: csv.as_deref() },
            prefs_dir.as_deref(),
            strict,
        ),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // `run` may be called more than once per process
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn run_info(file: &Path) -> Result<()> {
    let image = RasterSource.load(file).context("failed to load plan image")?;

    let payload = InfoOutput {
        path: file.display().to_string(),
        format: format_name(file),
        width: image.width(),
        height: image.height(),
    };

    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");
    Ok(())
}

struct ReplayTargets<'a> {
    overlay: Option<&'a Path>,
    csv: Option<&'a Path>,
}

fn run_replay(
    image_path: &Path,
    script_path: &Path,
    targets: ReplayTargets<'_>,
    prefs_dir: Option<&Path>,
    strict: bool,
) -> Result<()> {
    let storage = match prefs_dir {
        Some(dir) => Some(Storage::with_root(dir)),
        None => match Storage::from_default_project() {
            Ok(storage) => Some(storage),
            Err(error) => {
                tracing::warn!("preferences will not be persisted: {error}");
                None
            }
        },
    };
    let preferences = match &storage {
        Some(storage) => storage.load_preferences().context("failed to load preferences")?,
        None => Preferences::default(),
    };

    let image = RasterSource.load(image_path).context("failed to load plan image")?;
    let script_text = fs::read_to_string(script_path)
        .with_context(|| format!("failed to read script {}", script_path.display()))?;
    let script: Script = serde_json::from_str(&script_text)
        .with_context(|| format!("invalid script {}", script_path.display()))?;

    let mut session = Session::new(preferences.clone());
    session.load_base_image(image);
    let mut draft = Draft::default();
    let mut rejected = Vec::new();

    for (index, step) in script.steps.iter().enumerate() {
        let number = index + 1;
        if let Err(error) = apply_step(&mut session, &mut draft, step) {
            if strict {
                return Err(error.context(format!("step {number} ({}) was rejected", step.name())));
            }
            tracing::warn!(step = number, op = step.name(), "step rejected: {error:#}");
            rejected.push(RejectedStep { step: number, op: step.name(), error: format!("{error:#}") });
        }
    }

    if let Some(storage) = &storage {
        if session.preferences() != &preferences {
            storage.save_preferences(session.preferences()).context("failed to save preferences")?;
        }
    }

    if let Some(path) = targets.overlay {
        write_overlay(&session, &draft, path)?;
    }
    if let Some(path) = targets.csv {
        write_csv(&session, path)?;
    }

    let payload = replay_output(&session, rejected);
    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");
    Ok(())
}

fn replay_output(session: &Session, rejected: Vec<RejectedStep>) -> ReplayOutput {
    let (width, height) =
        session.base_image().map_or((0, 0), |base| (base.width(), base.height()));

    ReplayOutput {
        image: ImageOutput { width, height },
        mode: session.mode(),
        zoom: session.view().zoom(),
        calibration: session.calibration().map(|calibration| CalibrationOutput {
            ratio: calibration.ratio(),
            real_length: calibration.real_length(),
            unit: calibration.unit().to_string(),
        }),
        shape_count: session.store().len(),
        pending_points: session.pending_points().len(),
        copy_sources: session.store().subtraction_sources().iter().map(|index| index + 1).collect(),
        rows: session.export_rows().ok(),
        totals: session.totals().ok().map(|totals| {
            totals
                .iter()
                .map(|total| TotalOutput {
                    label: total.label.clone(),
                    unit: total.unit.clone(),
                    total: total.formatted_total(),
                })
                .collect()
        }),
        rejected,
    }
}

fn write_overlay(session: &Session, draft: &Draft, path: &Path) -> Result<()> {
    let mode = session.mode();
    let label = draft.label(session.preferences(), mode.shape_kind());
    let request = OverlayRequest::from_session(
        session,
        draft.style(session.preferences(), &label),
        draft.subtraction_in(mode),
    )?;
    let overlay = OverlayRenderer::new().render(&request).context("failed to render overlay")?;

    ensure_parent(path)?;
    overlay
        .save(path)
        .with_context(|| format!("failed to write image to {}", path.display()))?;
    Ok(())
}

fn write_csv(session: &Session, path: &Path) -> Result<()> {
    let rows = session.export_rows().context("cannot export quantities")?;

    ensure_parent(path)?;
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    export_rows_csv(BufWriter::new(file), &rows, &CsvExportConfig::default())
        .with_context(|| format!("failed to write CSV to {}", path.display()))?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
