//! Error taxonomy for the takeoff engine
//!
//! Every variant is local and recoverable: the interaction layer reports it
//! to the user and the session keeps running.

use crate::builder::MeasureMode;

/// Errors produced by the measurement and annotation engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TakeoffError {
    /// Calibration points coincide or the real length is not positive.
    #[error("calibration points coincide or real length is not positive")]
    DegenerateCalibration,

    /// Commit attempted with too few pending points for the mode.
    #[error("{mode} needs {required} points, {actual} pending")]
    InsufficientPoints {
        mode: MeasureMode,
        required: &'static str,
        actual: usize,
    },

    /// Calibration applied while another mode is active.
    #[error("calibration is only applied in Scale mode ({0} is active)")]
    CalibrationModeMismatch(MeasureMode),

    /// Commit attempted in Scale mode, whose points feed the calibration.
    #[error("Scale mode points are applied as a calibration, not committed as a shape")]
    ScaleCommit,

    /// Subtraction copy requested on a non-area or already subtractive shape.
    #[error("shape at index {0} is not an additive area and cannot be copied as a subtraction")]
    InvalidSubtractionSource(usize),

    /// Subtraction flag set on a shape kind that has no subtractive meaning.
    #[error("distance shapes cannot be marked as subtractions")]
    SubtractionUnsupported,

    /// Quantities requested before a scale calibration exists.
    #[error("no scale calibration has been set")]
    CalibrationAbsent,

    /// No shape at the requested history index.
    #[error("no shape at index {0}")]
    ShapeNotFound(usize),

    /// Color string is not a `#RRGGBB` hex code.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Interaction that needs a base image before one was loaded.
    #[error("no base image loaded")]
    NoBaseImage,
}

pub type TakeoffResult<T> = Result<T, TakeoffError>;
