//! Two-point scale calibration
//!
//! Converts two reference clicks and a user-entered real length into a
//! real-units-per-pixel ratio. Shapes keep pixel-space points, so replacing
//! the calibration rescales every stored measurement at once.

use crate::error::{TakeoffError, TakeoffResult};
use crate::geometry::{distance, ImagePoint};

/// Default unit name for calibrated lengths
pub const DEFAULT_UNIT: &str = "m";

/// Compute the real-units-per-pixel ratio for a reference segment
///
/// Fails with [`TakeoffError::DegenerateCalibration`] when the points
/// coincide or `real_length` is not a positive finite number.
pub fn calibrate(p1: ImagePoint, p2: ImagePoint, real_length: f64) -> TakeoffResult<f64> {
    let pixel_distance = distance(p1, p2);
    if pixel_distance <= 0.0 || !real_length.is_finite() || real_length <= 0.0 {
        return Err(TakeoffError::DegenerateCalibration);
    }
    Ok(real_length / pixel_distance)
}

/// Active scale calibration for the loaded base image
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Calibration {
    /// First reference point (base-image space)
    p1: ImagePoint,
    /// Second reference point (base-image space)
    p2: ImagePoint,
    /// Known distance between the points in real-world units
    real_length: f64,
    /// Unit of measurement (e.g., "m", "ft")
    unit: String,
    /// Real-world units per base-image pixel
    ratio: f64,
}

impl Calibration {
    /// Create a two-point calibration
    pub fn two_point(
        p1: ImagePoint,
        p2: ImagePoint,
        real_length: f64,
        unit: impl Into<String>,
    ) -> TakeoffResult<Self> {
        let ratio = calibrate(p1, p2, real_length)?;
        Ok(Self { p1, p2, real_length, unit: unit.into(), ratio })
    }

    /// Real-world units per base-image pixel
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Get the measurement unit
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Reference segment the calibration was derived from
    pub fn reference(&self) -> (ImagePoint, ImagePoint) {
        (self.p1, self.p2)
    }

    /// Entered real-world length of the reference segment
    pub fn real_length(&self) -> f64 {
        self.real_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_point_ratio() {
        let p1 = ImagePoint::new(0.0, 0.0);
        let p2 = ImagePoint::new(10.0, 0.0);
        assert_eq!(calibrate(p1, p2, 5.0), Ok(0.5));
        assert_eq!(calibrate(p1, p2, 20.0), Ok(2.0));
    }

    #[test]
    fn test_coincident_points_are_degenerate() {
        let p = ImagePoint::new(42.0, 7.0);
        assert_eq!(calibrate(p, p, 5.0), Err(TakeoffError::DegenerateCalibration));
    }

    #[test]
    fn test_non_positive_length_is_degenerate() {
        let p1 = ImagePoint::new(0.0, 0.0);
        let p2 = ImagePoint::new(0.0, 8.0);
        assert_eq!(calibrate(p1, p2, 0.0), Err(TakeoffError::DegenerateCalibration));
        assert_eq!(calibrate(p1, p2, -1.0), Err(TakeoffError::DegenerateCalibration));
        assert_eq!(calibrate(p1, p2, f64::NAN), Err(TakeoffError::DegenerateCalibration));
    }

    #[test]
    fn test_calibration_keeps_reference() {
        let calibration = Calibration::two_point(
            ImagePoint::new(0.0, 0.0),
            ImagePoint::new(0.0, 100.0),
            10.0,
            DEFAULT_UNIT,
        )
        .unwrap();

        assert_eq!(calibration.ratio(), 0.1);
        assert_eq!(calibration.unit(), "m");
        assert_eq!(calibration.real_length(), 10.0);
    }
}
