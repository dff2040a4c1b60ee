//! Presentational view state

use crate::builder::MeasureMode;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;
pub const DEFAULT_ZOOM: f64 = 0.5;
pub const ZOOM_STEP: f64 = 0.1;

/// Zoom, label visibility and active mode
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewState {
    zoom: f64,
    default_zoom: f64,
    pub show_labels: bool,
    /// Draw the calibration reference segment when one exists
    pub show_calibration: bool,
    pub active_mode: MeasureMode,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_default_zoom(DEFAULT_ZOOM)
    }
}

impl ViewState {
    /// View state whose reset target is `default_zoom` (clamped)
    pub fn with_default_zoom(default_zoom: f64) -> Self {
        let default_zoom = clamp_zoom(default_zoom);
        Self {
            zoom: default_zoom,
            default_zoom,
            show_labels: true,
            show_calibration: true,
            active_mode: MeasureMode::default(),
        }
    }

    /// Current zoom factor, always within [`MIN_ZOOM`, `MAX_ZOOM`]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn default_zoom(&self) -> f64 {
        self.default_zoom
    }

    /// Set the zoom, clamped to the supported range
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.zoom = clamp_zoom(zoom);
        self.zoom
    }

    /// Move the zoom by `steps` increments of [`ZOOM_STEP`]
    pub fn step_zoom(&mut self, steps: i32) -> f64 {
        let stepped = self.zoom + f64::from(steps) * ZOOM_STEP;
        // snap to the step grid
        self.set_zoom((stepped * 10.0).round() / 10.0)
    }

    pub fn reset_zoom(&mut self) -> f64 {
        self.zoom = self.default_zoom;
        self.zoom
    }
}

/// Clamp a zoom factor; non-finite input falls back to the default
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        DEFAULT_ZOOM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view() {
        let view = ViewState::default();
        assert_eq!(view.zoom(), 0.5);
        assert!(view.show_labels);
        assert_eq!(view.active_mode, MeasureMode::Scale);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = ViewState::default();
        assert_eq!(view.set_zoom(12.0), MAX_ZOOM);
        assert_eq!(view.set_zoom(0.0), MIN_ZOOM);
        assert_eq!(view.set_zoom(f64::NAN), DEFAULT_ZOOM);
    }

    #[test]
    fn test_step_and_reset() {
        let mut view = ViewState::default();
        assert_eq!(view.step_zoom(1), 0.6);
        assert_eq!(view.step_zoom(3), 0.9);
        assert_eq!(view.step_zoom(-20), MIN_ZOOM);
        assert_eq!(view.reset_zoom(), 0.5);
    }

    #[test]
    fn test_custom_default_zoom() {
        let mut view = ViewState::with_default_zoom(9.0);
        assert_eq!(view.zoom(), MAX_ZOOM);
        view.set_zoom(1.0);
        assert_eq!(view.reset_zoom(), MAX_ZOOM);
    }
}
