//! Interaction scripts
//!
//! A script is a JSON list of user interactions replayed against a session,
//! in the order an interactive user would perform them.

use anyhow::{bail, Result};
use serde::Deserialize;
use takeoff_core::config::clamp_stroke_width;
use takeoff_core::{
    Color, DevicePoint, MeasureMode, Preferences, Session, ShapeKind, ShapePatch, ShapeStyle,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Switch the interaction mode
    Mode { mode: MeasureMode },
    /// Click at device coordinates on the rendered bitmap
    Click { x: f64, y: f64 },
    /// Calibrate from the two pending points
    Calibrate { length: f64 },
    /// Choose the item for the next committed shape
    Item {
        label: String,
        #[serde(default)]
        color: Option<Color>,
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        subtraction: bool,
    },
    /// Commit the pending shape with the current item
    Commit,
    Undo,
    Clear,
    Zoom { zoom: f64 },
    ZoomStep { steps: i32 },
    ZoomReset,
    Labels { show: bool },
    /// Copy the shape numbered `no` as a subtraction under `label`
    Copy { no: usize, label: String },
    /// Edit metadata of the shape numbered `no`
    Edit {
        no: usize,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        subtraction: Option<bool>,
        #[serde(default)]
        remarks: Option<String>,
        #[serde(default)]
        link_url: Option<String>,
    },
    /// Register a custom item name
    AddItem { name: String },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Mode { .. } => "mode",
            Step::Click { .. } => "click",
            Step::Calibrate { .. } => "calibrate",
            Step::Item { .. } => "item",
            Step::Commit => "commit",
            Step::Undo => "undo",
            Step::Clear => "clear",
            Step::Zoom { .. } => "zoom",
            Step::ZoomStep { .. } => "zoom_step",
            Step::ZoomReset => "zoom_reset",
            Step::Labels { .. } => "labels",
            Step::Copy { .. } => "copy",
            Step::Edit { .. } => "edit",
            Step::AddItem { .. } => "add_item",
        }
    }
}

/// Item selection carried between steps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub label: Option<String>,
    pub color: Option<Color>,
    pub width: Option<u32>,
    pub subtraction: bool,
}

impl Draft {
    /// Label for the next shape; defaults to the first item offered for `kind`
    pub fn label(&self, preferences: &Preferences, kind: Option<ShapeKind>) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        kind.and_then(|kind| preferences.item_options(kind).first().map(|name| name.to_string()))
            .unwrap_or_default()
    }

    /// Style for the next shape: preset color and width unless overridden
    pub fn style(&self, preferences: &Preferences, label: &str) -> ShapeStyle {
        let preset = preferences.style_for(label);
        ShapeStyle::new(
            self.color.unwrap_or(preset.color),
            self.width.map_or(preset.stroke_width, clamp_stroke_width),
        )
    }

    /// Subtraction only applies where the active mode supports it
    pub fn subtraction_in(&self, mode: MeasureMode) -> bool {
        self.subtraction && mode.shape_kind().is_some_and(|kind| kind.policy().supports_subtraction)
    }
}

/// Apply one step to the session
pub fn apply_step(session: &mut Session, draft: &mut Draft, step: &Step) -> Result<()> {
    match step {
        Step::Mode { mode } => session.set_mode(*mode),
        Step::Click { x, y } => {
            session.click(DevicePoint::new(*x, *y))?;
        }
        Step::Calibrate { length } => {
            session.apply_calibration(*length)?;
        }
        Step::Item { label, color, width, subtraction } => {
            *draft = Draft {
                label: Some(label.clone()),
                color: *color,
                width: *width,
                subtraction: *subtraction,
            };
        }
        Step::Commit => {
            let mode = session.mode();
            let label = draft.label(session.preferences(), mode.shape_kind());
            let style = draft.style(session.preferences(), &label);
            session.commit(label, style, draft.subtraction_in(mode))?;
        }
        Step::Undo => {
            session.undo();
        }
        Step::Clear => session.clear_all(),
        Step::Zoom { zoom } => {
            session.view_mut().set_zoom(*zoom);
        }
        Step::ZoomStep { steps } => {
            session.view_mut().step_zoom(*steps);
        }
        Step::ZoomReset => {
            session.view_mut().reset_zoom();
        }
        Step::Labels { show } => session.view_mut().show_labels = *show,
        Step::Copy { no, label } => {
            session.subtraction_copy(index_of(*no)?, label.clone())?;
        }
        Step::Edit { no, label, subtraction, remarks, link_url } => {
            let patch = ShapePatch {
                label: label.clone(),
                subtraction: *subtraction,
                remarks: remarks.clone(),
                link_url: link_url.clone(),
            };
            session.update_shape(index_of(*no)?, patch)?;
        }
        Step::AddItem { name } => {
            if !session.preferences_mut().add_custom_item(name) {
                bail!("item name is blank or already listed: {name:?}");
            }
        }
    }
    Ok(())
}

fn index_of(no: usize) -> Result<usize> {
    match no.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("shape numbers start at 1"),
    }
}
