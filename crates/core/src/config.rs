//! User preferences
//!
//! Defaults for new sessions and shapes, plus the item catalogue offered when
//! labelling a shape. Persisted by the storage crate.

use serde::{Deserialize, Serialize};

use crate::annotation::{Color, ShapeKind, ShapeStyle};
use crate::calibration::DEFAULT_UNIT;
use crate::view::DEFAULT_ZOOM;

pub const MIN_STROKE_WIDTH: u32 = 1;
pub const MAX_STROKE_WIDTH: u32 = 10;
pub const DEFAULT_STROKE_WIDTH: u32 = 3;

/// Color for labels with no preset entry
pub const DEFAULT_ITEM_COLOR: Color = Color::rgb(0xef, 0x53, 0x50);

/// Named item with its drawing color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPreset {
    pub name: String,
    pub color: Color,
}

impl ItemPreset {
    pub fn new(name: &str, color: Color) -> Self {
        Self { name: name.to_string(), color }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub default_zoom: f64,
    pub default_stroke_width: u32,
    pub default_color: Color,
    pub show_labels: bool,
    pub length_unit: String,
    pub distance_items: Vec<ItemPreset>,
    pub area_items: Vec<ItemPreset>,
    pub custom_items: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_zoom: DEFAULT_ZOOM,
            default_stroke_width: DEFAULT_STROKE_WIDTH,
            default_color: DEFAULT_ITEM_COLOR,
            show_labels: true,
            length_unit: DEFAULT_UNIT.to_string(),
            distance_items: vec![
                ItemPreset::new("Block wall", Color::rgb(0x8d, 0x6e, 0x63)),
                ItemPreset::new("Fence", Color::rgb(0xa1, 0x88, 0x7f)),
                ItemPreset::new("Block + fence", Color::rgb(0x55, 0x8b, 0x2f)),
                ItemPreset::new("Boundary block", DEFAULT_ITEM_COLOR),
                ItemPreset::new("Curb", DEFAULT_ITEM_COLOR),
                ItemPreset::new("Retaining wall", DEFAULT_ITEM_COLOR),
            ],
            area_items: vec![
                ItemPreset::new("Concrete slab", Color::rgb(0xbd, 0xbd, 0xbd)),
                ItemPreset::new("Gravel", Color::rgb(0xff, 0xcc, 0x80)),
                ItemPreset::new("Artificial turf", Color::rgb(0x66, 0xbb, 0x6a)),
                ItemPreset::new("Weed sheet", Color::rgb(0x42, 0x42, 0x42)),
                ItemPreset::new("Tile", Color::rgb(0xd7, 0xcc, 0xc8)),
            ],
            custom_items: Vec::new(),
        }
    }
}

impl Preferences {
    /// Configured stroke width, clamped to the supported range
    pub fn stroke_width(&self) -> u32 {
        clamp_stroke_width(self.default_stroke_width)
    }

    /// Presets for one shape kind
    pub fn presets(&self, kind: ShapeKind) -> &[ItemPreset] {
        match kind {
            ShapeKind::Distance => &self.distance_items,
            ShapeKind::Area => &self.area_items,
        }
    }

    /// Item names offered for a kind: its presets, then custom items
    pub fn item_options(&self, kind: ShapeKind) -> Vec<&str> {
        self.presets(kind)
            .iter()
            .map(|preset| preset.name.as_str())
            .chain(self.custom_items.iter().map(String::as_str))
            .collect()
    }

    /// Add a custom item; returns `false` for blank or already-known names
    pub fn add_custom_item(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.custom_items.iter().any(|item| item == name) {
            return false;
        }
        self.custom_items.push(name.to_string());
        true
    }

    /// Preset color for a label, or the default color
    pub fn color_for(&self, label: &str) -> Color {
        self.distance_items
            .iter()
            .chain(&self.area_items)
            .find(|preset| preset.name == label)
            .map_or(self.default_color, |preset| preset.color)
    }

    /// Style a new shape with this label would get
    pub fn style_for(&self, label: &str) -> ShapeStyle {
        ShapeStyle::new(self.color_for(label), self.stroke_width())
    }
}

pub fn clamp_stroke_width(width: u32) -> u32 {
    width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
}
