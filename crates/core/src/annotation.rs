//! Shape data model
//!
//! Committed shapes carry immutable geometry with editable metadata.
//! All coordinates are stored in base-image pixel space.

use crate::error::{TakeoffError, TakeoffResult};
use crate::geometry::ImagePoint;

/// Kind of committed measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Open polyline measured by its length
    Distance,
    /// Closed polygon measured by its enclosed area
    Area,
}

/// RGBA color representation
///
/// Serialized as a `#RRGGBB` hex string; alpha is a rendering concern only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a `#RRGGBB` (or `RRGGBB`) hex code into an opaque color
    pub fn from_hex(hex: &str) -> TakeoffResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(TakeoffError::InvalidColor(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| TakeoffError::InvalidColor(hex.to_string()))
        };

        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Format as an uppercase `#RRGGBB` hex code
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
}

impl TryFrom<String> for Color {
    type Error = TakeoffError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_hex()
    }
}

/// Rendering style fixed at commit time
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeStyle {
    /// Base color for outline, fill and label
    pub color: Color,
    /// Stroke width in device pixels
    pub stroke_width: u32,
}

impl ShapeStyle {
    pub fn new(color: Color, stroke_width: u32) -> Self {
        Self { color, stroke_width }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self { color: Color::RED, stroke_width: 3 }
    }
}

/// Editable shape metadata
///
/// Changing metadata never touches geometry.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeMetadata {
    /// Item name; shapes sharing a label are totalled together
    pub label: String,
    /// Deduct this shape from its label's running total
    pub subtraction: bool,
    /// Free-text remarks
    pub remarks: String,
    /// Reference URL (product page, spec sheet)
    pub link_url: String,
}

impl ShapeMetadata {
    /// Metadata with only a label set
    pub fn labelled(label: impl Into<String>) -> Self {
        Self { label: label.into(), ..Self::default() }
    }
}

/// Field edits applicable to a committed shape
///
/// `None` leaves the field untouched. Geometry and style are not patchable.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapePatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub subtraction: Option<bool>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
}

/// One committed measurement
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Shape {
    kind: ShapeKind,
    points: Vec<ImagePoint>,
    style: ShapeStyle,
    metadata: ShapeMetadata,
}

impl Shape {
    /// Create a new shape
    ///
    /// Fails with [`TakeoffError::SubtractionUnsupported`] when the metadata
    /// marks a kind without subtractive meaning as a subtraction.
    pub fn new(
        kind: ShapeKind,
        points: Vec<ImagePoint>,
        style: ShapeStyle,
        metadata: ShapeMetadata,
    ) -> TakeoffResult<Self> {
        if metadata.subtraction && !kind.policy().supports_subtraction {
            return Err(TakeoffError::SubtractionUnsupported);
        }
        Ok(Self { kind, points, style, metadata })
    }

    /// Get the shape kind
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Get the stored base-image points
    pub fn points(&self) -> &[ImagePoint] {
        &self.points
    }

    /// Get the rendering style
    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    /// Get the metadata
    pub fn metadata(&self) -> &ShapeMetadata {
        &self.metadata
    }

    pub fn label(&self) -> &str {
        &self.metadata.label
    }

    pub fn is_subtraction(&self) -> bool {
        self.metadata.subtraction
    }

    /// Apply a metadata patch
    ///
    /// Validates before mutating, so a refused patch leaves the shape as it was.
    pub fn apply(&mut self, patch: ShapePatch) -> TakeoffResult<()> {
        if patch.subtraction == Some(true) && !self.kind.policy().supports_subtraction {
            return Err(TakeoffError::SubtractionUnsupported);
        }

        if let Some(label) = patch.label {
            self.metadata.label = label;
        }
        if let Some(subtraction) = patch.subtraction {
            self.metadata.subtraction = subtraction;
        }
        if let Some(remarks) = patch.remarks {
            self.metadata.remarks = remarks;
        }
        if let Some(link_url) = patch.link_url {
            self.metadata.link_url = link_url;
        }
        Ok(())
    }

    /// Independent subtractive copy of this shape under a new label
    ///
    /// Only additive shapes of a kind that supports subtraction qualify;
    /// `None` otherwise. Remarks and link are not carried over.
    pub fn subtraction_copy(&self, label: impl Into<String>) -> Option<Self> {
        if self.metadata.subtraction || !self.kind.policy().supports_subtraction {
            return None;
        }

        Some(Self {
            kind: self.kind,
            points: self.points.clone(),
            style: self.style,
            metadata: ShapeMetadata { label: label.into(), subtraction: true, ..ShapeMetadata::default() },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<ImagePoint> {
        vec![
            ImagePoint::new(0.0, 0.0),
            ImagePoint::new(10.0, 0.0),
            ImagePoint::new(10.0, 10.0),
            ImagePoint::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_color_hex_round_trip() {
        let color = Color::from_hex("#8d6e63").unwrap();
        assert_eq!(color, Color::rgb(0x8d, 0x6e, 0x63));
        assert_eq!(color.to_hex(), "#8D6E63");
        assert_eq!(Color::from_hex("FF0000").unwrap(), Color::RED);
    }

    #[test]
    fn test_color_rejects_malformed_hex() {
        assert!(matches!(Color::from_hex("#12345"), Err(TakeoffError::InvalidColor(_))));
        assert!(matches!(Color::from_hex("#GG0000"), Err(TakeoffError::InvalidColor(_))));
        assert!(matches!(Color::from_hex("#ééé"), Err(TakeoffError::InvalidColor(_))));
    }

    #[test]
    fn test_color_serializes_as_hex_string() {
        let json = serde_json::to_string(&Color::rgb(1, 2, 255)).unwrap();
        assert_eq!(json, "\"#0102FF\"");
        let parsed: Color = serde_json::from_str("\"#a1887f\"").unwrap();
        assert_eq!(parsed, Color::rgb(0xa1, 0x88, 0x7f));
    }

    #[test]
    fn test_distance_cannot_be_subtractive() {
        let metadata = ShapeMetadata { subtraction: true, ..ShapeMetadata::labelled("Fence") };
        let result = Shape::new(ShapeKind::Distance, square(), ShapeStyle::default(), metadata);
        assert_eq!(result, Err(TakeoffError::SubtractionUnsupported));
    }

    #[test]
    fn test_patch_updates_metadata_only() {
        let mut shape = Shape::new(
            ShapeKind::Area,
            square(),
            ShapeStyle::default(),
            ShapeMetadata::labelled("Gravel"),
        )
        .unwrap();

        shape
            .apply(ShapePatch {
                label: Some("Tile".to_string()),
                remarks: Some("front porch".to_string()),
                ..ShapePatch::default()
            })
            .unwrap();

        assert_eq!(shape.label(), "Tile");
        assert_eq!(shape.metadata().remarks, "front porch");
        assert!(!shape.is_subtraction());
        assert_eq!(shape.points(), square().as_slice());
    }

    #[test]
    fn test_refused_patch_leaves_shape_untouched() {
        let mut shape = Shape::new(
            ShapeKind::Distance,
            square(),
            ShapeStyle::default(),
            ShapeMetadata::labelled("Curb"),
        )
        .unwrap();
        let before = shape.clone();

        let result = shape.apply(ShapePatch {
            label: Some("Renamed".to_string()),
            subtraction: Some(true),
            ..ShapePatch::default()
        });

        assert_eq!(result, Err(TakeoffError::SubtractionUnsupported));
        assert_eq!(shape, before);
    }

    #[test]
    fn test_subtraction_copy_is_independent() {
        let source = Shape::new(
            ShapeKind::Area,
            square(),
            ShapeStyle::new(Color::rgb(1, 2, 3), 5),
            ShapeMetadata { remarks: "keep".to_string(), ..ShapeMetadata::labelled("Slab") },
        )
        .unwrap();

        let copy = source.subtraction_copy("Gravel").unwrap();
        assert!(copy.is_subtraction());
        assert_eq!(copy.label(), "Gravel");
        assert_eq!(copy.points(), source.points());
        assert_eq!(copy.style(), source.style());
        assert_eq!(copy.metadata().remarks, "");
        assert!(copy.subtraction_copy("again").is_none());
    }
}
