//! Per-kind policy table
//!
//! Everything that differs between distance and area shapes (unit dimension,
//! quantity formula, minimum points, subtraction support, styling) lives here
//! so the builder, aggregator, export and renderer all consult one table.

use crate::annotation::{Color, ShapeKind, ShapeStyle};
use crate::geometry::{polygon_area, polyline_length, ImagePoint};

/// Alpha applied to a shape's own color for translucent area fills
pub const AREA_FILL_ALPHA: u8 = 60;

/// Fill used by every subtractive area, regardless of its stored color
pub const SUBTRACTION_FILL: Color = Color::new(0, 0, 255, 60);

/// Outline used by every subtractive area
pub const SUBTRACTION_OUTLINE: Color = Color::new(0, 0, 180, 200);

/// Label text color for subtractive areas
pub const SUBTRACTION_TEXT: Color = Color::rgb(0, 0, 180);

/// Pending-shape color forced while a subtraction is being traced
pub const PENDING_SUBTRACTION: Color = Color::rgb(0, 0, 255);

/// Prefix placed before the label of a subtractive shape on the overlay
pub const SUBTRACTION_LABEL_MARKER: &str = "[-]";

/// Prefix placed before a subtractive quantity in tables and totals
pub const SUBTRACTION_VALUE_MARKER: &str = "▲";

/// Static behavior of one shape kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindPolicy {
    /// Display name
    pub name: &'static str,
    /// Power of the calibration ratio applied to the pixel quantity
    pub dimension: i32,
    /// Pending points needed before a commit is allowed
    pub min_points: usize,
    /// Whether the point sequence is an implicitly closed polygon
    pub closed: bool,
    /// Whether the shape may be deducted from its label's total
    pub supports_subtraction: bool,
}

const DISTANCE_POLICY: KindPolicy = KindPolicy {
    name: "Distance",
    dimension: 1,
    min_points: 2,
    closed: false,
    supports_subtraction: false,
};

const AREA_POLICY: KindPolicy = KindPolicy {
    name: "Area",
    dimension: 2,
    min_points: 2,
    closed: true,
    supports_subtraction: true,
};

impl ShapeKind {
    /// Look up the policy for this kind
    pub fn policy(self) -> &'static KindPolicy {
        match self {
            ShapeKind::Distance => &DISTANCE_POLICY,
            ShapeKind::Area => &AREA_POLICY,
        }
    }
}

impl KindPolicy {
    /// Quantity in pixel units (px for lengths, px² for areas)
    pub fn pixel_quantity(&self, points: &[ImagePoint]) -> f64 {
        if self.closed {
            polygon_area(points)
        } else {
            polyline_length(points)
        }
    }

    /// Quantity in real units for a real-units-per-pixel ratio
    pub fn real_quantity(&self, points: &[ImagePoint], ratio: f64) -> f64 {
        self.pixel_quantity(points) * ratio.powi(self.dimension)
    }

    /// Unit symbol for a base length unit, e.g. `m` or `m²`
    pub fn unit_symbol(&self, length_unit: &str) -> String {
        match self.dimension {
            1 => length_unit.to_string(),
            2 => format!("{length_unit}²"),
            n => format!("{length_unit}^{n}"),
        }
    }

    /// Resolve the paints for a committed shape
    pub fn paint(&self, style: &ShapeStyle, subtraction: bool) -> ShapePaint {
        let subtractive = subtraction && self.supports_subtraction;
        match (self.closed, subtractive) {
            (true, true) => ShapePaint {
                stroke: SUBTRACTION_OUTLINE,
                fill: Some(SUBTRACTION_FILL),
                text: SUBTRACTION_TEXT,
                label_marker: SUBTRACTION_LABEL_MARKER,
            },
            (true, false) => ShapePaint {
                stroke: style.color,
                fill: Some(style.color.with_alpha(AREA_FILL_ALPHA)),
                text: style.color,
                label_marker: "",
            },
            (false, _) => ShapePaint {
                stroke: style.color,
                fill: None,
                text: style.color,
                label_marker: "",
            },
        }
    }
}

/// Resolved colors for drawing one shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapePaint {
    pub stroke: Color,
    pub fill: Option<Color>,
    pub text: Color,
    pub label_marker: &'static str,
}

/// Color for the in-progress shape; subtractive area tracing is forced blue
pub fn pending_color(kind: Option<ShapeKind>, color: Color, subtraction: bool) -> Color {
    match kind {
        Some(kind) if subtraction && kind.policy().supports_subtraction => PENDING_SUBTRACTION,
        _ => color,
    }
}

/// Format an unsigned magnitude for display, flagging subtractions with a marker
pub fn format_magnitude(value: f64, subtraction: bool) -> String {
    if subtraction {
        format!("{SUBTRACTION_VALUE_MARKER} {:.2}", value.abs())
    } else {
        format!("{:.2}", value.abs())
    }
}

/// Format a signed total; negative totals use the marker instead of a minus sign
pub fn format_signed_total(total: f64) -> String {
    format_magnitude(total, total < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_formulas_follow_dimension() {
        let square = [
            ImagePoint::new(0.0, 0.0),
            ImagePoint::new(10.0, 0.0),
            ImagePoint::new(10.0, 10.0),
            ImagePoint::new(0.0, 10.0),
        ];
        assert_eq!(ShapeKind::Distance.policy().real_quantity(&square, 0.5), 15.0);
        assert_eq!(ShapeKind::Area.policy().real_quantity(&square, 0.5), 25.0);
    }

    #[test]
    fn test_unit_symbols() {
        assert_eq!(ShapeKind::Distance.policy().unit_symbol("m"), "m");
        assert_eq!(ShapeKind::Area.policy().unit_symbol("m"), "m²");
    }

    #[test]
    fn test_subtractive_area_uses_override_paint() {
        let style = ShapeStyle::new(Color::rgb(0x66, 0xbb, 0x6a), 3);
        let paint = ShapeKind::Area.policy().paint(&style, true);
        assert_eq!(paint.stroke, SUBTRACTION_OUTLINE);
        assert_eq!(paint.fill, Some(SUBTRACTION_FILL));
        assert_eq!(paint.label_marker, "[-]");

        let additive = ShapeKind::Area.policy().paint(&style, false);
        assert_eq!(additive.fill, Some(style.color.with_alpha(AREA_FILL_ALPHA)));
        assert_eq!(ShapeKind::Distance.policy().paint(&style, false).fill, None);
    }

    #[test]
    fn test_pending_color_override() {
        let green = Color::rgb(0, 200, 0);
        assert_eq!(pending_color(Some(ShapeKind::Area), green, true), PENDING_SUBTRACTION);
        assert_eq!(pending_color(Some(ShapeKind::Area), green, false), green);
        assert_eq!(pending_color(Some(ShapeKind::Distance), green, true), green);
        assert_eq!(pending_color(None, green, true), green);
    }

    #[test]
    fn test_value_formatting() {
        assert_eq!(format_magnitude(10.0, false), "10.00");
        assert_eq!(format_magnitude(10.0, true), "▲ 10.00");
        assert_eq!(format_signed_total(-2.5), "▲ 2.50");
        assert_eq!(format_signed_total(0.0), "0.00");
    }
}
