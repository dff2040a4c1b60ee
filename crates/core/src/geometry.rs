//! Geometry kernel
//!
//! Pure math over base-image pixel coordinates: distances, polyline length,
//! shoelace polygon area, and the zoom transform between base-image space and
//! the device space the user clicks in.

/// Point in base-image pixel space
///
/// Never zoomed and never in device space. Shapes store these, so a
/// recalibration or zoom change never touches stored geometry.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    /// Create a new base-image point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance_to(&self, other: &ImagePoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Point in device space, relative to the currently rendered (zoomed) bitmap
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DevicePoint {
    pub x: f64,
    pub y: f64,
}

impl DevicePoint {
    /// Create a new device point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two points
pub fn distance(p1: ImagePoint, p2: ImagePoint) -> f64 {
    p1.distance_to(&p2)
}

/// Sum of consecutive segment lengths; zero for fewer than two points
pub fn polyline_length(points: &[ImagePoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Absolute shoelace area of the polygon implied by `points`
///
/// The closing edge from the last point back to the first is implicit.
/// Fewer than three points yields zero. Winding direction does not matter.
pub fn polygon_area(points: &[ImagePoint]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    (area / 2.0).abs()
}

/// Map a base-image point into device space at `zoom`
pub fn to_device_space(point: ImagePoint, zoom: f64) -> DevicePoint {
    DevicePoint::new(point.x * zoom, point.y * zoom)
}

/// Map a device click back into base-image space at `zoom`
///
/// `zoom` is kept strictly positive by [`crate::view::ViewState`].
pub fn to_base_space(point: DevicePoint, zoom: f64) -> ImagePoint {
    ImagePoint::new(point.x / zoom, point.y / zoom)
}
