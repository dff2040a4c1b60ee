//! Overlay rendering
//!
//! Draws the calibration reference, committed shapes and the pending shape
//! onto a zoomed copy of the base image. Rendering is a pure function of
//! the request: inputs are never mutated and identical requests produce
//! bit-identical bitmaps.

use image::RgbImage;
use takeoff_core::policy::pending_color;
use takeoff_core::view::clamp_zoom;
use takeoff_core::{
    to_device_space, BaseImage, Calibration, Color, DevicePoint, ImagePoint, MeasureMode, Session,
    Shape, ShapeStyle, TakeoffError, TakeoffResult,
};

use crate::cache::{resize_base, ResizeCache};
use crate::canvas::Canvas;
use crate::text::{draw_outlined_text, glyph_scale};

/// Radius of the white marker at each committed shape's first point
pub const ORIGIN_MARKER_RADIUS: f32 = 4.0;

/// Radius of pending point markers
pub const PENDING_MARKER_RADIUS: f32 = 5.0;

/// Faint edge closing a pending area back to its first point
pub const PENDING_CLOSING_EDGE: Color = Color::new(50, 50, 50, 100);

/// Calibration reference segment color
pub const CALIBRATION_COLOR: Color = Color::rgb(255, 111, 0);

const CALIBRATION_TICK: f64 = 6.0;

/// Error types for overlay rendering
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} drawing surface")]
    Surface { width: u32, height: u32 },
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Everything one overlay render depends on
#[derive(Debug, Clone, Copy)]
pub struct OverlayRequest<'a> {
    pub base: &'a BaseImage,
    pub zoom: f64,
    pub shapes: &'a [Shape],
    pub pending: &'a [ImagePoint],
    pub mode: MeasureMode,
    /// Color of the shape being traced
    pub pending_color: Color,
    pub pending_stroke_width: u32,
    /// The shape being traced will be committed as a subtraction
    pub pending_subtraction: bool,
    pub show_labels: bool,
    /// Reference segment to mark, if any
    pub calibration: Option<&'a Calibration>,
}

impl<'a> OverlayRequest<'a> {
    /// Request reflecting the current session state
    pub fn from_session(
        session: &'a Session,
        pending_style: ShapeStyle,
        pending_subtraction: bool,
    ) -> TakeoffResult<Self> {
        let base = session.base_image().ok_or(TakeoffError::NoBaseImage)?;
        let view = session.view();

        Ok(Self {
            base,
            zoom: view.zoom(),
            shapes: session.shapes(),
            pending: session.pending_points(),
            mode: view.active_mode,
            pending_color: pending_style.color,
            pending_stroke_width: pending_style.stroke_width,
            pending_subtraction,
            show_labels: view.show_labels,
            calibration: session.calibration().filter(|_| view.show_calibration),
        })
    }
}

/// Render an overlay without caching the resized base image
pub fn render_overlay(request: &OverlayRequest<'_>) -> RenderResult<RgbImage> {
    let zoom = clamp_zoom(request.zoom);
    draw_overlay(&resize_base(request.base.image(), zoom), request, zoom)
}

/// Overlay renderer that reuses resized base images across renders
#[derive(Debug, Default)]
pub struct OverlayRenderer {
    cache: ResizeCache,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &ResizeCache {
        &self.cache
    }

    /// Render an overlay; output is identical to [`render_overlay`]
    pub fn render(&mut self, request: &OverlayRequest<'_>) -> RenderResult<RgbImage> {
        let zoom = clamp_zoom(request.zoom);
        let resized = self.cache.resized(request.base, zoom);
        draw_overlay(&resized, request, zoom)
    }
}

/// Nominal label font size at `zoom`, never below 14 px
pub fn label_font_size(zoom: f64) -> u32 {
    ((16.0 * zoom).floor() as u32).max(14)
}

fn draw_overlay(resized: &RgbImage, request: &OverlayRequest<'_>, zoom: f64) -> RenderResult<RgbImage> {
    let mut canvas = Canvas::from_rgb(resized).ok_or(RenderError::Surface {
        width: resized.width(),
        height: resized.height(),
    })?;
    let device = |points: &[ImagePoint]| -> Vec<DevicePoint> {
        points.iter().map(|&p| to_device_space(p, zoom)).collect()
    };

    if let Some(calibration) = request.calibration {
        let (p1, p2) = calibration.reference();
        draw_calibration(&mut canvas, to_device_space(p1, zoom), to_device_space(p2, zoom));
    }

    let font_size = label_font_size(zoom);
    for (index, shape) in request.shapes.iter().enumerate() {
        let points = device(shape.points());
        draw_shape(&mut canvas, shape, &points);

        let Some(&origin) = points.first() else {
            continue;
        };
        if request.show_labels {
            let paint = shape.kind().policy().paint(shape.style(), shape.is_subtraction());
            let text = format!("No.{} {}{}", index + 1, paint.label_marker, shape.label());
            draw_outlined_text(
                &mut canvas,
                origin.x as i32,
                origin.y as i32 - font_size as i32 - 5,
                &text,
                paint.text,
                Color::WHITE,
                glyph_scale(font_size),
            );
        }
        canvas.circle(origin, ORIGIN_MARKER_RADIUS, Color::WHITE, Color::BLACK);
    }

    draw_pending(&mut canvas, request, &device(request.pending));

    Ok(canvas.into_rgb())
}

fn draw_shape(canvas: &mut Canvas, shape: &Shape, points: &[DevicePoint]) {
    let policy = shape.kind().policy();
    let paint = policy.paint(shape.style(), shape.is_subtraction());
    let width = shape.style().stroke_width as f32;

    if let Some(fill) = paint.fill {
        canvas.fill_polygon(points, fill);
    }
    canvas.stroke_polyline(points, policy.closed, paint.stroke, width);
}

fn draw_pending(canvas: &mut Canvas, request: &OverlayRequest<'_>, points: &[DevicePoint]) {
    if points.is_empty() {
        return;
    }

    let color = pending_color(
        request.mode.shape_kind(),
        request.pending_color,
        request.pending_subtraction,
    )
    .with_alpha(255);

    for &point in points {
        canvas.circle(point, PENDING_MARKER_RADIUS, color, Color::WHITE);
    }
    canvas.stroke_polyline(points, false, color, request.pending_stroke_width as f32);

    if request.mode == MeasureMode::Area && points.len() > 1 {
        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            canvas.stroke_polyline(&[last, first], false, PENDING_CLOSING_EDGE, 1.0);
        }
    }
}

fn draw_calibration(canvas: &mut Canvas, p1: DevicePoint, p2: DevicePoint) {
    canvas.stroke_dashed(p1, p2, CALIBRATION_COLOR, 2.0, 8.0);

    let (dx, dy) = (p2.x - p1.x, p2.y - p1.y);
    let length = dx.hypot(dy);
    if length <= f64::EPSILON {
        return;
    }
    // unit normal scaled to half the tick length
    let (nx, ny) = (-dy / length * CALIBRATION_TICK, dx / length * CALIBRATION_TICK);
    for end in [p1, p2] {
        let tick = [
            DevicePoint::new(end.x - nx, end.y - ny),
            DevicePoint::new(end.x + nx, end.y + ny),
        ];
        canvas.stroke_polyline(&tick, false, CALIBRATION_COLOR, 2.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use takeoff_core::{ShapeKind, ShapeMetadata};

    fn white_base(width: u32, height: u32) -> BaseImage {
        BaseImage::new(RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255])))
    }

    fn area(points: &[(f64, f64)], color: Color, subtraction: bool) -> Shape {
        Shape::new(
            ShapeKind::Area,
            points.iter().map(|&(x, y)| ImagePoint::new(x, y)).collect(),
            ShapeStyle::new(color, 2),
            ShapeMetadata { subtraction, ..ShapeMetadata::labelled("Gravel") },
        )
        .unwrap()
    }

    fn request<'a>(base: &'a BaseImage, shapes: &'a [Shape], pending: &'a [ImagePoint]) -> OverlayRequest<'a> {
        OverlayRequest {
            base,
            zoom: 1.0,
            shapes,
            pending,
            mode: MeasureMode::Area,
            pending_color: Color::RED,
            pending_stroke_width: 3,
            pending_subtraction: false,
            show_labels: false,
            calibration: None,
        }
    }

    fn square(offset: f64, size: f64) -> Vec<(f64, f64)> {
        vec![(offset, offset), (offset + size, offset), (offset + size, offset + size), (offset, offset + size)]
    }

    #[test]
    fn test_output_size_follows_zoom() {
        let base = white_base(101, 60);
        let mut req = request(&base, &[], &[]);
        req.zoom = 0.5;
        assert_eq!(render_overlay(&req).unwrap().dimensions(), (50, 30));
    }

    #[test]
    fn test_render_is_deterministic() {
        let base = white_base(120, 90);
        let shapes = vec![
            area(&square(10.0, 40.0), Color::rgb(0x66, 0xbb, 0x6a), false),
            area(&square(20.0, 20.0), Color::rgb(0x66, 0xbb, 0x6a), true),
        ];
        let pending = vec![ImagePoint::new(80.0, 10.0), ImagePoint::new(100.0, 40.0)];
        let mut req = request(&base, &shapes, &pending);
        req.show_labels = true;

        let first = render_overlay(&req).unwrap();
        let second = render_overlay(&req).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());

        let mut renderer = OverlayRenderer::new();
        assert_eq!(renderer.render(&req).unwrap().as_raw(), first.as_raw());
        assert_eq!(renderer.render(&req).unwrap().as_raw(), first.as_raw());
        assert_eq!(renderer.cache().hits(), 1);
    }

    #[test]
    fn test_area_fill_is_translucent_shape_color() {
        let base = white_base(60, 60);
        let shapes = vec![area(&square(10.0, 40.0), Color::rgb(0, 0, 0), false)];
        let image = render_overlay(&request(&base, &shapes, &[])).unwrap();

        let inside = image.get_pixel(35, 35).0;
        // 60/255 black over white
        assert!(inside.iter().all(|&c| (190..=200).contains(&c)), "{inside:?}");
        assert_eq!(image.get_pixel(55, 55).0, [255, 255, 255]);
    }

    #[test]
    fn test_subtraction_uses_override_colors() {
        let base = white_base(60, 60);
        let shapes = vec![area(&square(10.0, 40.0), Color::rgb(255, 0, 0), true)];
        let image = render_overlay(&request(&base, &shapes, &[])).unwrap();

        let [r, g, b] = image.get_pixel(35, 35).0;
        assert!(b == 255 && r == g && r < 255, "{:?}", [r, g, b]);
    }

    #[test]
    fn test_pending_subtraction_is_blue() {
        let base = white_base(40, 40);
        let pending = vec![ImagePoint::new(20.0, 20.0)];
        let mut req = request(&base, &[], &pending);
        req.pending_subtraction = true;

        let image = render_overlay(&req).unwrap();
        assert_eq!(image.get_pixel(20, 20).0, [0, 0, 255]);

        req.mode = MeasureMode::Distance;
        let image = render_overlay(&req).unwrap();
        assert_eq!(image.get_pixel(20, 20).0, [255, 0, 0]);
    }

    #[test]
    fn test_labels_toggle() {
        let base = white_base(120, 80);
        let shapes = vec![area(&[(10.0, 60.0), (100.0, 60.0), (100.0, 75.0)], Color::BLACK, false)];
        let mut req = request(&base, &shapes, &[]);

        let without = render_overlay(&req).unwrap();
        req.show_labels = true;
        let with = render_overlay(&req).unwrap();

        // label band sits above the first point
        let differs = (10..100).any(|x| (30..60).any(|y| without.get_pixel(x, y) != with.get_pixel(x, y)));
        assert!(differs);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let base = white_base(50, 50);
        let before = base.image().clone();
        let shapes = vec![area(&square(5.0, 30.0), Color::RED, false)];
        render_overlay(&request(&base, &shapes, &[])).unwrap();
        assert_eq!(base.image(), &before);
    }

    #[test]
    fn test_calibration_reference_is_marked() {
        let base = white_base(80, 40);
        let calibration =
            Calibration::two_point(ImagePoint::new(10.0, 20.0), ImagePoint::new(70.0, 20.0), 6.0, "m")
                .unwrap();
        let mut req = request(&base, &[], &[]);

        let plain = render_overlay(&req).unwrap();
        req.calibration = Some(&calibration);
        let marked = render_overlay(&req).unwrap();

        // end tick straddles the reference line
        assert_ne!(marked.get_pixel(10, 16), plain.get_pixel(10, 16));
        assert_eq!(marked.get_pixel(40, 5), plain.get_pixel(40, 5));
    }
}
