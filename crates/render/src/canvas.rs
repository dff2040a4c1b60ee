//! Drawing primitives on top of tiny-skia
//!
//! The canvas starts from an opaque RGB bitmap, so every pixel stays opaque
//! and the premultiplied buffer converts back to RGB without loss.

use image::RgbImage;
use takeoff_core::{Color, DevicePoint};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, StrokeDash, Transform,
};

/// Opaque drawing surface backed by a tiny-skia pixmap
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Copy an RGB bitmap into a new canvas; `None` for an empty bitmap
    pub fn from_rgb(image: &RgbImage) -> Option<Self> {
        let mut pixmap = Pixmap::new(image.width(), image.height())?;
        for (dst, src) in pixmap.data_mut().chunks_exact_mut(4).zip(image.pixels()) {
            dst.copy_from_slice(&[src[0], src[1], src[2], 255]);
        }
        Some(Self { pixmap })
    }

    /// Flatten back into an RGB bitmap
    pub fn into_rgb(self) -> RgbImage {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut raw = Vec::with_capacity(width as usize * height as usize * 3);
        for pixel in self.pixmap.pixels() {
            let color = pixel.demultiply();
            raw.extend_from_slice(&[color.red(), color.green(), color.blue()]);
        }
        RgbImage::from_raw(width, height, raw).unwrap_or_else(|| RgbImage::new(width, height))
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fill a closed polygon
    pub fn fill_polygon(&mut self, points: &[DevicePoint], color: Color) {
        if let Some(path) = polyline_path(points, true) {
            self.pixmap.fill_path(
                &path,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Stroke a polyline, optionally closing it back to the first point
    pub fn stroke_polyline(&mut self, points: &[DevicePoint], closed: bool, color: Color, width: f32) {
        if let Some(path) = polyline_path(points, closed) {
            self.pixmap
                .stroke_path(&path, &paint(color), &stroke(width), Transform::identity(), None);
        }
    }

    /// Stroke a dashed segment
    pub fn stroke_dashed(&mut self, from: DevicePoint, to: DevicePoint, color: Color, width: f32, dash: f32) {
        let Some(path) = polyline_path(&[from, to], false) else {
            return;
        };
        let mut stroke = stroke(width);
        stroke.line_cap = LineCap::Butt;
        stroke.dash = StrokeDash::new(vec![dash, dash * 0.75], 0.0);
        self.pixmap.stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }

    /// Filled circle with a 1px outline
    pub fn circle(&mut self, center: DevicePoint, radius: f32, fill: Color, outline: Color) {
        let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius) else {
            return;
        };
        let transform = Transform::identity();
        self.pixmap.fill_path(&path, &paint(fill), FillRule::Winding, transform, None);
        self.pixmap.stroke_path(&path, &paint(outline), &stroke(1.0), transform, None);
    }

    /// Overwrite one pixel with an opaque color, ignoring out-of-bounds writes
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let offset = (y as usize * self.width() as usize + x as usize) * 4;
        self.pixmap.data_mut()[offset..offset + 4].copy_from_slice(&[color.r, color.g, color.b, 255]);
    }
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width: width.max(1.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

fn polyline_path(points: &[DevicePoint], closed: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for point in rest {
        pb.line_to(point.x as f32, point.y as f32);
    }
    if closed {
        pb.close();
    }
    pb.finish()
}
