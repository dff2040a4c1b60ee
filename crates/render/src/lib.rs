//! Takeoff Render Library
//!
//! Overlay rendering for takeoff sessions: zoomed base image, committed
//! shapes with labels, the pending shape and the calibration reference.

pub mod cache;
pub mod canvas;
pub mod overlay;
pub mod text;

pub use cache::{LruCache, ResizeCache};
pub use canvas::Canvas;
pub use overlay::{
    label_font_size, render_overlay, OverlayRenderer, OverlayRequest, RenderError, RenderResult,
};
