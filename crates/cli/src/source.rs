//! Base image acquisition
//!
//! Raster plans (PNG, JPEG, BMP) are decoded with the `image` crate. PDF and
//! CAD drawings need an external rasterizer and are reported as unsupported.

use image::{ImageFormat, RgbImage};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("file does not exist: {0}")]
    Missing(PathBuf),
    #[error("path is not a file: {0}")]
    NotAFile(PathBuf),
    #[error("{kind} plans must be rasterized first; export the page as PNG or JPEG")]
    NeedsRasterizer { kind: &'static str },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Something that can turn a plan file into an RGB bitmap
pub trait ImageSource {
    fn load(&self, path: &Path) -> SourceResult<RgbImage>;
}

/// Decoder for raster image files
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterSource;

impl ImageSource for RasterSource {
    fn load(&self, path: &Path) -> SourceResult<RgbImage> {
        ensure_file(path)?;
        if let Some(kind) = vector_kind(path) {
            return Err(SourceError::NeedsRasterizer { kind });
        }

        let image = image::open(path)?.to_rgb8();
        tracing::debug!(path = %path.display(), width = image.width(), height = image.height(), "image decoded");
        Ok(image)
    }
}

/// Short format name for a path, e.g. `png`
pub fn format_name(path: &Path) -> Option<&'static str> {
    if let Some(kind) = vector_kind(path) {
        return Some(kind);
    }
    ImageFormat::from_path(path).ok().and_then(|format| format.extensions_str().first().copied())
}

fn vector_kind(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("pdf"),
        "dxf" => Some("dxf"),
        _ => None,
    }
}

fn ensure_file(path: &Path) -> SourceResult<()> {
    if !path.exists() {
        return Err(SourceError::Missing(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(SourceError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}
