//! Raster export.
//!
//! [`Exporter`] is the seam between the editor and whatever turns a scene
//! into image bytes. [`PngExporter`] goes scene → SVG → `resvg` → PNG.
//! Photo backgrounds must be registered as bytes first; the rasterizer never
//! touches the network.

use crate::paint::Scene;
use crate::svg::render_svg;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use qd_core::background::BackgroundFill;
use qd_core::config::ExportConfig;
use resvg::{tiny_skia, usvg};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("surface has no area ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    #[error("background image not available: {0}")]
    BackgroundUnavailable(String),

    #[error("unsupported image data for {0}")]
    UnsupportedImage(String),

    #[error("failed to build SVG tree: {0}")]
    Svg(#[from] usvg::Error),

    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

/// Turns a finished scene into image bytes.
pub trait Exporter {
    fn export(&self, scene: &Scene) -> Result<Vec<u8>, ExportError>;
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

pub struct PngExporter {
    options: usvg::Options<'static>,
    scale: f32,
    /// Background href → `data:` URL.
    images: HashMap<String, String>,
}

impl PngExporter {
    pub fn new(config: &ExportConfig) -> Self {
        let mut options = usvg::Options::default();
        if config.load_system_fonts {
            options.fontdb_mut().load_system_fonts();
            log::debug!("loaded {} system font faces", options.fontdb.len());
        }
        Self {
            options,
            scale: config.scale,
            images: HashMap::new(),
        }
    }

    /// Supply the bytes for an image background.
    pub fn register_image(&mut self, href: &str, bytes: &[u8]) -> Result<(), ExportError> {
        let mime =
            sniff_mime(bytes).ok_or_else(|| ExportError::UnsupportedImage(href.to_string()))?;
        let data_url = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
        self.images.insert(href.to_string(), data_url);
        Ok(())
    }

    pub fn has_image(&self, href: &str) -> bool {
        self.images.contains_key(href)
    }

    /// SVG for a scene with registered images inlined.
    pub fn svg(&self, scene: &Scene) -> Result<String, ExportError> {
        let image_href = match &scene.background.fill {
            BackgroundFill::LinearGradient { .. } => None,
            BackgroundFill::Image { href } if href.starts_with("data:") => None,
            BackgroundFill::Image { href } => Some(
                self.images
                    .get(href)
                    .ok_or_else(|| ExportError::BackgroundUnavailable(href.clone()))?
                    .as_str(),
            ),
        };
        Ok(render_svg(scene, image_href))
    }
}

impl Exporter for PngExporter {
    fn export(&self, scene: &Scene) -> Result<Vec<u8>, ExportError> {
        let width = (scene.size.width * f64::from(self.scale)).round().max(0.0) as u32;
        let height = (scene.size.height * f64::from(self.scale)).round().max(0.0) as u32;
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(ExportError::EmptySurface { width, height })?;

        let svg = self.svg(scene)?;
        let tree = usvg::Tree::from_str(&svg, &self.options)?;
        let transform = tiny_skia::Transform::from_scale(self.scale, self.scale);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        log::debug!(
            "exported {}x{} PNG ({} text runs)",
            width,
            height,
            scene.texts.len()
        );
        pixmap
            .encode_png()
            .map_err(|e| ExportError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(sniff_mime(b"\x89PNG\r\n\x1a\n"), Some("image/png"));
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_mime(b"hello"), None);
    }

    #[test]
    fn rejects_unknown_image_bytes() {
        let mut exporter = PngExporter::new(&ExportConfig {
            load_system_fonts: false,
            ..ExportConfig::default()
        });
        let err = exporter.register_image("x.jpg", b"not an image").unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedImage(_)));
        assert!(!exporter.has_image("x.jpg"));
    }
}
