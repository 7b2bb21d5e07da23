use std::sync::Arc;

use image::RgbaImage;
use log::{debug, info};
use tiny_skia::{ColorU8, IntSize, Pixmap};

use crate::error::{EditorError, EditorResult};
use crate::transform::Transform2D;

/// The user's photo, decoded once and never mutated.
///
/// Pixels are kept premultiplied so the compositor can draw them directly.
/// Clones share the same pixel buffer.
#[derive(Clone)]
pub struct SourceImage {
    pixels: Arc<Pixmap>,
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl SourceImage {
    /// Decodes an encoded image file (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8]) -> EditorResult<Self> {
        if bytes.is_empty() {
            return Err(EditorError::InvalidInput("no image data supplied".into()));
        }

        let decoded = image::load_from_memory(bytes)
            .map_err(|err| EditorError::InvalidInput(format!("failed to decode image: {err}")))?;
        debug!("Decoded image: {}x{}", decoded.width(), decoded.height());
        Self::from_rgba(&decoded.to_rgba8())
    }

    pub fn from_rgba(rgba: &RgbaImage) -> EditorResult<Self> {
        let size = IntSize::from_wh(rgba.width(), rgba.height()).ok_or_else(|| {
            EditorError::InvalidInput(format!(
                "image has no pixels ({}x{})",
                rgba.width(),
                rgba.height()
            ))
        })?;
        let mut pixmap = Pixmap::new(size.width(), size.height())
            .ok_or_else(|| EditorError::InvalidInput("image is too large".into()))?;

        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }

        info!("Loaded source image {}x{}", size.width(), size.height());
        Ok(Self {
            pixels: Arc::new(pixmap),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixels
    }
}

/// The photo being edited together with its pan/zoom.
#[derive(Debug, Clone)]
pub struct BaseImage {
    pub source: SourceImage,
    pub transform: Transform2D,
}

impl BaseImage {
    pub fn new(source: SourceImage) -> Self {
        Self {
            source,
            transform: Transform2D::IDENTITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 128]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let image = SourceImage::decode(&encoded_png(8, 4)).unwrap();
        assert_eq!(image.width(), 8);
        assert_eq!(image.height(), 4);

        // Stored premultiplied
        let pixel = image.pixmap().pixel(0, 0).unwrap();
        assert_eq!(pixel.alpha(), 128);
        assert_eq!(pixel.red(), 128);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(
            SourceImage::decode(&[]),
            Err(EditorError::InvalidInput(_))
        ));
        assert!(matches!(
            SourceImage::decode(b"not an image"),
            Err(EditorError::InvalidInput(_))
        ));
    }
}
