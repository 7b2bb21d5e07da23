//! Offscreen rendering of an edit session into a flat bitmap.
//!
//! The compositor replays the session onto a fresh [`Pixmap`] the size of the
//! edit surface: the chosen shape becomes a clip mask, the photo is drawn
//! through it with its pan/zoom, then every sticker glyph is drawn on top in
//! z-order. Rendering reads the session and never changes it, so the same
//! state always produces the same pixels.

use std::io::Cursor;

use egui::{Pos2, Rect, Vec2};
use image::{DynamicImage, ImageResult, RgbaImage};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::config::ExportFormat;
use crate::error::{EditorError, EditorResult};
use crate::geometry::{clip_path, Shape};
use crate::session::{EditSession, StickerId};

mod glyph;
mod raster;

pub use glyph::{FontGlyphPainter, GlyphPainter};
pub use raster::{build_clip_path, clip_mask};

/// A sticker as it was placed at export time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedSticker {
    pub id: StickerId,
    pub glyph: String,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

/// The encoded result of an export plus the metadata needed to store it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedPhoto {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub shape: Shape,
    pub stickers: Vec<ExportedSticker>,
}

impl ExportedPhoto {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// A rendered but not yet encoded export.
#[derive(Clone)]
pub struct Frame {
    pixmap: Pixmap,
    format: ExportFormat,
    shape: Shape,
    stickers: Vec<ExportedSticker>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("shape", &self.shape)
            .field("stickers", &self.stickers.len())
            .finish()
    }
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn stickers(&self) -> &[ExportedSticker] {
        &self.stickers
    }

    /// Premultiplied RGBA pixels
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha copy of the pixels
    pub fn to_rgba_image(&self) -> EditorResult<RgbaImage> {
        let data = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let c = pixel.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect::<Vec<u8>>();

        RgbaImage::from_raw(self.width(), self.height(), data)
            .ok_or_else(|| EditorError::SerializationFailure("pixel buffer size mismatch".into()))
    }

    /// Serializes the frame in its configured format.
    pub fn encode(self) -> EditorResult<ExportedPhoto> {
        self.encode_with(|image, format, bytes| {
            image.write_to(&mut Cursor::new(bytes), format.image_format())
        })
    }

    /// Serializes the frame through `write`, which appends the encoded file
    /// to the buffer it is given.
    pub(crate) fn encode_with<W>(self, write: W) -> EditorResult<ExportedPhoto>
    where
        W: FnOnce(&DynamicImage, ExportFormat, &mut Vec<u8>) -> ImageResult<()>,
    {
        let image = DynamicImage::ImageRgba8(self.to_rgba_image()?);
        let mut bytes = Vec::new();
        write(&image, self.format, &mut bytes)
            .map_err(|err| EditorError::SerializationFailure(err.to_string()))?;

        if bytes.is_empty() {
            return Err(EditorError::SerializationFailure("encoder produced no data".into()));
        }

        info!(
            "Encoded {}x{} {} export ({} bytes)",
            self.pixmap.width(),
            self.pixmap.height(),
            self.shape,
            bytes.len()
        );
        Ok(ExportedPhoto {
            bytes,
            format: self.format,
            width: self.pixmap.width(),
            height: self.pixmap.height(),
            shape: self.shape,
            stickers: self.stickers,
        })
    }
}

/// Renders edit sessions. Holds only the glyph rasterizer; all other state
/// comes from the session passed in.
pub struct Compositor {
    glyphs: Box<dyn GlyphPainter>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor").finish_non_exhaustive()
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    /// Compositor drawing stickers with egui's bundled fonts
    pub fn new() -> Self {
        let painter = FontGlyphPainter::from_egui_defaults();
        if painter.font_count() == 0 {
            warn!("No fonts available, stickers will not appear in exports");
        }
        Self::with_glyph_painter(painter)
    }

    pub fn with_glyph_painter(painter: impl GlyphPainter + 'static) -> Self {
        Self {
            glyphs: Box::new(painter),
        }
    }

    /// Draws the session into a new frame the size of its edit surface.
    pub fn render(&self, session: &EditSession) -> EditorResult<Frame> {
        let viewport = session.viewport();
        let (width, height) = surface_size(viewport)?;
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            EditorError::RenderFailure(format!("cannot allocate {width}x{height} surface"))
        })?;

        let config = session.config();
        if let Some([r, g, b, a]) = config.background {
            pixmap.fill(Color::from_rgba8(r, g, b, a));
        }

        let bounds = Rect::from_min_size(Pos2::ZERO, Vec2::new(width as f32, height as f32));
        let clip = clip_path(session.shape(), bounds);
        let mask = clip_mask(&clip, width, height)
            .ok_or_else(|| EditorError::RenderFailure(format!("empty {} clip", session.shape())))?;

        let center = bounds.center();

        // Photo: centred on the surface, then zoomed, then panned
        let base = session.base();
        let source = base.source.pixmap();
        let scale = base.transform.scale;
        let position = base.transform.position;
        let transform = Transform::from_translate(center.x, center.y)
            .pre_scale(scale, scale)
            .pre_translate(position.x, position.y)
            .pre_translate(-(source.width() as f32) / 2.0, -(source.height() as f32) / 2.0);
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, Some(&mask));

        let mut stickers = Vec::with_capacity(session.stickers().len());
        for sticker in session.stickers() {
            let anchor = center + sticker.position();
            let font_size = session.sticker_font_size(sticker);
            self.glyphs.paint_glyph(
                &mut pixmap,
                &sticker.glyph,
                anchor,
                font_size,
                config.sticker_color,
                Some(&mask),
            );
            stickers.push(ExportedSticker {
                id: sticker.id,
                glyph: sticker.glyph.clone(),
                x: sticker.position().x,
                y: sticker.position().y,
                scale: sticker.scale(),
            });
        }

        debug!(
            "Rendered {}x{} frame: shape {}, {} stickers",
            width,
            height,
            session.shape(),
            stickers.len()
        );
        Ok(Frame {
            pixmap,
            format: config.export_format,
            shape: session.shape(),
            stickers,
        })
    }

    /// Renders and encodes in one step.
    pub fn export(&self, session: &EditSession) -> EditorResult<ExportedPhoto> {
        self.render(session)?.encode()
    }
}

fn surface_size(viewport: Vec2) -> EditorResult<(u32, u32)> {
    if !viewport.x.is_finite() || !viewport.y.is_finite() || viewport.x < 1.0 || viewport.y < 1.0 {
        return Err(EditorError::RenderFailure(format!(
            "edit surface has no area ({}x{})",
            viewport.x, viewport.y
        )));
    }
    Ok((viewport.x.round() as u32, viewport.y.round() as u32))
}
