use std::collections::HashMap;

use eframe::egui::{self, Color32, ColorImage, Stroke, TextureHandle, TextureOptions};
use log::{debug, warn};

use crate::compositor::Frame;
use crate::editor::PhotoEditor;
use crate::geometry::hit_testing::{sticker_center, sticker_rect};
use crate::session::ActiveObject;
use crate::store::{PhotoId, PhotoRecord};

const SELECTION_COLOR: Color32 = Color32::from_rgb(0, 140, 255);

/// Converts a rendered frame into an egui image without re-encoding.
pub fn frame_to_color_image(frame: &Frame) -> ColorImage {
    let size = [frame.width() as usize, frame.height() as usize];
    ColorImage::from_rgba_premultiplied(size, frame.pixmap().data())
}

/// Live preview of the open edit session.
///
/// The preview is the export itself: the compositor's frame is uploaded as a
/// texture, and re-rendered only when the session revision changes.
#[derive(Default)]
pub struct PreviewRenderer {
    texture: Option<TextureHandle>,
    rendered_revision: Option<u64>,
}

impl std::fmt::Debug for PreviewRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewRenderer")
            .field("rendered_revision", &self.rendered_revision)
            .finish()
    }
}

impl PreviewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stale(&self, revision: u64) -> bool {
        self.rendered_revision != Some(revision)
    }

    /// Forgets the cached texture, e.g. when the session closes
    pub fn invalidate(&mut self) {
        self.texture = None;
        self.rendered_revision = None;
    }

    /// Draws the session into `rect`, plus an outline around the selected
    /// sticker.
    pub fn render(&mut self, ctx: &egui::Context, painter: &egui::Painter, rect: egui::Rect, editor: &PhotoEditor) {
        let Some(session) = editor.session() else {
            return;
        };

        if self.is_stale(session.revision()) {
            match editor.compositor().render(session) {
                Ok(frame) => {
                    let image = frame_to_color_image(&frame);
                    match &mut self.texture {
                        Some(texture) => texture.set(image, TextureOptions::LINEAR),
                        None => {
                            self.texture = Some(ctx.load_texture("edit_preview", image, TextureOptions::LINEAR));
                        }
                    }
                    debug!("Preview updated to revision {}", session.revision());
                }
                Err(err) => {
                    warn!("Preview render failed: {}", err);
                    self.texture = None;
                }
            }
            self.rendered_revision = Some(session.revision());
        }

        painter.rect_filled(rect, 0.0, Color32::from_gray(40));
        if let Some(texture) = &self.texture {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }

        if let Some(sticker) = session.selected_sticker().and_then(|id| session.sticker(id)) {
            let center = sticker_center(session.viewport(), sticker);
            let bounds = sticker_rect(center, session.sticker_font_size(sticker)).translate(rect.min.to_vec2());
            let width = if session.is_active(ActiveObject::Sticker(sticker.id)) { 2.0 } else { 1.0 };
            painter.rect_stroke(bounds, 2.0, Stroke::new(width, SELECTION_COLOR));
        }
    }
}

/// Album thumbnails, decoded once per saved photo.
#[derive(Default)]
pub struct ThumbnailCache {
    textures: HashMap<PhotoId, TextureHandle>,
}

impl ThumbnailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Gets or creates the texture for `photo`. Returns `None` if the stored
    /// image cannot be decoded.
    pub fn get_or_create(&mut self, ctx: &egui::Context, photo: &PhotoRecord) -> Option<&TextureHandle> {
        if !self.textures.contains_key(&photo.id) {
            let decoded = match image::load_from_memory(&photo.image) {
                Ok(decoded) => decoded.to_rgba8(),
                Err(err) => {
                    warn!("Cannot decode thumbnail for {}: {}", photo.id, err);
                    return None;
                }
            };
            let size = [decoded.width() as usize, decoded.height() as usize];
            let image = ColorImage::from_rgba_unmultiplied(size, decoded.as_raw());
            let texture = ctx.load_texture(format!("photo_{}", photo.id), image, TextureOptions::LINEAR);
            self.textures.insert(photo.id, texture);
        }
        self.textures.get(&photo.id)
    }

    /// Drops textures whose photo is no longer listed
    pub fn retain(&mut self, photos: &[PhotoRecord]) {
        self.textures
            .retain(|id, _| photos.iter().any(|photo| photo.id == *id));
    }

    /// Drops one cached texture so it is rebuilt on next use
    pub fn invalidate(&mut self, id: PhotoId) {
        self.textures.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use egui::Vec2;
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::compositor::{Compositor, GlyphPainter};
    use crate::config::EditorConfig;
    use crate::session::SourceImage;
    use crate::store::PhotoStore;

    struct NoGlyphs;

    impl GlyphPainter for NoGlyphs {
        fn paint_glyph(
            &self,
            _pixmap: &mut tiny_skia::Pixmap,
            _text: &str,
            _center: egui::Pos2,
            _font_size: f32,
            _color: [u8; 4],
            _clip: Option<&tiny_skia::Mask>,
        ) {
        }
    }

    fn editor() -> PhotoEditor {
        let mut editor =
            PhotoEditor::with_compositor(EditorConfig::default(), Compositor::with_glyph_painter(NoGlyphs));
        let image = SourceImage::from_rgba(&RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]))).unwrap();
        editor.open_image(image, Vec2::splat(40.0));
        editor
    }

    #[test]
    fn test_frame_to_color_image() {
        let editor = editor();
        let frame = editor.compositor().render(editor.session().unwrap()).unwrap();
        let image = frame_to_color_image(&frame);
        assert_eq!(image.size, [40, 40]);
        assert_eq!(image.pixels[20 * 40 + 20], Color32::from_rgb(10, 20, 30));
    }

    #[test]
    fn test_preview_tracks_revision() {
        let mut editor = editor();
        let ctx = egui::Context::default();
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(40.0, 40.0));
        let painter = egui::Painter::new(ctx.clone(), egui::LayerId::background(), rect);
        let mut preview = PreviewRenderer::new();

        assert!(preview.is_stale(0));
        preview.render(&ctx, &painter, rect, &editor);
        assert!(!preview.is_stale(0));

        editor.add_sticker("★");
        let revision = editor.session().unwrap().revision();
        assert!(preview.is_stale(revision));
        preview.render(&ctx, &painter, rect, &editor);
        assert!(!preview.is_stale(revision));
    }

    #[test]
    fn test_thumbnail_cache_skips_bad_images() {
        let ctx = egui::Context::default();
        let mut editor = editor();
        let mut handle = editor.export().unwrap();
        editor.pump();
        let photo = handle.try_take().unwrap().unwrap();

        let mut store = PhotoStore::new();
        let good = store.add_photo(photo.clone());
        let mut broken = photo;
        broken.bytes = vec![0, 1, 2];
        let bad = store.add_photo(broken);

        let mut cache = ThumbnailCache::new();
        assert!(cache.get_or_create(&ctx, store.photo(good).unwrap()).is_some());
        assert!(cache.get_or_create(&ctx, store.photo(bad).unwrap()).is_none());
        assert_eq!(cache.len(), 1);

        store.remove_photo(good);
        cache.retain(store.photos());
        assert!(cache.is_empty());
    }
}
