use ab_glyph::{point, Font, FontArc, Glyph, PxScale, ScaleFont};
use egui::Pos2;
use log::{debug, warn};
use tiny_skia::{ColorU8, Mask, Pixmap, PixmapPaint, Transform};

/// Draws sticker text onto the export surface.
pub trait GlyphPainter {
    /// Paints `text` centred on `center` (horizontally centred, vertically on
    /// the middle of the em box) at `font_size` pixels, restricted to `clip`.
    fn paint_glyph(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        center: Pos2,
        font_size: f32,
        color: [u8; 4],
        clip: Option<&Mask>,
    );
}

/// Fonts bundled with egui, tried in order for each character
const EGUI_FONT_NAMES: [&str; 4] = ["NotoEmoji-Regular", "emoji-icon-font", "Ubuntu-Light", "Hack"];

/// Rasterizes glyph outlines with `ab_glyph`, falling back through a list of
/// fonts until one has the character.
#[derive(Clone)]
pub struct FontGlyphPainter {
    fonts: Vec<FontArc>,
}

impl std::fmt::Debug for FontGlyphPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontGlyphPainter")
            .field("fonts", &self.fonts.len())
            .finish()
    }
}

impl FontGlyphPainter {
    pub fn new(fonts: Vec<FontArc>) -> Self {
        Self { fonts }
    }

    /// Uses the emoji and UI fonts that ship with egui.
    pub fn from_egui_defaults() -> Self {
        let definitions = egui::FontDefinitions::default();
        let fonts = EGUI_FONT_NAMES
            .iter()
            .filter_map(|name| {
                let data = definitions.font_data.get(*name)?;
                match FontArc::try_from_vec(data.font.to_vec()) {
                    Ok(font) => Some(font),
                    Err(err) => {
                        warn!("Skipping bundled font {}: {}", name, err);
                        None
                    }
                }
            })
            .collect::<Vec<_>>();
        debug!("Loaded {} bundled fonts for stickers", fonts.len());
        Self::new(fonts)
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    fn font_for(&self, ch: char) -> Option<&FontArc> {
        self.fonts.iter().find(|font| font.glyph_id(ch).0 != 0)
    }
}

/// `PxScale` is the line height (ascent - descent); `font_size` is an em size.
fn em_scale(font: &FontArc, font_size: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1.0);
    PxScale::from(font_size * font.height_unscaled() / units_per_em)
}

impl GlyphPainter for FontGlyphPainter {
    fn paint_glyph(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        center: Pos2,
        font_size: f32,
        color: [u8; 4],
        clip: Option<&Mask>,
    ) {
        // Lay the run out on a baseline at y = 0 starting at x = 0
        let mut caret = 0.0;
        let mut run: Vec<(&FontArc, Glyph)> = Vec::new();
        for ch in text.chars() {
            // Variation selectors and the like have no glyph anywhere
            let Some(font) = self.font_for(ch) else {
                continue;
            };
            let scale = em_scale(font, font_size);
            let id = font.glyph_id(ch);
            run.push((font, id.with_scale_and_position(scale, point(caret, 0.0))));
            caret += font.as_scaled(scale).h_advance(id);
        }

        let Some((metrics_font, _)) = run.first() else {
            debug!("No font covers sticker text {:?}", text);
            return;
        };
        let metrics = metrics_font.as_scaled(em_scale(metrics_font, font_size));
        let origin_x = center.x - caret / 2.0;
        let baseline = center.y + (metrics.ascent() + metrics.descent()) / 2.0;

        let [r, g, b, a] = color;
        for (font, mut glyph) in run {
            glyph.position = point(origin_x + glyph.position.x, baseline);
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };

            let bounds = outlined.px_bounds();
            let width = bounds.width().ceil() as u32;
            let height = bounds.height().ceil() as u32;
            let Some(mut coverage) = Pixmap::new(width, height) else {
                continue;
            };

            let pixels = coverage.pixels_mut();
            outlined.draw(|x, y, c| {
                if x < width && y < height {
                    let alpha = (a as f32 * c.clamp(0.0, 1.0)).round() as u8;
                    pixels[(y * width + x) as usize] = ColorU8::from_rgba(r, g, b, alpha).premultiply();
                }
            });

            pixmap.draw_pixmap(
                bounds.min.x as i32,
                bounds.min.y as i32,
                coverage.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                clip,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_fonts_load() {
        let painter = FontGlyphPainter::from_egui_defaults();
        assert!(painter.font_count() > 0);
    }

    #[test]
    fn test_glyph_is_drawn_around_center() {
        let painter = FontGlyphPainter::from_egui_defaults();
        let mut pixmap = Pixmap::new(200, 200).unwrap();
        painter.paint_glyph(&mut pixmap, "H", Pos2::new(100.0, 100.0), 40.0, [0, 0, 0, 255], None);

        let mut inked = Vec::new();
        for y in 0..200 {
            for x in 0..200 {
                if pixmap.pixel(x, y).unwrap().alpha() > 0 {
                    inked.push((x, y));
                }
            }
        }
        assert!(!inked.is_empty());

        // Everything lands within one em of the anchor
        for (x, y) in inked {
            assert!((x as i32 - 100).abs() <= 40 && (y as i32 - 100).abs() <= 40);
        }
    }

    fn bundled_font(name: &str) -> FontArc {
        let definitions = egui::FontDefinitions::default();
        let data = definitions.font_data.get(name).unwrap();
        FontArc::try_from_vec(data.font.to_vec()).unwrap()
    }

    #[test]
    fn test_font_size_is_the_em_size() {
        let font = bundled_font("Ubuntu-Light");
        let outline = font.outline(font.glyph_id('H')).unwrap();
        let upem = font.units_per_em().unwrap();
        // Outline bounds are y-up, so only the magnitude is meaningful
        let expected = (outline.bounds.max.y - outline.bounds.min.y).abs() / upem * 40.0;

        let painter = FontGlyphPainter::new(vec![font]);
        let mut pixmap = Pixmap::new(200, 200).unwrap();
        painter.paint_glyph(&mut pixmap, "H", Pos2::new(100.0, 100.0), 40.0, [0, 0, 0, 255], None);

        let inked_rows = (0..200)
            .filter(|&y| (0..200).any(|x| pixmap.pixel(x, y).unwrap().alpha() > 0))
            .count();
        assert!(
            (inked_rows as f32 - expected).abs() <= 2.0,
            "ink height {} vs cap height {}",
            inked_rows,
            expected
        );
    }

    #[test]
    fn test_empty_painter_draws_nothing() {
        let painter = FontGlyphPainter::new(Vec::new());
        let mut pixmap = Pixmap::new(50, 50).unwrap();
        painter.paint_glyph(&mut pixmap, "★", Pos2::new(25.0, 25.0), 40.0, [0, 0, 0, 255], None);
        assert!(pixmap.pixels().iter().all(|p| p.alpha() == 0));
    }
}
