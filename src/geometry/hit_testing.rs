use egui::{Pos2, Rect, Vec2};

use crate::session::{Sticker, StickerId};
use crate::transform::Transform2D;

/// Box covered by a sticker glyph drawn at `font_size`, centred on `center`.
pub fn sticker_rect(center: Pos2, font_size: f32) -> Rect {
    Rect::from_center_size(center, Vec2::splat(font_size))
}

/// Surface-space centre of a sticker. Sticker positions are offsets from the
/// middle of the edit surface.
pub fn sticker_center(viewport: Vec2, sticker: &Sticker) -> Pos2 {
    (viewport / 2.0 + sticker.transform.position).to_pos2()
}

/// Surface-space rect covered by the photo. The compositor scales about the
/// surface centre before applying the offset, so the offset is scaled too.
pub fn base_image_rect(viewport: Vec2, image_size: Vec2, transform: &Transform2D) -> Rect {
    let center = viewport / 2.0 + transform.position * transform.scale;
    Rect::from_center_size(center.to_pos2(), image_size * transform.scale)
}

/// Returns the topmost sticker under `pos`.
///
/// Stickers are stored oldest first, so the scan runs from the end and the
/// first hit wins.
pub fn topmost_sticker_at(
    pos: Pos2,
    viewport: Vec2,
    stickers: &[Sticker],
    base_font_size: f32,
) -> Option<StickerId> {
    stickers
        .iter()
        .rev()
        .find(|sticker| {
            let font_size = base_font_size * sticker.transform.scale;
            sticker_rect(sticker_center(viewport, sticker), font_size).contains(pos)
        })
        .map(|sticker| sticker.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sticker(id: u64, x: f32, y: f32, scale: f32) -> Sticker {
        Sticker {
            id: StickerId(id),
            glyph: "😊".to_owned(),
            transform: Transform2D::new(Vec2::new(x, y), scale),
        }
    }

    #[test]
    fn test_sticker_rect_is_centred() {
        let rect = sticker_rect(Pos2::new(200.0, 200.0), 40.0);
        assert_eq!(rect.min, Pos2::new(180.0, 180.0));
        assert_eq!(rect.max, Pos2::new(220.0, 220.0));
    }

    #[test]
    fn test_topmost_wins_on_overlap() {
        let viewport = Vec2::new(400.0, 400.0);
        let stickers = vec![sticker(1, 0.0, 0.0, 1.0), sticker(2, 10.0, 0.0, 1.0)];

        // Both stickers cover (205, 200); the later one is on top
        let hit = topmost_sticker_at(Pos2::new(205.0, 200.0), viewport, &stickers, 40.0);
        assert_eq!(hit, Some(StickerId(2)));

        // Only the older sticker covers (185, 200)
        let hit = topmost_sticker_at(Pos2::new(185.0, 200.0), viewport, &stickers, 40.0);
        assert_eq!(hit, Some(StickerId(1)));
    }

    #[test]
    fn test_scale_grows_hit_area() {
        let viewport = Vec2::new(400.0, 400.0);
        let small = vec![sticker(1, 0.0, 0.0, 0.5)];
        let large = vec![sticker(1, 0.0, 0.0, 2.0)];
        let probe = Pos2::new(230.0, 200.0);

        assert_eq!(topmost_sticker_at(probe, viewport, &small, 40.0), None);
        assert_eq!(topmost_sticker_at(probe, viewport, &large, 40.0), Some(StickerId(1)));
    }

    #[test]
    fn test_base_rect_follows_pan_and_zoom() {
        let viewport = Vec2::new(400.0, 400.0);
        let size = Vec2::new(200.0, 100.0);

        let rect = base_image_rect(viewport, size, &Transform2D::IDENTITY);
        assert_eq!(rect, Rect::from_min_max(Pos2::new(100.0, 150.0), Pos2::new(300.0, 250.0)));

        let rect = base_image_rect(viewport, size, &Transform2D::new(Vec2::new(40.0, 0.0), 0.5));
        assert_eq!(rect, Rect::from_min_max(Pos2::new(170.0, 175.0), Pos2::new(270.0, 225.0)));
    }
}
