use egui::Vec2;
use serde::{Deserialize, Serialize};

use crate::transform::Transform2D;

/// Emoji offered by the sticker picker
pub const STICKER_PALETTE: [&str; 16] = [
    "😊", "😍", "🥰", "😎", "🤩", "😇", "😋", "😌", "😉", "😜", "😝", "😛", "🤗", "🤔", "🤭", "🤫",
];

/// Identifier of a sticker, unique within one edit session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StickerId(pub u64);

impl std::fmt::Display for StickerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sticker-{}", self.0)
    }
}

/// Hands out sticker ids for a single session. Ids are never reused, even
/// after the sticker holding one is removed.
#[derive(Debug, Clone)]
pub(crate) struct StickerIdGenerator {
    next: u64,
}

impl Default for StickerIdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl StickerIdGenerator {
    pub(crate) fn generate(&mut self) -> StickerId {
        let id = StickerId(self.next);
        self.next += 1;
        id
    }
}

/// A decorative glyph placed over the photo.
///
/// `transform.position` is measured from the centre of the edit surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Sticker {
    pub id: StickerId,
    pub glyph: String,
    pub transform: Transform2D,
}

impl Sticker {
    pub(crate) fn new(id: StickerId, glyph: impl Into<String>) -> Self {
        Self {
            id,
            glyph: glyph.into(),
            transform: Transform2D::IDENTITY,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn scale(&self) -> f32 {
        self.transform.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential_and_unique() {
        let mut ids = StickerIdGenerator::default();
        let a = ids.generate();
        let b = ids.generate();
        assert_ne!(a, b);
        assert_eq!(a, StickerId(1));
        assert_eq!(b.to_string(), "sticker-2");
    }

    #[test]
    fn test_new_sticker_sits_at_centre() {
        let sticker = Sticker::new(StickerId(7), "★");
        assert_eq!(sticker.position(), Vec2::ZERO);
        assert_eq!(sticker.scale(), 1.0);
    }
}
