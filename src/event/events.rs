use crate::geometry::Shape;
use crate::session::StickerId;

/// Object an edit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditTarget {
    /// The photo itself: base image transform and shape
    Photo,
    Sticker(StickerId),
}

/// What changed, carrying only the post-mutation values relevant to the kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Position { x: f32, y: f32 },
    Scale(f32),
    Shape(Shape),
    StickerAdded { glyph: String, x: f32, y: f32, scale: f32 },
    StickerRemoved,
}

impl Change {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Position { .. } => ChangeKind::Position,
            Change::Scale(_) => ChangeKind::Scale,
            Change::Shape(_) => ChangeKind::Shape,
            Change::StickerAdded { .. } => ChangeKind::StickerAdded,
            Change::StickerRemoved => ChangeKind::StickerRemoved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Position,
    Scale,
    Shape,
    StickerAdded,
    StickerRemoved,
}

/// Emitted synchronously after every mutation of an edit session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditEvent {
    pub target: EditTarget,
    pub change: Change,
}

impl EditEvent {
    pub fn new(target: EditTarget, change: Change) -> Self {
        Self { target, change }
    }

    pub fn kind(&self) -> ChangeKind {
        self.change.kind()
    }
}
