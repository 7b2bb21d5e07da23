//! Saved photos: the collaborator that receives finished exports.
//!
//! Every operation follows an update-if-present policy. Targeting a photo or
//! sticker id that is not in the store changes nothing and reports `false`.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compositor::{ExportedPhoto, ExportedSticker};
use crate::config::ExportFormat;
use crate::geometry::Shape;

mod persistence;

pub use persistence::{
    download_file_name, export_photo, PersistenceError, PersistenceResult, StorePersistence,
};

/// Persistent identifier of a saved photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(Uuid);

impl PhotoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PhotoId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PhotoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persistent identifier of a sticker on a saved photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StickerRecordId(Uuid);

impl StickerRecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StickerRecordId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerRecord {
    pub id: StickerRecordId,
    pub glyph: String,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl StickerRecord {
    pub fn new(glyph: impl Into<String>, x: f32, y: f32, scale: f32) -> Self {
        Self {
            id: StickerRecordId::new(),
            glyph: glyph.into(),
            x,
            y,
            scale,
        }
    }
}

impl From<&ExportedSticker> for StickerRecord {
    fn from(sticker: &ExportedSticker) -> Self {
        Self::new(sticker.glyph.clone(), sticker.x, sticker.y, sticker.scale)
    }
}

/// Partial update for a stored sticker; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StickerUpdate {
    pub glyph: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub scale: Option<f32>,
}

/// A saved photo. The encoded image travels beside the JSON index, not in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: PhotoId,
    pub shape: Shape,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub format: ExportFormat,
    pub stickers: Vec<StickerRecord>,
    #[serde(skip)]
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct PhotoStore {
    photos: Vec<PhotoRecord>,
}

impl PhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_records(photos: Vec<PhotoRecord>) -> Self {
        Self { photos }
    }

    /// Saved photos in the order they were added
    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    pub fn photo(&self, id: PhotoId) -> Option<&PhotoRecord> {
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Stores a finished export under a fresh id.
    pub fn add_photo(&mut self, export: ExportedPhoto) -> PhotoId {
        let id = PhotoId::new();
        info!(
            "Storing photo {} ({} shape, {} stickers, {} bytes)",
            id,
            export.shape,
            export.stickers.len(),
            export.bytes.len()
        );
        self.photos.push(PhotoRecord {
            id,
            shape: export.shape,
            width: export.width,
            height: export.height,
            format: export.format,
            stickers: export.stickers.iter().map(StickerRecord::from).collect(),
            image: export.bytes,
        });
        id
    }

    /// Overwrites a photo with a re-edited export, keeping its id.
    pub fn update_photo(&mut self, id: PhotoId, export: ExportedPhoto) -> bool {
        let Some(photo) = self.photo_mut(id) else {
            return false;
        };
        photo.shape = export.shape;
        photo.width = export.width;
        photo.height = export.height;
        photo.format = export.format;
        photo.stickers = export.stickers.iter().map(StickerRecord::from).collect();
        photo.image = export.bytes;
        debug!("Updated photo {}", id);
        true
    }

    pub fn update_photo_shape(&mut self, id: PhotoId, shape: Shape) -> bool {
        match self.photo_mut(id) {
            Some(photo) => {
                photo.shape = shape;
                true
            }
            None => false,
        }
    }

    pub fn remove_photo(&mut self, id: PhotoId) -> bool {
        let before = self.photos.len();
        self.photos.retain(|p| p.id != id);
        let removed = self.photos.len() != before;
        if removed {
            info!("Removed photo {}", id);
        }
        removed
    }

    /// Appends a sticker to a photo. Returns the sticker's new id, or `None`
    /// when the photo does not exist.
    pub fn add_sticker(
        &mut self,
        photo_id: PhotoId,
        glyph: impl Into<String>,
        x: f32,
        y: f32,
        scale: f32,
    ) -> Option<StickerRecordId> {
        let photo = self.photo_mut(photo_id)?;
        let sticker = StickerRecord::new(glyph, x, y, scale);
        let id = sticker.id;
        photo.stickers.push(sticker);
        Some(id)
    }

    pub fn update_sticker(&mut self, photo_id: PhotoId, sticker_id: StickerRecordId, update: StickerUpdate) -> bool {
        let Some(sticker) = self
            .photo_mut(photo_id)
            .and_then(|p| p.stickers.iter_mut().find(|s| s.id == sticker_id))
        else {
            return false;
        };

        if let Some(glyph) = update.glyph {
            sticker.glyph = glyph;
        }
        if let Some(x) = update.x {
            sticker.x = x;
        }
        if let Some(y) = update.y {
            sticker.y = y;
        }
        if let Some(scale) = update.scale {
            sticker.scale = scale;
        }
        true
    }

    pub fn remove_sticker(&mut self, photo_id: PhotoId, sticker_id: StickerRecordId) -> bool {
        let Some(photo) = self.photo_mut(photo_id) else {
            return false;
        };
        let before = photo.stickers.len();
        photo.stickers.retain(|s| s.id != sticker_id);
        photo.stickers.len() != before
    }

    fn photo_mut(&mut self, id: PhotoId) -> Option<&mut PhotoRecord> {
        self.photos.iter_mut().find(|p| p.id == id)
    }
}
