use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{PhotoId, PhotoRecord, PhotoStore};

const INDEX_FILE: &str = "photos.json";
/// Store-owned image files are `photo-<uuid>.<ext>`
const IMAGE_PREFIX: &str = "photo-";
/// Downloaded copies are `foto-forma-<uuid>.<ext>`
const DOWNLOAD_PREFIX: &str = "foto-forma-";

/// Errors that can occur while saving or loading the photo store
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize photo index: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to access store files: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing image for photo {0}")]
    MissingImage(PhotoId),

    #[error("Invalid photo index: {0}")]
    InvalidIndex(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// On-disk index of the store
#[derive(Debug, Serialize, Deserialize)]
struct StoreIndex {
    version: String,
    photos: Vec<PhotoRecord>,
}

/// Saves a [`PhotoStore`] as a JSON index plus one image file per photo.
#[derive(Debug, Clone)]
pub struct StorePersistence {
    dir: PathBuf,
}

impl StorePersistence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn image_path(&self, photo: &PhotoRecord) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", IMAGE_PREFIX, photo.id, extension(photo)))
    }

    /// Writes every photo image and then the index. Image files of photos no
    /// longer in the store are removed.
    pub fn save(&self, store: &PhotoStore) -> PersistenceResult<()> {
        fs::create_dir_all(&self.dir)?;

        for photo in store.photos() {
            fs::write(self.image_path(photo), &photo.image)?;
        }

        let index = StoreIndex {
            version: env!("CARGO_PKG_VERSION").to_string(),
            photos: store.photos().to_vec(),
        };
        let json = serde_json::to_string_pretty(&index)?;
        fs::write(self.dir.join(INDEX_FILE), json)?;

        self.remove_orphaned_images(store)?;
        info!("Saved {} photos to {}", store.len(), self.dir.display());
        Ok(())
    }

    /// Loads the store. A directory without an index yields an empty store.
    pub fn load(&self) -> PersistenceResult<PhotoStore> {
        let index_path = self.dir.join(INDEX_FILE);
        if !index_path.exists() {
            return Ok(PhotoStore::new());
        }

        let json = fs::read_to_string(index_path)?;
        let index: StoreIndex = serde_json::from_str(&json)?;
        if index.version != env!("CARGO_PKG_VERSION") {
            warn!(
                "Photo index version {} differs from current version {}",
                index.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        let mut photos = index.photos;
        for photo in &mut photos {
            let path = self.image_path(photo);
            photo.image = match fs::read(&path) {
                Ok(bytes) if !bytes.is_empty() => bytes,
                Ok(_) => return Err(PersistenceError::MissingImage(photo.id)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    return Err(PersistenceError::MissingImage(photo.id));
                }
                Err(err) => return Err(err.into()),
            };
        }

        let mut seen = HashSet::new();
        if let Some(dup) = photos.iter().find(|p| !seen.insert(p.id)) {
            return Err(PersistenceError::InvalidIndex(format!("duplicate photo id {}", dup.id)));
        }

        info!("Loaded {} photos from {}", photos.len(), self.dir.display());
        Ok(PhotoStore::from_records(photos))
    }

    /// Removes `photo-<uuid>` images that no photo in the store refers to.
    /// Anything else in the directory is left alone.
    fn remove_orphaned_images(&self, store: &PhotoStore) -> PersistenceResult<()> {
        let keep: HashSet<PathBuf> = store.photos().iter().map(|p| self.image_path(p)).collect();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if is_store_image(&path) && !keep.contains(&path) {
                info!("Removing orphaned image {}", path.display());
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

fn extension(photo: &PhotoRecord) -> &'static str {
    match photo.format {
        crate::config::ExportFormat::Png => "png",
    }
}

fn is_store_image(path: &Path) -> bool {
    if !path.is_file() || path.extension().is_none_or(|ext| ext != "png") {
        return false;
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.strip_prefix(IMAGE_PREFIX))
        .is_some_and(|id| Uuid::parse_str(id).is_ok())
}

/// Name a downloaded copy of `photo` gets.
pub fn download_file_name(photo: &PhotoRecord) -> String {
    format!("{}{}.{}", DOWNLOAD_PREFIX, photo.id, extension(photo))
}

/// Writes the encoded image of `photo` into `dest_dir` under its download
/// name, creating the directory if needed. Returns the written path.
pub fn export_photo(photo: &PhotoRecord, dest_dir: &Path) -> PersistenceResult<PathBuf> {
    if photo.image.is_empty() {
        return Err(PersistenceError::MissingImage(photo.id));
    }
    fs::create_dir_all(dest_dir)?;
    let path = dest_dir.join(download_file_name(photo));
    fs::write(&path, &photo.image)?;
    info!("Exported photo {} to {}", photo.id, path.display());
    Ok(path)
}
