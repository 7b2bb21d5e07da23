use eframe::egui;

/// An image file dropped onto the window, read into memory
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up any newly dropped files from the UI context.
    /// Returns true if there is something to process.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
            }
        });
        !self.dropped_files.is_empty()
    }

    /// Drains the queued files, returning the first usable image.
    pub fn take_dropped_image(&mut self) -> Option<DroppedImage> {
        std::mem::take(&mut self.dropped_files)
            .iter()
            .find_map(read_dropped_image)
    }

    /// Preview files being dragged over the application
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, FontId, Id, LayerId, Order};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            "Drop a photo to edit it",
            FontId::proportional(24.0),
            Color32::WHITE,
        );
    }
}

fn file_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Check if a file is an image based on MIME type or extension
pub fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }

    let name = file
        .path
        .as_ref()
        .and_then(|path| path.extension())
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .or_else(|| file.name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()));
    matches!(
        name.as_deref(),
        Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp")
    )
}

fn read_dropped_image(file: &egui::DroppedFile) -> Option<DroppedImage> {
    let name = file_name(file);
    if !is_image_file(file) {
        log::warn!("Dropped file is not a supported type: {}", name);
        return None;
    }

    if let Some(bytes) = &file.bytes {
        log::info!("Reading image from memory: {} ({} bytes)", name, bytes.len());
        return Some(DroppedImage {
            name,
            bytes: bytes.to_vec(),
        });
    }

    let Some(path) = &file.path else {
        log::warn!("Dropped file has no accessible data: {}", name);
        return None;
    };

    log::info!("Reading image from path: {}", path.display());
    match std::fs::read(path) {
        Ok(bytes) => Some(DroppedImage { name, bytes }),
        Err(err) => {
            log::error!("Failed to read image file: {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropped(name: &str, mime: &str, bytes: Option<&[u8]>) -> egui::DroppedFile {
        egui::DroppedFile {
            name: name.to_owned(),
            mime: mime.to_owned(),
            bytes: bytes.map(|b| b.to_vec().into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_image_detection() {
        assert!(is_image_file(&dropped("x", "image/png", None)));
        assert!(!is_image_file(&dropped("x", "text/plain", None)));
        assert!(is_image_file(&dropped("holiday.JPG", "", None)));
        assert!(!is_image_file(&dropped("notes.txt", "", None)));
    }

    #[test]
    fn test_take_first_usable_image() {
        let mut handler = FileHandler::new();
        handler.dropped_files = vec![
            dropped("notes.txt", "", Some(b"hello")),
            dropped("a.png", "", Some(&[1, 2, 3])),
            dropped("b.png", "", Some(&[4])),
        ];

        let image = handler.take_dropped_image().unwrap();
        assert_eq!(image.name, "a.png");
        assert_eq!(image.bytes, vec![1, 2, 3]);
        assert!(handler.take_dropped_image().is_none());
    }
}
