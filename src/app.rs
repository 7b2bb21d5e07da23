use std::ffi::OsString;
use std::path::PathBuf;

use egui::Vec2;
use log::{error, info};

use crate::config::EditorConfig;
use crate::editor::{ExportHandle, PhotoEditor};
use crate::error::EditorError;
use crate::event::EditEvent;
use crate::file_handler::FileHandler;
use crate::input::{EguiSurface, InputHandler};
use crate::panels::{album_panel, editor_modal, EDIT_SURFACE_SIZE};
use crate::renderer::{PreviewRenderer, ThumbnailCache};
use crate::store::{export_photo, PhotoId, PhotoStore, StorePersistence};

/// Relative to the working directory unless `SHAPE_STUDIO_PHOTOS` is set
const DEFAULT_STORE_DIR: &str = "shape_studio_photos";

/// `SHAPE_STUDIO_PHOTOS` beats the directory remembered from the last run.
fn resolve_store_dir(env: Option<OsString>, persisted: Option<PathBuf>) -> PathBuf {
    env.map(PathBuf::from)
        .or(persisted)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR))
}

/// `SHAPE_STUDIO_DOWNLOADS`, else `~/Downloads`, else the working directory.
fn resolve_downloads_dir(env: Option<OsString>, home: Option<OsString>) -> PathBuf {
    env.map(PathBuf::from)
        .or_else(|| home.map(|home| PathBuf::from(home).join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct ShapeStudioApp {
    /// Where saved photos live between runs
    store_dir: Option<PathBuf>,

    #[serde(skip)]
    editor: PhotoEditor,
    #[serde(skip)]
    store: PhotoStore,
    #[serde(skip)]
    preview: PreviewRenderer,
    #[serde(skip)]
    thumbnails: ThumbnailCache,
    #[serde(skip)]
    file_handler: FileHandler,
    #[serde(skip)]
    input: InputHandler,
    #[serde(skip)]
    surface: Option<EguiSurface>,
    #[serde(skip)]
    pending_export: Option<ExportHandle>,
    #[serde(skip)]
    status: Option<String>,
}

impl Default for ShapeStudioApp {
    fn default() -> Self {
        Self {
            store_dir: None,
            editor: PhotoEditor::default(),
            store: PhotoStore::new(),
            preview: PreviewRenderer::new(),
            thumbnails: ThumbnailCache::new(),
            file_handler: FileHandler::new(),
            input: InputHandler::new(),
            surface: None,
            pending_export: None,
            status: None,
        }
    }
}

impl ShapeStudioApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: EditorConfig) -> Self {
        let mut app: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        app.editor = PhotoEditor::new(config);
        let ctx = cc.egui_ctx.clone();
        app.editor
            .subscribe(move |_: &EditEvent| ctx.request_repaint());

        let store_dir = resolve_store_dir(std::env::var_os("SHAPE_STUDIO_PHOTOS"), app.store_dir.take());
        info!("Photo store at {}", store_dir.display());
        app.store_dir = Some(store_dir);
        app.load_store();
        app
    }

    pub fn editor(&self) -> &PhotoEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut PhotoEditor {
        &mut self.editor
    }

    pub fn store(&self) -> &PhotoStore {
        &self.store
    }

    pub fn album_mut(&mut self) -> (&PhotoStore, &mut ThumbnailCache) {
        (&self.store, &mut self.thumbnails)
    }

    pub fn is_saving(&self) -> bool {
        self.pending_export.is_some()
    }

    /// Starts editing a photo, or swaps the photo of the open edit.
    pub fn open_photo(&mut self, bytes: &[u8]) {
        let result = if self.editor.is_open() {
            self.editor.replace_photo(bytes)
        } else {
            self.preview.invalidate();
            self.editor
                .open(bytes, Vec2::splat(EDIT_SURFACE_SIZE))
                .map(|_| ())
        };

        match result {
            Ok(()) => self.status = None,
            Err(err) => {
                error!("Cannot open photo: {}", err);
                self.status = Some(err.to_string());
            }
        }
    }

    /// Queues an export of the open edit. The photo is stored once the
    /// export resolves on a later frame.
    pub fn save_edit(&mut self) {
        match self.editor.export() {
            Ok(handle) => self.pending_export = Some(handle),
            Err(err) => {
                error!("Export failed: {}", err);
                self.status = Some(err.to_string());
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editor.close();
        self.pending_export = None;
        self.surface = None;
        self.preview.invalidate();
    }

    pub fn remove_photo(&mut self, id: PhotoId) {
        if self.store.remove_photo(id) {
            self.thumbnails.invalidate(id);
            self.persist_store();
        }
    }

    /// Writes a copy of a saved photo to the downloads directory.
    pub fn download_photo(&mut self, id: PhotoId) {
        let Some(photo) = self.store.photo(id) else {
            return;
        };
        let dest = resolve_downloads_dir(
            std::env::var_os("SHAPE_STUDIO_DOWNLOADS"),
            std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")),
        );
        match export_photo(photo, &dest) {
            Ok(path) => self.status = Some(format!("Downloaded to {}", path.display())),
            Err(err) => {
                error!("Failed to download photo {}: {}", id, err);
                self.status = Some(format!("Could not download photo: {err}"));
            }
        }
    }

    /// Feeds this frame's pointer input on the edit surface to the editor.
    pub fn handle_surface_input(&mut self, ctx: &egui::Context, rect: egui::Rect) {
        let surface = self.surface.get_or_insert_with(|| EguiSurface::new(rect));
        surface.set_rect(rect);
        self.editor.set_viewport(rect.size());

        for event in self.input.process_input(ctx, surface) {
            self.editor.handle_pointer(event, surface);
        }
    }

    pub fn render_preview(&mut self, ctx: &egui::Context, painter: &egui::Painter, rect: egui::Rect) {
        self.preview.render(ctx, painter, rect, &self.editor);
    }

    fn poll_export(&mut self) {
        self.editor.pump();

        let Some(result) = self.pending_export.as_mut().and_then(ExportHandle::try_take) else {
            return;
        };
        self.pending_export = None;

        match result {
            Ok(photo) => {
                let id = self.store.add_photo(photo);
                info!("Saved edit as {}", id);
                self.persist_store();
                self.cancel_edit();
            }
            Err(EditorError::ExportCancelled) => {}
            Err(err) => {
                error!("Export failed: {}", err);
                self.status = Some(err.to_string());
            }
        }
    }

    fn load_store(&mut self) {
        let Some(dir) = &self.store_dir else {
            return;
        };
        match StorePersistence::new(dir).load() {
            Ok(store) => self.store = store,
            Err(err) => {
                error!("Failed to load saved photos from {}: {}", dir.display(), err);
                self.status = Some(format!("Could not load saved photos: {err}"));
            }
        }
    }

    fn persist_store(&mut self) {
        let Some(dir) = &self.store_dir else {
            return;
        };
        if let Err(err) = StorePersistence::new(dir).save(&self.store) {
            error!("Failed to save photos to {}: {}", dir.display(), err);
            self.status = Some(format!("Could not save photos: {err}"));
        }
    }
}

impl eframe::App for ShapeStudioApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_export();

        self.file_handler.preview_files_being_dropped(ctx);
        if self.file_handler.check_for_dropped_files(ctx) {
            if let Some(dropped) = self.file_handler.take_dropped_image() {
                info!("Opening dropped photo {}", dropped.name);
                self.open_photo(&dropped.bytes);
            }
        }

        album_panel(self, ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Shape Studio");
            if let Some(status) = &self.status {
                ui.colored_label(ui.visuals().warn_fg_color, status);
            }
            if !self.editor.is_open() {
                ui.centered_and_justified(|ui| {
                    ui.label("Drop a photo here to frame it in a shape and decorate it with stickers");
                });
            }
        });

        editor_modal(self, ctx);

        if self.is_saving() {
            ctx.request_repaint();
        }
    }
}
