#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod compositor;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod file_handler;
pub mod geometry;
pub mod input;
pub mod panels;
pub mod renderer;
pub mod session;
pub mod store;
pub mod transform;

/// Identifier used for the window and the eframe storage directory
pub const APP_ID: &str = "shape_studio";

pub use app::ShapeStudioApp;
pub use compositor::{Compositor, ExportedPhoto, ExportedSticker, FontGlyphPainter, Frame, GlyphPainter};
pub use config::{EditorConfig, ExportFormat, ScaleRange};
pub use editor::{ExportHandle, PhotoEditor};
pub use error::{ConfigError, EditorError, EditorResult};
pub use event::{Change, ChangeKind, EditEvent, EditTarget, EventBus, EventHandler, EventLog, Subscription};
pub use geometry::{clip_path, ClipPath, Shape};
pub use input::{DragState, InteractionController, PointerEvent, PointerSurface};
pub use session::{ActiveObject, EditSession, SourceImage, Sticker, StickerId, STICKER_PALETTE};
pub use store::{PhotoId, PhotoRecord, PhotoStore, StickerRecord, StorePersistence};
pub use transform::{Transform2D, ZoomDirection};
