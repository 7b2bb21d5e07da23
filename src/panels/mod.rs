mod album_panel;
mod editor_modal;

pub use album_panel::album_panel;
pub use editor_modal::{editor_modal, EDIT_SURFACE_SIZE};
