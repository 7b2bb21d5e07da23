//! Pointer-drag state machine for the edit surface.
//!
//! ```text
//!            down on sticker              move: position = pointer - offset
//!   ┌──────┐ ─────────────────► ┌────────────────────────┐ ◄─┐
//!   │      │                    │ DraggingSticker(id)    │ ──┘
//!   │ Idle │ ◄───────────────── └────────────────────────┘
//!   │      │      up / leave
//!   │      │ ─────────────────► ┌────────────────────────┐ ◄─┐
//!   └──────┘  down on photo     │ DraggingBase           │ ──┘
//!        ▲                      └────────────────────────┘
//!        └────────────────────────────── up / leave
//! ```
//!
//! The captured offset is `pointer - position` at press time, so the grabbed
//! point stays under the pointer for the whole drag. Stickers win over the
//! photo; among overlapping stickers the topmost wins. A press on bare
//! surface outside the panned and zoomed photo starts nothing.
use egui::{Pos2, Vec2};
use log::debug;

use super::{PointerEvent, PointerSurface};
use crate::session::{ActiveObject, EditSession, StickerId};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    DraggingBase {
        offset: Vec2,
    },
    DraggingSticker {
        id: StickerId,
        offset: Vec2,
    },
}

impl DragState {
    pub fn name(&self) -> &'static str {
        match self {
            DragState::Idle => "Idle",
            DragState::DraggingBase { .. } => "DraggingBase",
            DragState::DraggingSticker { .. } => "DraggingSticker",
        }
    }
}

#[derive(Debug, Default)]
pub struct InteractionController {
    state: DragState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    /// Feeds one pointer event through the state machine, mutating `session`.
    pub fn handle_event(
        &mut self,
        event: PointerEvent,
        session: &mut EditSession,
        surface: &mut dyn PointerSurface,
    ) {
        match (self.state, event) {
            (DragState::Idle, PointerEvent::Down(pos)) => self.begin_drag(pos, session, surface),
            (DragState::DraggingBase { offset }, PointerEvent::Move(pos)) => {
                session.set_base_position(pos.to_vec2() - offset);
            }
            (DragState::DraggingSticker { id, offset }, PointerEvent::Move(pos)) => {
                if !session.set_sticker_position(id, pos.to_vec2() - offset) {
                    // Sticker removed mid-drag
                    self.end_drag(session, surface);
                }
            }
            (_, PointerEvent::Up(_) | PointerEvent::Leave) if self.is_dragging() => {
                self.end_drag(session, surface);
            }
            // Hover moves, stray releases and presses during a drag
            _ => {}
        }
    }

    /// Drops any in-progress drag without further mutation, e.g. when the
    /// session is closed.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }

    fn begin_drag(&mut self, pos: Pos2, session: &mut EditSession, surface: &mut dyn PointerSurface) {
        if !surface.contains(pos) {
            return;
        }

        self.state = if let Some(id) = session.sticker_at(pos) {
            let position = session.sticker(id).map(|s| s.position()).unwrap_or_default();
            session.activate(ActiveObject::Sticker(id));
            DragState::DraggingSticker {
                id,
                offset: pos.to_vec2() - position,
            }
        } else if session.base_contains(pos) {
            session.activate(ActiveObject::BaseImage);
            DragState::DraggingBase {
                offset: pos.to_vec2() - session.base().transform.position,
            }
        } else {
            debug!("Press at {:?} missed the photo", pos);
            return;
        };
        surface.capture_pointer();
        debug!("Drag started: {}", self.state.name());
    }

    fn end_drag(&mut self, session: &mut EditSession, surface: &mut dyn PointerSurface) {
        debug!("Drag ended: {}", self.state.name());
        self.state = DragState::Idle;
        session.deactivate();
        surface.release_pointer();
    }
}
