use egui::{Context, PointerButton, Pos2, Rect, Vec2};

mod controller;
pub use controller::{DragState, InteractionController};

/// Pointer input in edit-surface coordinates (origin at the surface's top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Primary button was pressed
    Down(Pos2),
    /// Pointer moved (with or without the button held)
    Move(Pos2),
    /// Primary button was released
    Up(Pos2),
    /// Pointer left the interactive surface entirely
    Leave,
}

/// What the interaction controller needs from the surface it is attached to.
///
/// Keeping this behind a trait lets the drag logic run without a window.
pub trait PointerSurface {
    /// Size of the surface in the same units as pointer positions
    fn size(&self) -> Vec2;

    /// Whether `pos` lies on the surface
    fn contains(&self, pos: Pos2) -> bool {
        Rect::from_min_size(Pos2::ZERO, self.size()).contains(pos)
    }

    /// Route all pointer input to this surface until released
    fn capture_pointer(&mut self);

    fn release_pointer(&mut self);
}

/// Surface backed by an egui widget rect.
#[derive(Debug, Clone, Copy)]
pub struct EguiSurface {
    rect: Rect,
    captured: bool,
}

impl EguiSurface {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            captured: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Moves the surface (e.g. after a window resize), keeping capture state
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Converts a screen position into surface-local coordinates
    pub fn to_local(&self, screen: Pos2) -> Pos2 {
        (screen - self.rect.min).to_pos2()
    }
}

impl PointerSurface for EguiSurface {
    fn size(&self) -> Vec2 {
        self.rect.size()
    }

    fn capture_pointer(&mut self) {
        self.captured = true;
    }

    fn release_pointer(&mut self) {
        self.captured = false;
    }
}

/// Handles converting raw egui input into surface-local [`PointerEvent`]s
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process raw egui input and generate pointer events for `surface`.
    ///
    /// Presses only count when they land on the surface. Moves are reported
    /// anywhere in the window so a drag may continue past the edge; once the
    /// pointer leaves the window a `Leave` is produced.
    pub fn process_input(&mut self, ctx: &Context, surface: &EguiSurface) -> Vec<PointerEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let hover = input.pointer.hover_pos();

            match (hover, self.last_pointer_pos) {
                (Some(pos), last) => {
                    if Some(pos) != last {
                        events.push(PointerEvent::Move(surface.to_local(pos)));
                    }
                }
                (None, Some(_)) => events.push(PointerEvent::Leave),
                (None, None) => {}
            }
            self.last_pointer_pos = hover;

            if input.pointer.button_pressed(PointerButton::Primary) {
                if let Some(pos) = hover.filter(|pos| surface.rect().contains(*pos)) {
                    events.push(PointerEvent::Down(surface.to_local(pos)));
                }
            }
            if input.pointer.button_released(PointerButton::Primary) {
                let pos = hover.or(input.pointer.latest_pos()).unwrap_or(surface.rect().min);
                events.push(PointerEvent::Up(surface.to_local(pos)));
            }
        });

        events
    }
}
