//! The edit session aggregate.
//!
//! An [`EditSession`] owns everything one user edit touches: the photo and
//! its pan/zoom, the ordered sticker list, the chosen shape and the single
//! active object. Every mutation bumps [`EditSession::revision`] and emits an
//! [`EditEvent`] on the shared bus after the new value is stored.

use std::rc::Rc;

use egui::{Pos2, Vec2};
use log::{debug, info, warn};

use crate::config::EditorConfig;
use crate::event::{Change, EditEvent, EditTarget, EventBus};
use crate::geometry::{hit_testing, Shape};
use crate::transform::ZoomDirection;

mod base_image;
mod sticker;

pub use base_image::{BaseImage, SourceImage};
pub use sticker::{Sticker, StickerId, STICKER_PALETTE};
use sticker::StickerIdGenerator;

/// The object currently receiving drag input. At most one exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveObject {
    #[default]
    None,
    BaseImage,
    Sticker(StickerId),
}

#[derive(Debug)]
pub struct EditSession {
    config: EditorConfig,
    base: BaseImage,
    stickers: Vec<Sticker>,
    shape: Shape,
    active: ActiveObject,
    selected_sticker: Option<StickerId>,
    viewport: Vec2,
    revision: u64,
    sticker_ids: StickerIdGenerator,
    bus: Rc<EventBus>,
}

impl EditSession {
    /// Starts a session on `image` shown in an edit surface of `viewport` size.
    pub fn new(image: SourceImage, viewport: Vec2, config: EditorConfig, bus: Rc<EventBus>) -> Self {
        info!(
            "Starting edit session: image {}x{}, viewport {}x{}",
            image.width(),
            image.height(),
            viewport.x,
            viewport.y
        );
        Self {
            config,
            base: BaseImage::new(image),
            stickers: Vec::new(),
            shape: Shape::default(),
            active: ActiveObject::None,
            selected_sticker: None,
            viewport,
            revision: 0,
            sticker_ids: StickerIdGenerator::default(),
            bus,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn base(&self) -> &BaseImage {
        &self.base
    }

    /// Stickers in z-order, oldest (bottom) first
    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    pub fn sticker(&self, id: StickerId) -> Option<&Sticker> {
        self.stickers.iter().find(|s| s.id == id)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Incremented on every state change; used to invalidate previews.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn active(&self) -> ActiveObject {
        self.active
    }

    pub fn is_active(&self, object: ActiveObject) -> bool {
        object != ActiveObject::None && self.active == object
    }

    pub fn selected_sticker(&self) -> Option<StickerId> {
        self.selected_sticker
    }

    /// Glyph size of a sticker at its current scale
    pub fn sticker_font_size(&self, sticker: &Sticker) -> f32 {
        self.config.sticker_base_font_size * sticker.transform.scale
    }

    /// Topmost sticker whose glyph box covers the surface-space `pos`
    pub fn sticker_at(&self, pos: Pos2) -> Option<StickerId> {
        hit_testing::topmost_sticker_at(
            pos,
            self.viewport,
            &self.stickers,
            self.config.sticker_base_font_size,
        )
    }

    /// Whether `pos` lies on the panned and zoomed photo.
    pub fn base_contains(&self, pos: Pos2) -> bool {
        let size = Vec2::new(self.base.source.width() as f32, self.base.source.height() as f32);
        hit_testing::base_image_rect(self.viewport, size, &self.base.transform).contains(pos)
    }

    /// Resizes the edit surface. Not an edit: no event is emitted.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.revision += 1;
        }
    }

    /// Swaps in a newly selected photo, releasing the previous one and
    /// resetting the pan/zoom.
    pub fn replace_image(&mut self, image: SourceImage) {
        info!("Replacing photo with {}x{} image", image.width(), image.height());
        self.base = BaseImage::new(image);
        if self.active == ActiveObject::BaseImage {
            self.active = ActiveObject::None;
        }
        let position = self.base.transform.position;
        let scale = self.base.transform.scale;
        self.touch();
        self.emit(EditTarget::Photo, Change::Position { x: position.x, y: position.y });
        self.emit(EditTarget::Photo, Change::Scale(scale));
    }

    pub fn set_shape(&mut self, shape: Shape) {
        debug!("Shape {} -> {}", self.shape, shape);
        self.shape = shape;
        self.touch();
        self.emit(EditTarget::Photo, Change::Shape(shape));
    }

    // --- base image ---

    pub fn set_base_position(&mut self, position: Vec2) {
        self.base.transform.set_position(position);
        self.base_position_changed();
    }

    pub fn translate_base(&mut self, delta: Vec2) {
        self.base.transform.translate_by(delta);
        self.base_position_changed();
    }

    pub fn set_base_scale(&mut self, scale: f32) -> f32 {
        let scale = self.base.transform.set_scale(scale, self.config.base_scale_range);
        self.touch();
        self.emit(EditTarget::Photo, Change::Scale(scale));
        scale
    }

    /// One zoom click on the photo. Out-of-range results clamp silently.
    pub fn zoom_base(&mut self, direction: ZoomDirection) -> f32 {
        let scale = self.base.transform.step_scale(
            direction,
            self.config.scale_step,
            self.config.base_scale_range,
        );
        self.touch();
        self.emit(EditTarget::Photo, Change::Scale(scale));
        scale
    }

    fn base_position_changed(&mut self) {
        let position = self.base.transform.position;
        self.touch();
        self.emit(EditTarget::Photo, Change::Position { x: position.x, y: position.y });
    }

    // --- stickers ---

    /// Appends a sticker on top of the others at the surface centre and
    /// selects it.
    pub fn add_sticker(&mut self, glyph: impl Into<String>) -> StickerId {
        let sticker = Sticker::new(self.sticker_ids.generate(), glyph);
        let id = sticker.id;
        let change = Change::StickerAdded {
            glyph: sticker.glyph.clone(),
            x: sticker.transform.position.x,
            y: sticker.transform.position.y,
            scale: sticker.transform.scale,
        };
        debug!("Adding {} ({})", id, sticker.glyph);
        self.stickers.push(sticker);
        self.selected_sticker = Some(id);
        self.touch();
        self.emit(EditTarget::Sticker(id), change);
        id
    }

    /// Removes a sticker, keeping the relative order of the rest. Unknown ids
    /// are ignored.
    pub fn remove_sticker(&mut self, id: StickerId) -> bool {
        let Some(index) = self.stickers.iter().position(|s| s.id == id) else {
            warn!("Ignoring removal of unknown {}", id);
            return false;
        };

        self.stickers.remove(index);
        if self.selected_sticker == Some(id) {
            self.selected_sticker = None;
        }
        if self.active == ActiveObject::Sticker(id) {
            self.active = ActiveObject::None;
        }
        self.touch();
        self.emit(EditTarget::Sticker(id), Change::StickerRemoved);
        true
    }

    pub fn set_sticker_position(&mut self, id: StickerId, position: Vec2) -> bool {
        let Some(sticker) = self.sticker_mut(id) else {
            return false;
        };
        sticker.transform.set_position(position);
        self.sticker_position_changed(id, position);
        true
    }

    pub fn translate_sticker(&mut self, id: StickerId, delta: Vec2) -> bool {
        let Some(sticker) = self.sticker_mut(id) else {
            return false;
        };
        sticker.transform.translate_by(delta);
        let position = sticker.transform.position;
        self.sticker_position_changed(id, position);
        true
    }

    pub fn set_sticker_scale(&mut self, id: StickerId, scale: f32) -> Option<f32> {
        let range = self.config.sticker_scale_range;
        let scale = self.sticker_mut(id)?.transform.set_scale(scale, range);
        self.sticker_scale_changed(id, scale);
        Some(scale)
    }

    /// One zoom click on a sticker. Returns `None` if the sticker is gone.
    pub fn zoom_sticker(&mut self, id: StickerId, direction: ZoomDirection) -> Option<f32> {
        let step = self.config.scale_step;
        let range = self.config.sticker_scale_range;
        let scale = self.sticker_mut(id)?.transform.step_scale(direction, step, range);
        self.sticker_scale_changed(id, scale);
        Some(scale)
    }

    /// Zooms whichever sticker is selected; a no-op when none is.
    pub fn zoom_selected_sticker(&mut self, direction: ZoomDirection) -> Option<f32> {
        let id = self.selected_sticker?;
        self.zoom_sticker(id, direction)
    }

    pub fn remove_selected_sticker(&mut self) -> bool {
        match self.selected_sticker {
            Some(id) => self.remove_sticker(id),
            None => false,
        }
    }

    fn sticker_mut(&mut self, id: StickerId) -> Option<&mut Sticker> {
        self.stickers.iter_mut().find(|s| s.id == id)
    }

    fn sticker_position_changed(&mut self, id: StickerId, position: Vec2) {
        self.touch();
        self.emit(EditTarget::Sticker(id), Change::Position { x: position.x, y: position.y });
    }

    fn sticker_scale_changed(&mut self, id: StickerId, scale: f32) {
        self.touch();
        self.emit(EditTarget::Sticker(id), Change::Scale(scale));
    }

    // --- activation ---

    /// Makes `object` the single active object, deactivating any previous one
    /// in the same step. Activating a sticker also selects it; activating the
    /// photo clears the sticker selection.
    pub fn activate(&mut self, object: ActiveObject) {
        match object {
            ActiveObject::Sticker(id) if self.sticker(id).is_none() => {
                warn!("Ignoring activation of unknown {}", id);
                return;
            }
            ActiveObject::Sticker(id) => self.selected_sticker = Some(id),
            ActiveObject::BaseImage => self.selected_sticker = None,
            ActiveObject::None => {}
        }
        if self.active != object {
            debug!("Active object {:?} -> {:?}", self.active, object);
            self.active = object;
            self.touch();
        }
    }

    /// Ends the current drag. The sticker selection is kept so the zoom and
    /// remove controls keep working on it.
    pub fn deactivate(&mut self) {
        self.activate(ActiveObject::None);
    }

    pub fn select_sticker(&mut self, id: Option<StickerId>) {
        let id = id.filter(|id| self.sticker(*id).is_some());
        if self.selected_sticker != id {
            self.selected_sticker = id;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn emit(&self, target: EditTarget, change: Change) {
        self.bus.emit(EditEvent::new(target, change));
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        debug!("Edit session released ({} stickers)", self.stickers.len());
    }
}
