use egui::Vec2;

use crate::config::ScaleRange;

/// Direction of a discrete zoom click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    fn sign(self) -> f32 {
        match self {
            ZoomDirection::In => 1.0,
            ZoomDirection::Out => -1.0,
        }
    }
}

/// Translation plus uniform scale applied to an object before rasterization.
///
/// Translation is never clamped; content may be moved fully outside the frame.
/// Sessions change scale through [`Transform2D::set_scale`] and
/// [`Transform2D::step_scale`], which clamp to a [`ScaleRange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    pub scale: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        scale: 1.0,
    };

    pub fn new(position: Vec2, scale: f32) -> Self {
        Self { position, scale }
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn translate_by(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Sets the scale, clamped into `range`. Returns the stored value.
    pub fn set_scale(&mut self, scale: f32, range: ScaleRange) -> f32 {
        self.scale = range.clamp(scale);
        self.scale
    }

    /// Applies one additive zoom step, clamped into `range`.
    pub fn step_scale(&mut self, direction: ZoomDirection, step: f32, range: ScaleRange) -> f32 {
        self.set_scale(self.scale + direction.sign() * step, range)
    }
}
