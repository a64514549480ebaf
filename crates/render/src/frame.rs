use glam::Vec2;
use showcase_common::DrawSurface;
use showcase_particles::DrawCommand;
use showcase_viewport::SceneFrame;

/// Axis-aligned rectangle in window pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.x + self.width && p.y < self.y + self.height
    }

    /// Pixel size, rounded; what a viewport container reports.
    pub fn surface(&self) -> DrawSurface {
        DrawSurface::new(
            self.width.max(0.0).round() as u32,
            self.height.max(0.0).round() as u32,
        )
    }

    /// Shrink by `pad` on every side, never below zero size.
    pub fn inset(&self, pad: f32) -> Self {
        Self {
            x: self.x + pad,
            y: self.y + pad,
            width: (self.width - 2.0 * pad).max(0.0),
            height: (self.height - 2.0 * pad).max(0.0),
        }
    }
}

/// One composited frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    /// The particle layer's surface: the whole window.
    pub surface: DrawSurface,
    pub particles: Vec<DrawCommand>,
    /// How many particles are grown past their rest size.
    pub expanded: usize,
    /// The 3D layer and the rectangle it is drawn into.
    pub scene: Option<(Rect, SceneFrame)>,
}
