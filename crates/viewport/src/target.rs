use showcase_common::DrawSurface;

/// The renderer's backing buffer: logical container size times a capped
/// device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTarget {
    logical: DrawSurface,
    pixel_ratio: f32,
    max_pixel_ratio: f32,
}

impl RenderTarget {
    pub fn new(logical: DrawSurface, device_pixel_ratio: f32, max_pixel_ratio: f32) -> Self {
        let mut target = Self {
            logical,
            pixel_ratio: 1.0,
            max_pixel_ratio: max_pixel_ratio.max(1.0),
        };
        target.set_device_pixel_ratio(device_pixel_ratio);
        target
    }

    pub fn logical(&self) -> DrawSurface {
        self.logical
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Backing buffer size in physical pixels.
    pub fn physical(&self) -> DrawSurface {
        DrawSurface::new(
            (self.logical.width as f32 * self.pixel_ratio).round() as u32,
            (self.logical.height as f32 * self.pixel_ratio).round() as u32,
        )
    }

    /// Non-finite or non-positive ratios fall back to 1.
    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        let ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
        self.pixel_ratio = ratio.min(self.max_pixel_ratio);
    }

    /// Resize the logical buffer. A degenerate or unchanged size is a
    /// no-op; returns whether anything changed.
    pub fn resize(&mut self, logical: DrawSurface) -> bool {
        if logical.is_degenerate() || logical == self.logical {
            return false;
        }
        self.logical = logical;
        true
    }
}
