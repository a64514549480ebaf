use showcase_common::DrawSurface;
use showcase_render::Rect;

/// Share of the window height given to the model container.
pub const CONTAINER_HEIGHT_SHARE: f32 = 0.85;
/// Padding inside the model container.
pub const CONTAINER_PADDING: f32 = 10.0;

/// Hero layout: the model container takes the left half of the window,
/// 85% of its height, centered vertically, with 10 px padding.
pub fn hero_container(window: DrawSurface) -> Rect {
    let w = window.width as f32;
    let h = window.height as f32;
    let height = h * CONTAINER_HEIGHT_SHARE;
    Rect::new(0.0, (h - height) * 0.5, w * 0.5, height).inset(CONTAINER_PADDING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_is_left_half_and_centered() {
        let r = hero_container(DrawSurface::new(1200, 800));
        assert_eq!(r, Rect::new(10.0, 70.0, 580.0, 660.0));
    }

    #[test]
    fn tiny_window_gives_degenerate_container() {
        let r = hero_container(DrawSurface::new(16, 16));
        assert!(r.surface().is_degenerate());
    }
}
