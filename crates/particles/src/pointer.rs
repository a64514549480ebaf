use glam::Vec2;

/// Latest pointer position relative to a drawing surface.
///
/// Single-slot, last-write-wins: input handlers post into it, the frame tick
/// reads it once. No pointer is known until the first move is posted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerTracker {
    /// Surface top-left corner in host (window) coordinates.
    origin: Vec2,
    latest: Option<Vec2>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker for a surface whose top-left corner sits at `origin`.
    pub fn with_origin(origin: Vec2) -> Self {
        Self {
            origin,
            latest: None,
        }
    }

    /// Move the surface origin. The stored position stays surface-local.
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Record a pointer position given in host coordinates.
    pub fn post(&mut self, host_x: f32, host_y: f32) {
        self.latest = Some(Vec2::new(host_x, host_y) - self.origin);
    }

    /// Last known surface-local position.
    pub fn latest(&self) -> Option<Vec2> {
        self.latest
    }

    /// Forget the pointer entirely.
    pub fn clear(&mut self) {
        self.latest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_without_a_pointer() {
        assert_eq!(PointerTracker::new().latest(), None);
    }

    #[test]
    fn converts_host_to_surface_coordinates() {
        let mut t = PointerTracker::with_origin(Vec2::new(10.0, 20.0));
        t.post(15.0, 25.0);
        assert_eq!(t.latest(), Some(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn last_write_wins() {
        let mut t = PointerTracker::new();
        t.post(1.0, 1.0);
        t.post(2.0, 3.0);
        assert_eq!(t.latest(), Some(Vec2::new(2.0, 3.0)));
        t.clear();
        assert_eq!(t.latest(), None);
    }
}
