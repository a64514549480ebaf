use glam::Vec2;
use serde::{Deserialize, Serialize};
use showcase_common::{Color, DrawSurface};

/// A single point particle. Plain value; behavior lives in [`step`] and [`draw`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Rest size.
    pub min_radius: f32,
    /// Hover-expanded size.
    pub max_radius: f32,
    pub color: Color,
}

impl Particle {
    /// A particle at rest size.
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, max_radius: f32, color: Color) -> Self {
        Self {
            position,
            velocity,
            radius,
            min_radius: radius,
            max_radius: max_radius.max(radius),
            color,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.radius > self.min_radius
    }
}

/// Square pointer neighborhood and per-tick radius step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoverRule {
    /// Half-width of the square neighborhood around the pointer.
    pub reach: f32,
    /// Radius change per tick.
    pub step: f32,
}

impl Default for HoverRule {
    fn default() -> Self {
        Self {
            reach: 50.0,
            step: 1.0,
        }
    }
}

impl HoverRule {
    /// Both axes are tested independently; the neighborhood is a square.
    pub fn contains(&self, pointer: Vec2, position: Vec2) -> bool {
        let d = pointer - position;
        d.x.abs() < self.reach && d.y.abs() < self.reach
    }
}

/// Draw instruction: filled circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawCommand {
    pub center: Vec2,
    pub radius: f32,
    pub color: Color,
}

/// Advance one particle by one fixed step.
///
/// A velocity component is negated when moving along it would push the
/// particle's edge past the surface boundary it is heading toward. The
/// surface is read as passed, so a resize takes effect on the next step.
pub fn step(mut p: Particle, surface: DrawSurface, pointer: Option<Vec2>, rule: HoverRule) -> Particle {
    let extent = surface.extent();
    let next = p.position + p.velocity;

    if (next.x + p.radius > extent.x && p.velocity.x > 0.0)
        || (next.x - p.radius < 0.0 && p.velocity.x < 0.0)
    {
        p.velocity.x = -p.velocity.x;
    }
    if (next.y + p.radius > extent.y && p.velocity.y > 0.0)
        || (next.y - p.radius < 0.0 && p.velocity.y < 0.0)
    {
        p.velocity.y = -p.velocity.y;
    }

    p.position += p.velocity;

    let hovered = pointer.is_some_and(|ptr| rule.contains(ptr, p.position));
    p.radius = if hovered {
        (p.radius + rule.step).min(p.max_radius)
    } else {
        (p.radius - rule.step).max(p.min_radius)
    };

    p
}

pub fn draw(p: &Particle) -> DrawCommand {
    DrawCommand {
        center: p.position,
        radius: p.radius,
        color: p.color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle_at(x: f32, y: f32, dx: f32, dy: f32, radius: f32) -> Particle {
        Particle::new(
            Vec2::new(x, y),
            Vec2::new(dx, dy),
            radius,
            radius + 1.0,
            Color::WHITE,
        )
    }

    #[test]
    fn interior_particle_moves_without_reflection() {
        let surface = DrawSurface::new(20, 20);
        let p = step(particle_at(10.0, 10.0, -1.0, -1.0, 1.0), surface, None, HoverRule::default());
        assert_eq!(p.position, Vec2::new(9.0, 9.0));
        assert_eq!(p.velocity, Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn corner_hit_flips_both_components() {
        let surface = DrawSurface::new(20, 20);
        let p = step(particle_at(1.5, 1.5, -1.0, -1.0, 1.0), surface, None, HoverRule::default());
        assert_eq!(p.velocity, Vec2::new(1.0, 1.0));
        assert_eq!(p.position, Vec2::new(2.5, 2.5));
    }

    #[test]
    fn far_edge_hit_flips_only_that_axis() {
        let surface = DrawSurface::new(20, 20);
        let p = step(particle_at(18.5, 10.0, 1.0, 0.5, 1.0), surface, None, HoverRule::default());
        assert_eq!(p.velocity, Vec2::new(-1.0, 0.5));
        assert_eq!(p.position, Vec2::new(17.5, 10.5));
    }

    #[test]
    fn stranded_particle_drifts_back_inside() {
        // Surface shrank under the particle; it keeps heading home.
        let surface = DrawSurface::new(20, 20);
        let mut p = particle_at(30.0, 10.0, -1.0, 0.0, 1.0);
        for _ in 0..3 {
            p = step(p, surface, None, HoverRule::default());
        }
        assert_eq!(p.velocity.x, -1.0);
        assert_eq!(p.position.x, 27.0);
    }

    #[test]
    fn pointer_on_particle_grows_once_then_caps() {
        let surface = DrawSurface::new(100, 100);
        let mut p = Particle::new(Vec2::new(50.0, 50.0), Vec2::ZERO, 0.5, 1.5, Color::WHITE);
        let pointer = Some(Vec2::new(50.0, 50.0));

        p = step(p, surface, pointer, HoverRule::default());
        assert_eq!(p.radius, 1.5);
        p = step(p, surface, pointer, HoverRule::default());
        assert_eq!(p.radius, 1.5);

        p = step(p, surface, None, HoverRule::default());
        assert_eq!(p.radius, 0.5);
        p = step(p, surface, None, HoverRule::default());
        assert_eq!(p.radius, 0.5);
    }

    #[test]
    fn neighborhood_is_square_and_strict() {
        let rule = HoverRule::default();
        let origin = Vec2::ZERO;
        // Corner of the square is outside a circle of the same reach but inside the square.
        assert!(rule.contains(Vec2::new(49.0, 49.0), origin));
        assert!(!rule.contains(Vec2::new(50.0, 0.0), origin));
        assert!(!rule.contains(Vec2::new(0.0, -50.0), origin));
    }

    #[test]
    fn draw_mirrors_particle_state() {
        let p = particle_at(3.0, 4.0, 0.0, 0.0, 0.5);
        let cmd = draw(&p);
        assert_eq!(cmd.center, Vec2::new(3.0, 4.0));
        assert_eq!(cmd.radius, 0.5);
        assert_eq!(cmd.color, Color::WHITE);
    }
}
