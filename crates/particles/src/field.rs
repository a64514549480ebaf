use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use showcase_common::{DrawSurface, Palette};

use crate::particle::{draw, step, DrawCommand, HoverRule, Particle};

/// Particle field configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of particles created at initialization.
    pub count: usize,
    /// Rest radius of every particle.
    pub base_radius: f32,
    /// Radius reached while hovered.
    pub max_radius: f32,
    /// Half-width of the square pointer neighborhood.
    pub interaction_radius: f32,
    /// Radius change per tick.
    pub growth_step: f32,
    /// Velocity scale for the randomized initial velocity.
    pub speed: f32,
    pub palette: Palette,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 800,
            base_radius: 0.5,
            max_radius: 1.5,
            interaction_radius: 50.0,
            growth_step: 1.0,
            speed: 1.5,
            palette: Palette::default(),
        }
    }
}

impl FieldConfig {
    pub fn hover_rule(&self) -> HoverRule {
        HoverRule {
            reach: self.interaction_radius,
            step: self.growth_step,
        }
    }
}

/// Owns every particle on a surface and steps them once per frame.
pub struct ParticleField {
    particles: Vec<Particle>,
    config: FieldConfig,
    rng: StdRng,
    ticks: u64,
}

impl ParticleField {
    /// Create a field seeded from OS entropy.
    pub fn new(surface: DrawSurface, config: FieldConfig) -> Self {
        Self::with_rng(surface, config, StdRng::from_entropy())
    }

    /// Create a reproducible field.
    pub fn seeded(surface: DrawSurface, config: FieldConfig, seed: u64) -> Self {
        Self::with_rng(surface, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(surface: DrawSurface, config: FieldConfig, mut rng: StdRng) -> Self {
        let particles = spawn_all(&mut rng, surface, &config);
        tracing::debug!(
            count = particles.len(),
            width = surface.width,
            height = surface.height,
            "particle field initialized"
        );
        Self {
            particles,
            config,
            rng,
            ticks: 0,
        }
    }

    /// Build a field from explicit particles. `config.count` is overwritten
    /// with the number supplied.
    pub fn from_particles(particles: Vec<Particle>, mut config: FieldConfig) -> Self {
        config.count = particles.len();
        Self {
            particles,
            config,
            rng: StdRng::seed_from_u64(0),
            ticks: 0,
        }
    }

    /// Replace every particle with a fresh random set for `surface`.
    pub fn reinitialize(&mut self, surface: DrawSurface) {
        self.particles = spawn_all(&mut self.rng, surface, &self.config);
        self.ticks = 0;
        tracing::debug!(
            count = self.particles.len(),
            width = surface.width,
            height = surface.height,
            "particle field reinitialized"
        );
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Ticks since initialization.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Step every particle once against the current surface and pointer,
    /// returning one draw instruction per particle.
    pub fn tick(&mut self, surface: DrawSurface, pointer: Option<Vec2>) -> Vec<DrawCommand> {
        let rule = self.config.hover_rule();
        self.step_all(surface, pointer, rule);
        self.ticks += 1;

        tracing::trace!(
            tick = self.ticks,
            count = self.particles.len(),
            expanded = self.particles.iter().filter(|p| p.is_expanded()).count(),
            "particle field tick"
        );

        self.draw_commands()
    }

    /// Draw instructions for the current state without stepping.
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        self.particles.iter().map(draw).collect()
    }

    fn step_all(&mut self, surface: DrawSurface, pointer: Option<Vec2>, rule: HoverRule) {
        #[cfg(feature = "parallel")]
        step_parallel(&mut self.particles, surface, pointer, rule);
        #[cfg(not(feature = "parallel"))]
        step_sequential(&mut self.particles, surface, pointer, rule);
    }
}

#[cfg_attr(all(feature = "parallel", not(test)), allow(dead_code))]
fn step_sequential(
    particles: &mut [Particle],
    surface: DrawSurface,
    pointer: Option<Vec2>,
    rule: HoverRule,
) {
    for p in particles {
        *p = step(*p, surface, pointer, rule);
    }
}

#[cfg(feature = "parallel")]
fn step_parallel(
    particles: &mut [Particle],
    surface: DrawSurface,
    pointer: Option<Vec2>,
    rule: HoverRule,
) {
    use rayon::prelude::*;
    particles
        .par_iter_mut()
        .for_each(|p| *p = step(*p, surface, pointer, rule));
}

fn spawn_all(rng: &mut StdRng, surface: DrawSurface, config: &FieldConfig) -> Vec<Particle> {
    (0..config.count)
        .map(|_| spawn(rng, surface, config))
        .collect()
}

fn spawn<R: Rng>(rng: &mut R, surface: DrawSurface, config: &FieldConfig) -> Particle {
    let radius = config.base_radius;
    let position = if surface.is_degenerate() {
        Vec2::ZERO
    } else {
        let span = (surface.extent() - Vec2::splat(radius * 2.0)).max(Vec2::ZERO);
        Vec2::new(
            rng.r#gen::<f32>() * span.x + radius,
            rng.r#gen::<f32>() * span.y + radius,
        )
    };
    let velocity = Vec2::new(
        (rng.r#gen::<f32>() - 0.5) * config.speed,
        (rng.r#gen::<f32>() - 1.0) * config.speed,
    );
    let color = config.palette.pick(rng.gen_range(0..config.palette.len()));
    Particle::new(position, velocity, radius, config.max_radius, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_common::Color;

    fn small_config(count: usize) -> FieldConfig {
        FieldConfig {
            count,
            ..FieldConfig::default()
        }
    }

    #[test]
    fn initialization_respects_bounds_and_ranges() {
        let surface = DrawSurface::new(400, 300);
        let field = ParticleField::seeded(surface, small_config(500), 7);
        assert_eq!(field.len(), 500);

        let palette = Palette::default();
        for p in field.particles() {
            assert!(p.position.x >= 0.5 && p.position.x <= 399.5);
            assert!(p.position.y >= 0.5 && p.position.y <= 299.5);
            assert!(p.velocity.x >= -0.75 && p.velocity.x < 0.75);
            assert!(p.velocity.y >= -1.5 && p.velocity.y <= 0.0);
            assert_eq!(p.radius, 0.5);
            assert_eq!(p.min_radius, 0.5);
            assert_eq!(p.max_radius, 1.5);
            assert!(palette.colors().contains(&p.color));
        }
    }

    #[test]
    fn seeded_fields_are_reproducible() {
        let surface = DrawSurface::new(200, 200);
        let a = ParticleField::seeded(surface, small_config(50), 42);
        let b = ParticleField::seeded(surface, small_config(50), 42);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn zero_area_surface_places_particles_at_origin() {
        let field = ParticleField::seeded(DrawSurface::new(0, 0), small_config(5), 1);
        assert!(field.particles().iter().all(|p| p.position == Vec2::ZERO));
    }

    #[test]
    fn zero_velocity_field_stays_put() {
        let surface = DrawSurface::new(100, 100);
        let particles: Vec<Particle> = (0..10)
            .map(|i| {
                Particle::new(
                    Vec2::new(10.0 + i as f32 * 8.0, 20.0 + i as f32 * 5.0),
                    Vec2::ZERO,
                    0.5,
                    1.5,
                    Color::WHITE,
                )
            })
            .collect();
        let before: Vec<Vec2> = particles.iter().map(|p| p.position).collect();
        let mut field = ParticleField::from_particles(particles, FieldConfig::default());

        let cmds = field.tick(surface, None);
        let after: Vec<Vec2> = field.particles().iter().map(|p| p.position).collect();
        assert_eq!(before, after);
        assert_eq!(cmds.len(), 10);
        assert_eq!(field.config().count, 10);
    }

    // Containment is checked against the rest radius: a particle that grows
    // beside a wall may overlap it until it next reflects.
    #[test]
    fn particles_stay_inside_rest_inset_and_radius_stays_clamped() {
        let surface = DrawSurface::new(120, 80);
        let mut field = ParticleField::seeded(surface, small_config(200), 3);
        let pointer = Some(Vec2::new(60.0, 40.0));

        for tick in 0..2_000 {
            let ptr = if tick % 50 < 25 { pointer } else { None };
            let before: Vec<f32> = field.particles().iter().map(|p| p.radius).collect();
            field.tick(surface, ptr);
            for (p, r0) in field.particles().iter().zip(before) {
                assert!(p.position.x >= p.min_radius && p.position.x <= 120.0 - p.min_radius);
                assert!(p.position.y >= p.min_radius && p.position.y <= 80.0 - p.min_radius);
                assert!(p.radius >= p.min_radius && p.radius <= p.max_radius);
                assert!((p.radius - r0).abs() <= 1.0);
            }
        }
        assert_eq!(field.ticks(), 2_000);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_and_sequential_steps_agree() {
        let surface = DrawSurface::new(320, 240);
        let rule = FieldConfig::default().hover_rule();
        let mut seq = ParticleField::seeded(surface, small_config(400), 19)
            .particles()
            .to_vec();
        let mut par = seq.clone();

        for tick in 0..500 {
            let pointer = (tick % 40 < 20).then(|| Vec2::new((tick % 320) as f32, 120.0));
            step_sequential(&mut seq, surface, pointer, rule);
            step_parallel(&mut par, surface, pointer, rule);
        }
        assert_eq!(seq, par);
    }

    #[test]
    fn sequential_step_matches_tick() {
        let surface = DrawSurface::new(200, 150);
        let mut field = ParticleField::seeded(surface, small_config(60), 5);
        let mut manual = field.particles().to_vec();
        let rule = field.config().hover_rule();
        let pointer = Some(Vec2::new(100.0, 75.0));
        for _ in 0..100 {
            field.tick(surface, pointer);
            step_sequential(&mut manual, surface, pointer, rule);
        }
        assert_eq!(field.particles(), manual.as_slice());
    }

    #[test]
    fn radius_grows_only_inside_neighborhood() {
        let surface = DrawSurface::new(500, 500);
        let mut field = ParticleField::seeded(surface, small_config(300), 11);
        let pointer = Vec2::new(250.0, 250.0);
        let rule = field.config().hover_rule();

        let before = field.particles().to_vec();
        field.tick(surface, Some(pointer));
        for (old, new) in before.iter().zip(field.particles()) {
            if rule.contains(pointer, new.position) {
                assert!(new.radius >= old.radius);
            } else {
                assert!(new.radius <= old.radius);
            }
        }
    }

    #[test]
    fn reinitialize_replaces_particles_for_new_surface() {
        let mut field = ParticleField::seeded(DrawSurface::new(1000, 1000), small_config(100), 5);
        let small = DrawSurface::new(10, 10);
        field.reinitialize(small);
        assert_eq!(field.len(), 100);
        assert_eq!(field.ticks(), 0);
        assert!(field
            .particles()
            .iter()
            .all(|p| p.position.x <= 9.5 && p.position.y <= 9.5));
    }

    #[test]
    fn config_round_trips_through_json_with_defaults() {
        let cfg: FieldConfig = serde_json::from_str(r##"{"count": 12, "palette": ["#ffffff"]}"##).unwrap();
        assert_eq!(cfg.count, 12);
        assert_eq!(cfg.interaction_radius, 50.0);
        assert_eq!(cfg.palette.len(), 1);
    }
}
