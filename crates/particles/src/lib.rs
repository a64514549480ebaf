//! Particle field: a fixed set of small circles drifting inside a surface.
//!
//! # Invariants
//! - `min_radius <= radius <= max_radius` for every particle after every tick.
//! - Particles never spawn, die, or change color after initialization.
//! - Particles do not interact; update order does not affect the result.

mod field;
mod particle;
mod pointer;

pub use field::{FieldConfig, ParticleField};
pub use particle::{draw, step, DrawCommand, HoverRule, Particle};
pub use pointer::PointerTracker;
