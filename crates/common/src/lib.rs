//! Shared types for the showcase canvas subsystem.
//!
//! # Invariants
//! - A `DrawSurface` is owned by exactly one layer (particle canvas or 3D canvas).
//! - Colors are immutable once parsed.

mod color;
mod types;

pub use color::{Color, ColorError, Palette, DEFAULT_PALETTE_HEX};
pub use types::{DrawSurface, Transform};
