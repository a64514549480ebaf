//! wgpu render backend for the showcase canvas.
//!
//! Draws the particle layer as instanced anti-aliased discs in window
//! pixels, renders the model offscreen at the viewport's render-target size
//! with ambient plus three directional lights, then composites that layer
//! into its container rectangle.
//!
//! # Invariants
//! - Renderer never mutates field or viewport state.
//! - Model geometry is uploaded once per attached mesh.
//! - The 3D layer's resolution follows the capped pixel ratio, not the window.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
