//! Rendering Adapter: renderer-agnostic interface.
//!
//! A [`Frame`] describes one composited frame: the particle layer covering
//! the whole window and, optionally, the 3D layer inside its container
//! rectangle. Backends implement [`Renderer`]; the debug text renderer
//! serves the CLI and tests, the wgpu backend the desktop host.
//!
//! # Invariants
//! - Renderers never mutate simulation or viewport state.
//! - The particle layer is drawn first; the 3D layer composites over it.

mod frame;
mod renderer;

pub use frame::{Frame, Rect};
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "showcase-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
