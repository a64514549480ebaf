//! Single-model 3D viewport.
//!
//! A perspective camera orbiting the origin, a fixed four-light rig, a
//! render target with a capped pixel ratio, and at most one model loaded in
//! the background and framed into a canonical cube. The
//! [`InteractionArbiter`] decides when the model spins by itself.
//!
//! # Invariants
//! - At most one model is ever attached; a second completion is ignored.
//! - A zero-sized resize leaves camera and target untouched.
//! - Auto-rotation advances a fixed yaw per frame, independent of frame time.
//! - The recorded interaction timestamp never decreases.

mod arbiter;
mod camera;
mod lights;
mod orbit;
mod target;
mod viewport;

pub use arbiter::{ArbiterState, AutoRotate, InteractionArbiter, RotationPolicy};
pub use camera::PerspectiveCamera;
pub use lights::{AmbientLight, DirectionalLight, LightRig};
pub use orbit::{OrbitControls, OrbitSettings};
pub use target::RenderTarget;
pub use viewport::{
    AttachedModel, LoadStatus, ModelInstance, SceneFrame, Viewport3D, ViewportConfig,
};

pub fn crate_info() -> &'static str {
    "showcase-viewport v0.1.0"
}
