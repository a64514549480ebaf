//! Asset import: binary glTF containers flattened into a single mesh.
//!
//! The viewport only needs geometry it can draw and the bounding box used
//! to frame it, so the whole default scene is baked into one `MeshData` in
//! the model's own coordinate frame.
//!
//! # Layout
//! - `glb`: container framing (header + JSON chunk + BIN chunk).
//! - `document`: the subset of the glTF JSON schema that is read.
//! - `mesh`: accessor decoding and scene flattening.
//! - `bounds`: axis-aligned boxes and canonical framing.
//! - `builder`: writes small box-mesh GLB files.

mod bounds;
mod builder;
mod document;
mod error;
mod glb;
mod loader;
mod mesh;

pub use bounds::{frame_transform, Aabb};
pub use builder::GlbBuilder;
pub use error::AssetError;
pub use glb::{encode_glb, GlbContainer};
pub use loader::{load_model, read_with_progress, Model};
pub use mesh::MeshData;

pub fn crate_info() -> &'static str {
    "showcase-assets v0.1.0"
}
