//! Render loop: invokes registered per-frame callbacks once per host frame.
//!
//! # Invariants
//! - Single-threaded: a slow callback delays the next frame, never overlaps it.
//! - `stop` / `stop_all` are idempotent and valid before any `start`.
//! - State is passed into callbacks explicitly, never captured by shared reference.

mod driver;
mod timer;

pub use driver::{CallbackId, FrameInfo, RenderLoop};
pub use timer::FrameTimer;
