//! The mounted canvas: particle background plus model viewport.
//!
//! A [`Stage`] owns the particle field, the pointer tracker, the viewport,
//! the interaction arbiter, the frame loop with its callbacks and the input
//! subscriptions. Hosts feed it input and resizes, call [`Stage::frame`]
//! once per display refresh and hand the returned frame to a renderer.
//!
//! # Invariants
//! - Teardown stops the loop, releases listeners and disposes the viewport
//!   in one call; it is idempotent and runs on drop.
//! - Interaction starts only count when the pointer is over the container.
//! - Particles never see a zero-sized surface after mount.

mod layout;
mod stage;

pub use layout::{hero_container, CONTAINER_HEIGHT_SHARE, CONTAINER_PADDING};
pub use stage::{Stage, StageConfig, StageState};

pub fn crate_info() -> &'static str {
    "showcase-stage v0.1.0"
}
