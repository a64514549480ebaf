//! Input: raw host events normalized into timestamped records, plus the
//! subscription registry that scopes listeners to a mounted stage.
//!
//! # Invariants
//! - Every event carries a monotonic `Instant`.
//! - A released subscription never routes another event.

pub mod event;
pub mod subscription;

pub use event::{EventClass, InputEvent, InputKind};
pub use subscription::{InputSubscriptions, Layer, SubscriptionId};
