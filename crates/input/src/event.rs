use glam::Vec2;
use std::time::Instant;

/// What happened. Hosts (desktop window, tests) translate their native
/// events into these; the canvas subsystem never sees raw window events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind {
    /// Pointer moved to a host-space position.
    PointerMove(Vec2),
    /// Pointer moved by a delta while a button or touch is held.
    Drag(Vec2),
    PointerDown,
    PointerUp,
    TouchStart,
    TouchEnd,
    /// Wheel notches; positive scrolls away from the user (zoom in).
    Wheel(f32),
}

/// Coarse grouping used for subscription routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    /// Hover tracking: pointer moves.
    Hover,
    /// Starts, ends and drags of a user interaction.
    Interaction,
    Wheel,
}

impl InputKind {
    pub fn class(&self) -> EventClass {
        match self {
            InputKind::PointerMove(_) => EventClass::Hover,
            InputKind::Wheel(_) => EventClass::Wheel,
            InputKind::Drag(_)
            | InputKind::PointerDown
            | InputKind::PointerUp
            | InputKind::TouchStart
            | InputKind::TouchEnd => EventClass::Interaction,
        }
    }

    /// Pointer-down, touch-start and wheel begin (or renew) an interaction.
    pub fn starts_interaction(&self) -> bool {
        matches!(
            self,
            InputKind::PointerDown | InputKind::TouchStart | InputKind::Wheel(_)
        )
    }

    /// Pointer-up and touch-end release an interaction.
    pub fn ends_interaction(&self) -> bool {
        matches!(self, InputKind::PointerUp | InputKind::TouchEnd)
    }
}

/// A discrete, timestamped input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub kind: InputKind,
    pub at: Instant,
}

impl InputEvent {
    pub fn new(kind: InputKind, at: Instant) -> Self {
        Self { kind, at }
    }

    /// Event stamped with the current time.
    pub fn now(kind: InputKind) -> Self {
        Self::new(kind, Instant::now())
    }
}
