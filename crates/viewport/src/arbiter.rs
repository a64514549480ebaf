use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use showcase_input::{InputEvent, InputKind};

/// The auto-rotate flag and the time of the latest user interaction.
///
/// Lives in the viewport's camera rig; only the arbiter writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoRotate {
    enabled: bool,
    last_interaction: Option<Instant>,
}

impl Default for AutoRotate {
    fn default() -> Self {
        Self {
            enabled: true,
            last_interaction: None,
        }
    }
}

impl AutoRotate {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn last_interaction(&self) -> Option<Instant> {
        self.last_interaction
    }

    fn set(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Timestamps never move backwards, even for out-of-order events.
    fn record(&mut self, now: Instant) {
        self.last_interaction = Some(match self.last_interaction {
            Some(prev) => prev.max(now),
            None => now,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArbiterState {
    /// Model auto-rotates.
    Idle,
    /// User is dragging or zooming.
    Interacting,
    /// Released; waiting out the cooldown window.
    Cooldown,
}

/// What happens to auto-rotation while the user is in control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationPolicy {
    /// Keep rotating during interaction, the behavior of the product page.
    #[default]
    Parity,
    /// Stop rotating on interaction and resume once the cooldown elapses.
    SuspendWhileInteracting,
}

/// Decides whether the model rotates by itself or follows the user.
///
/// Interaction starts (pointer-down, touch-start, wheel) enter
/// `Interacting`; a release enters `Cooldown` with a deadline
/// `release + cooldown`, polled by [`InteractionArbiter::tick`]. A wheel
/// notch with nothing held is a momentary interaction: it arms the same
/// deadline and returns straight to `Idle` when it passes.
#[derive(Debug, Clone)]
pub struct InteractionArbiter {
    state: ArbiterState,
    policy: RotationPolicy,
    cooldown: Duration,
    held: bool,
    deadline: Option<Instant>,
}

impl InteractionArbiter {
    pub fn new(policy: RotationPolicy, cooldown: Duration) -> Self {
        Self {
            state: ArbiterState::Idle,
            policy,
            cooldown,
            held: false,
            deadline: None,
        }
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    pub fn is_interacting(&self) -> bool {
        self.state == ArbiterState::Interacting
    }

    /// Pending cooldown deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Feed one input event. Returns the new state when it changed.
    pub fn observe(&mut self, event: &InputEvent, rotation: &mut AutoRotate) -> Option<ArbiterState> {
        let before = self.state;
        let now = event.at;
        match event.kind {
            InputKind::PointerDown | InputKind::TouchStart => {
                self.held = true;
                self.deadline = None;
                self.begin(now, rotation);
            }
            InputKind::Wheel(_) => {
                self.begin(now, rotation);
                if !self.held {
                    self.deadline = Some(now + self.cooldown);
                }
            }
            InputKind::PointerUp | InputKind::TouchEnd => {
                if self.state == ArbiterState::Idle && !self.held {
                    return None;
                }
                self.held = false;
                self.state = ArbiterState::Cooldown;
                self.deadline = Some(now + self.cooldown);
            }
            InputKind::PointerMove(_) | InputKind::Drag(_) => {}
        }
        self.transitioned(before)
    }

    /// Resolve an elapsed cooldown. Returns the new state when it changed.
    pub fn tick(&mut self, now: Instant, rotation: &mut AutoRotate) -> Option<ArbiterState> {
        let before = self.state;
        let Some(deadline) = self.deadline else {
            return None;
        };
        if self.held || now < deadline {
            return None;
        }
        let quiet_for = rotation
            .last_interaction()
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(Duration::MAX);
        if quiet_for >= self.cooldown {
            self.deadline = None;
            self.state = ArbiterState::Idle;
            rotation.set(true);
        }
        self.transitioned(before)
    }

    fn begin(&mut self, now: Instant, rotation: &mut AutoRotate) {
        self.state = ArbiterState::Interacting;
        rotation.record(now);
        match self.policy {
            RotationPolicy::Parity => rotation.set(true),
            RotationPolicy::SuspendWhileInteracting => rotation.set(false),
        }
    }

    fn transitioned(&self, before: ArbiterState) -> Option<ArbiterState> {
        if self.state == before {
            return None;
        }
        tracing::debug!(from = ?before, to = ?self.state, "arbiter transition");
        Some(self.state)
    }
}

impl Default for InteractionArbiter {
    fn default() -> Self {
        Self::new(RotationPolicy::default(), Duration::from_millis(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn ev(kind: InputKind, at: Instant) -> InputEvent {
        InputEvent::new(kind, at)
    }

    #[test]
    fn starts_idle_and_rotating() {
        let arb = InteractionArbiter::default();
        assert_eq!(arb.state(), ArbiterState::Idle);
        assert_eq!(arb.policy(), RotationPolicy::Parity);
        assert!(AutoRotate::default().enabled());
    }

    #[test]
    fn press_release_cooldown_idle() {
        let t0 = Instant::now();
        let mut arb = InteractionArbiter::default();
        let mut rot = AutoRotate::default();

        assert_eq!(
            arb.observe(&ev(InputKind::PointerDown, t0), &mut rot),
            Some(ArbiterState::Interacting)
        );
        assert_eq!(rot.last_interaction(), Some(t0));
        assert!(rot.enabled());

        let up = t0 + 100 * MS;
        assert_eq!(
            arb.observe(&ev(InputKind::PointerUp, up), &mut rot),
            Some(ArbiterState::Cooldown)
        );
        assert_eq!(arb.tick(up + 29 * MS, &mut rot), None);
        assert_eq!(arb.state(), ArbiterState::Cooldown);
        assert_eq!(arb.tick(up + 30 * MS, &mut rot), Some(ArbiterState::Idle));
        assert!(rot.enabled());
        assert!(arb.deadline().is_none());
    }

    #[test]
    fn cooldown_never_fires_early() {
        let t0 = Instant::now();
        let mut arb = InteractionArbiter::default();
        let mut rot = AutoRotate::default();
        arb.observe(&ev(InputKind::TouchStart, t0), &mut rot);
        arb.observe(&ev(InputKind::TouchEnd, t0 + MS), &mut rot);
        for i in 0..30 {
            assert_eq!(arb.tick(t0 + MS + i * MS, &mut rot), None);
        }
        assert_eq!(arb.tick(t0 + 31 * MS, &mut rot), Some(ArbiterState::Idle));
    }

    #[test]
    fn start_during_cooldown_cancels_deadline() {
        let t0 = Instant::now();
        let mut arb = InteractionArbiter::default();
        let mut rot = AutoRotate::default();
        arb.observe(&ev(InputKind::PointerDown, t0), &mut rot);
        arb.observe(&ev(InputKind::PointerUp, t0 + MS), &mut rot);
        arb.observe(&ev(InputKind::PointerDown, t0 + 10 * MS), &mut rot);
        assert!(arb.deadline().is_none());
        assert_eq!(arb.tick(t0 + 500 * MS, &mut rot), None);
        assert!(arb.is_interacting());
    }

    #[test]
    fn timestamp_is_monotonic() {
        let t0 = Instant::now();
        let mut arb = InteractionArbiter::default();
        let mut rot = AutoRotate::default();
        arb.observe(&ev(InputKind::PointerDown, t0 + 50 * MS), &mut rot);
        arb.observe(&ev(InputKind::Wheel(1.0), t0 + 10 * MS), &mut rot);
        assert_eq!(rot.last_interaction(), Some(t0 + 50 * MS));
        arb.observe(&ev(InputKind::TouchStart, t0 + 60 * MS), &mut rot);
        assert_eq!(rot.last_interaction(), Some(t0 + 60 * MS));
    }

    #[test]
    fn wheel_alone_returns_to_idle() {
        let t0 = Instant::now();
        let mut arb = InteractionArbiter::default();
        let mut rot = AutoRotate::default();
        assert_eq!(
            arb.observe(&ev(InputKind::Wheel(-1.0), t0), &mut rot),
            Some(ArbiterState::Interacting)
        );
        assert_eq!(arb.tick(t0 + 10 * MS, &mut rot), None);
        assert_eq!(arb.tick(t0 + 30 * MS, &mut rot), Some(ArbiterState::Idle));
    }

    #[test]
    fn wheel_while_held_waits_for_release() {
        let t0 = Instant::now();
        let mut arb = InteractionArbiter::default();
        let mut rot = AutoRotate::default();
        arb.observe(&ev(InputKind::PointerDown, t0), &mut rot);
        arb.observe(&ev(InputKind::Wheel(1.0), t0 + MS), &mut rot);
        assert_eq!(arb.tick(t0 + 200 * MS, &mut rot), None);
        assert!(arb.is_interacting());
    }

    #[test]
    fn stray_release_while_idle_is_ignored() {
        let mut arb = InteractionArbiter::default();
        let mut rot = AutoRotate::default();
        assert_eq!(arb.observe(&InputEvent::now(InputKind::PointerUp), &mut rot), None);
        assert_eq!(arb.state(), ArbiterState::Idle);
        assert!(rot.last_interaction().is_none());
    }

    #[test]
    fn moves_do_not_change_state() {
        let mut arb = InteractionArbiter::default();
        let mut rot = AutoRotate::default();
        let kind = InputKind::PointerMove(glam::Vec2::new(3.0, 4.0));
        assert_eq!(arb.observe(&InputEvent::now(kind), &mut rot), None);
        assert!(rot.last_interaction().is_none());
    }

    #[test]
    fn parity_never_clears_rotation() {
        let t0 = Instant::now();
        let mut arb = InteractionArbiter::new(RotationPolicy::Parity, 30 * MS);
        let mut rot = AutoRotate::default();
        for (i, kind) in [InputKind::PointerDown, InputKind::Wheel(1.0), InputKind::PointerUp]
            .into_iter()
            .enumerate()
        {
            arb.observe(&ev(kind, t0 + i as u32 * MS), &mut rot);
            assert!(rot.enabled());
        }
    }

    #[test]
    fn suspend_policy_pauses_until_cooldown() {
        let t0 = Instant::now();
        let mut arb = InteractionArbiter::new(RotationPolicy::SuspendWhileInteracting, 30 * MS);
        let mut rot = AutoRotate::default();
        arb.observe(&ev(InputKind::PointerDown, t0), &mut rot);
        assert!(!rot.enabled());
        arb.observe(&ev(InputKind::PointerUp, t0 + 5 * MS), &mut rot);
        assert!(!rot.enabled());
        arb.tick(t0 + 35 * MS, &mut rot);
        assert!(rot.enabled());
        assert_eq!(arb.state(), ArbiterState::Idle);
    }
}
