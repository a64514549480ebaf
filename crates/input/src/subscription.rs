use std::collections::BTreeMap;

use crate::event::{EventClass, InputEvent};

/// The canvas layer a listener belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Full-window particle background.
    Particles,
    /// 3D model viewport.
    Viewport,
}

/// Handle returned by [`InputSubscriptions::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone)]
struct Subscription {
    layer: Layer,
    class: EventClass,
}

/// Listener registry owned by one mounted stage.
///
/// Every subscription is held by handle so teardown can release all of
/// them at once. BTreeMap keeps routing order deterministic.
#[derive(Debug, Default)]
pub struct InputSubscriptions {
    subs: BTreeMap<SubscriptionId, Subscription>,
    next_id: u64,
}

impl InputSubscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, layer: Layer, class: EventClass) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subs.insert(id, Subscription { layer, class });
        tracing::debug!(?id, ?layer, ?class, "input subscription added");
        id
    }

    /// Release one subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let removed = self.subs.remove(&id).is_some();
        if removed {
            tracing::debug!(?id, "input subscription released");
        }
        removed
    }

    /// Release every subscription.
    pub fn clear(&mut self) {
        if !self.subs.is_empty() {
            tracing::debug!(count = self.subs.len(), "releasing all input subscriptions");
        }
        self.subs.clear();
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Whether `layer` currently listens for the class of `event`.
    pub fn accepts(&self, layer: Layer, event: &InputEvent) -> bool {
        let class = event.kind.class();
        self.subs
            .values()
            .any(|s| s.layer == layer && s.class == class)
    }

    /// Layers that should receive `event`, deduplicated, in layer order.
    pub fn route(&self, event: &InputEvent) -> Vec<Layer> {
        let class = event.kind.class();
        let mut layers: Vec<Layer> = self
            .subs
            .values()
            .filter(|s| s.class == class)
            .map(|s| s.layer)
            .collect();
        layers.sort();
        layers.dedup();
        layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InputKind;
    use glam::Vec2;

    #[test]
    fn routes_by_class() {
        let mut subs = InputSubscriptions::new();
        subs.subscribe(Layer::Particles, EventClass::Hover);
        subs.subscribe(Layer::Viewport, EventClass::Interaction);
        subs.subscribe(Layer::Viewport, EventClass::Wheel);

        let hover = InputEvent::now(InputKind::PointerMove(Vec2::ONE));
        let down = InputEvent::now(InputKind::PointerDown);
        assert_eq!(subs.route(&hover), vec![Layer::Particles]);
        assert_eq!(subs.route(&down), vec![Layer::Viewport]);
        assert!(subs.accepts(Layer::Viewport, &InputEvent::now(InputKind::Wheel(1.0))));
        assert!(!subs.accepts(Layer::Particles, &down));
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let mut subs = InputSubscriptions::new();
        let id = subs.subscribe(Layer::Particles, EventClass::Hover);
        assert!(subs.unsubscribe(id));
        assert!(!subs.unsubscribe(id));
        assert!(subs.is_empty());
    }

    #[test]
    fn cleared_registry_routes_nothing() {
        let mut subs = InputSubscriptions::new();
        subs.subscribe(Layer::Particles, EventClass::Hover);
        subs.subscribe(Layer::Viewport, EventClass::Interaction);
        subs.clear();
        let hover = InputEvent::now(InputKind::PointerMove(Vec2::ZERO));
        assert!(subs.route(&hover).is_empty());
        assert_eq!(subs.len(), 0);
    }
}
