//! Collision event bus
//!
//! Decouples the simulation from the page elements that react to it. The
//! simulation publishes two probes per tick; any number of mounted targets
//! subscribe, test the probe against their own geometry, and update their own
//! visual state. Publishing is synchronous and fire-and-forget: no queue, no
//! acknowledgement, and a probe with no listeners is silently dropped.
//!
//! Everything runs on one thread; listeners are added and removed between
//! ticks, never during a publish.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

/// One tick's collision broadcast. Ephemeral: consumed during `publish`,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Probe {
    /// Fine-grained point probe for glyph-level hit testing
    Point { pos: Vec2 },
    /// Coarse circle probe for box-level hit testing
    Circle { pos: Vec2, radius: f32 },
}

impl Probe {
    /// Wire name of the probe kind, matching the page-level event names
    pub fn kind(&self) -> &'static str {
        match self {
            Probe::Point { .. } => "pixel-collision",
            Probe::Circle { .. } => "box-collision",
        }
    }
}

type Listener = Box<dyn FnMut(&Probe)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Cheaply cloneable handle to the shared listener registry
#[derive(Clone, Default)]
pub struct CollisionBus {
    inner: Rc<RefCell<Registry>>,
}

impl CollisionBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Delivery stops when the returned subscription is
    /// dropped or explicitly unsubscribed.
    pub fn subscribe(&self, listener: impl FnMut(&Probe) + 'static) -> Subscription {
        let mut registry = self.inner.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Box::new(listener)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Deliver a probe to every current listener, in subscription order.
    /// O(listeners); a probe with zero listeners is dropped.
    pub fn publish(&self, probe: &Probe) {
        for (_, listener) in self.inner.borrow_mut().listeners.iter_mut() {
            listener(probe);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// Handle tying a listener's lifetime to its owner; deregisters on drop
pub struct Subscription {
    id: u64,
    registry: std::rc::Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Explicit deregistration (equivalent to dropping the handle)
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_listeners_is_noop() {
        let bus = CollisionBus::new();
        assert_eq!(bus.listener_count(), 0);
        bus.publish(&Probe::Point {
            pos: Vec2::new(1.0, 2.0),
        });
    }

    #[test]
    fn test_listener_receives_probes_in_order() {
        let bus = CollisionBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        let _sub = bus.subscribe(move |p| seen2.borrow_mut().push(*p));

        let point = Probe::Point {
            pos: Vec2::new(10.0, 20.0),
        };
        let circle = Probe::Circle {
            pos: Vec2::new(10.0, 20.0),
            radius: 8.0,
        };
        bus.publish(&point);
        bus.publish(&circle);

        assert_eq!(*seen.borrow(), vec![point, circle]);
    }

    #[test]
    fn test_unsubscribed_listener_sees_nothing() {
        let bus = CollisionBus::new();
        let count = Rc::new(RefCell::new(0u32));
        let count2 = count.clone();
        let sub = bus.subscribe(move |_| *count2.borrow_mut() += 1);

        let probe = Probe::Point { pos: Vec2::ZERO };
        bus.publish(&probe);
        sub.unsubscribe();
        // Re-publishing identical coordinates after unmount must not touch
        // the listener again.
        bus.publish(&probe);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_multiple_listeners_all_notified() {
        let bus = CollisionBus::new();
        let count = Rc::new(RefCell::new(0u32));
        let c1 = count.clone();
        let c2 = count.clone();
        let _a = bus.subscribe(move |_| *c1.borrow_mut() += 1);
        let _b = bus.subscribe(move |_| *c2.borrow_mut() += 10);

        bus.publish(&Probe::Circle {
            pos: Vec2::ZERO,
            radius: 1.0,
        });
        assert_eq!(*count.borrow(), 11);
    }

    #[test]
    fn test_probe_kind_names() {
        assert_eq!(Probe::Point { pos: Vec2::ZERO }.kind(), "pixel-collision");
        assert_eq!(
            Probe::Circle {
                pos: Vec2::ZERO,
                radius: 1.0
            }
            .kind(),
            "box-collision"
        );
    }
}
