#![forbid(unsafe_code)]

//! Property bridge: pushed property snapshots as a replaying source.

use rxview_reactive::{ReplaySubject, Source};

use crate::props::PropertySnapshot;

/// Latest-value cache plus subscriber list for one component instance.
///
/// Every subscriber first receives the most recently supplied snapshot (if
/// any), then each later snapshot in order. A snapshot supplied before the
/// first subscriber exists is kept for it.
#[derive(Debug, Clone)]
pub struct PropertyBridge {
    subject: ReplaySubject<PropertySnapshot>,
}

impl Default for PropertyBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyBridge {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subject: ReplaySubject::new(1),
        }
    }

    pub fn supply(&self, snapshot: PropertySnapshot) {
        self.subject.next(snapshot);
    }

    #[must_use]
    pub fn source(&self) -> Source<PropertySnapshot> {
        self.subject.source()
    }

    #[must_use]
    pub fn latest(&self) -> Option<PropertySnapshot> {
        self.subject.latest()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subject.observer_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn labels(bridge: &PropertyBridge) -> (Rc<RefCell<Vec<String>>>, rxview_reactive::Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let sub = bridge.source().subscribe(move |snapshot: PropertySnapshot| {
            let label = snapshot
                .get("label")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            seen_clone.borrow_mut().push(label);
        });
        (seen, sub)
    }

    #[test]
    fn supply_before_subscribe_is_replayed() {
        let bridge = PropertyBridge::new();
        bridge.supply(PropertySnapshot::new().with("label", "cheese"));

        let (seen, _sub) = labels(&bridge);
        assert_eq!(*seen.borrow(), vec!["cheese"]);
    }

    #[test]
    fn later_snapshots_follow_in_order() {
        let bridge = PropertyBridge::new();
        let (seen, _sub) = labels(&bridge);
        assert!(seen.borrow().is_empty());

        bridge.supply(PropertySnapshot::new().with("label", "cheese"));
        bridge.supply(PropertySnapshot::new().with("label", "moldy cheese"));
        assert_eq!(*seen.borrow(), vec!["cheese", "moldy cheese"]);
    }

    #[test]
    fn replays_only_latest() {
        let bridge = PropertyBridge::new();
        bridge.supply(PropertySnapshot::new().with("label", "a"));
        bridge.supply(PropertySnapshot::new().with("label", "b"));

        let (seen, _sub) = labels(&bridge);
        assert_eq!(*seen.borrow(), vec!["b"]);
        assert_eq!(bridge.subscriber_count(), 1);
    }
}
