//! Property-change notification for view-models.
//!
//! # Invariants
//! - Every `subscribe` returns a fresh id; `unsubscribe` with that id removes
//!   exactly one listener.
//! - View-models notify only when a value actually changed.

use std::fmt::Debug;

/// Handle returned by [`PropertyNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener<P> = Box<dyn FnMut(P)>;

/// Explicit publish/subscribe list for one view-model's properties.
pub struct PropertyNotifier<P> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<P>)>,
}

impl<P: Copy> PropertyNotifier<P> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(P) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when the id was unknown or already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(candidate, _)| *candidate != id);
        self.listeners.len() != before
    }

    /// Delivers `property` to listeners in subscription order.
    pub fn notify(&mut self, property: P) {
        for (_, listener) in &mut self.listeners {
            listener(property);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<P: Copy> Default for PropertyNotifier<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Debug for PropertyNotifier<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyNotifier")
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}

/// View-model exposing observable properties.
pub trait Observable {
    type Property: Copy + Debug + PartialEq + 'static;

    fn notifier_mut(&mut self) -> &mut PropertyNotifier<Self::Property>;

    fn subscribe(&mut self, listener: impl FnMut(Self::Property) + 'static) -> SubscriptionId
    where
        Self: Sized,
    {
        self.notifier_mut().subscribe(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier_mut().unsubscribe(id)
    }
}

/// Stores `value` into `slot`; returns whether it changed.
pub(crate) fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::{replace_if_changed, PropertyNotifier};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribe_and_unsubscribe_are_paired() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = PropertyNotifier::new();
        let sink = Rc::clone(&seen);
        let first = notifier.subscribe(move |value: u8| sink.borrow_mut().push(value));
        let second = notifier.subscribe(|_| {});
        assert_ne!(first, second);

        notifier.notify(1);
        assert!(notifier.unsubscribe(first));
        assert!(!notifier.unsubscribe(first));
        notifier.notify(2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[test]
    fn replace_if_changed_reports_changes_only() {
        let mut value = String::from("a");
        assert!(!replace_if_changed(&mut value, "a".to_string()));
        assert!(replace_if_changed(&mut value, "b".to_string()));
        assert_eq!(value, "b");
    }
}
