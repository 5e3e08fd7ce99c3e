//! Change notification for view state.
//!
//! A [`PropertyNotifier`] keeps a list of listeners and calls every one of them when a
//! property is published. Owners publish explicitly, and only when a value really changed.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

type Listener<P> = Arc<dyn Fn(P) + Send + Sync>;

/// Handle returned by [`PropertyNotifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

pub struct PropertyNotifier<P> {
    listeners: Mutex<Vec<(Subscription, Listener<P>)>>,
    next_id: AtomicU64,
}

impl<P> Default for PropertyNotifier<P> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(vec![]),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<P: Copy> PropertyNotifier<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(P) + Send + Sync + 'static) -> Subscription {
        let subscription = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((subscription, Arc::new(listener)));
        subscription
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription);
        listeners.len() != before
    }

    /// Call every listener with `property`, in subscription order.
    pub fn publish(&self, property: P) {
        // Listeners may subscribe or unsubscribe, so don't hold the lock while calling them
        let listeners: Vec<Listener<P>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(property);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_hear_until_unsubscribed() {
        let notifier = PropertyNotifier::<u8>::new();
        let heard = Arc::new(Mutex::new(vec![]));
        let sink = heard.clone();
        let first = notifier.subscribe(move |p| sink.lock().unwrap().push(("first", p)));
        let sink = heard.clone();
        notifier.subscribe(move |p| sink.lock().unwrap().push(("second", p)));

        notifier.publish(1);
        assert!(notifier.unsubscribe(first));
        assert!(!notifier.unsubscribe(first));
        notifier.publish(2);

        assert_eq!(
            *heard.lock().unwrap(),
            vec![("first", 1), ("second", 1), ("second", 2)]
        );
    }
}
