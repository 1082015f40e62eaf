//! Push-based change notification primitives.
//!
//! [`Listeners`] is a plain fan-out list, [`ViewCell`] adds a last-value slot
//! with distinct-until-changed publishing, and [`Subscription`] is the
//! receiving end handed to observers.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::util::lock;

/// Receiving side of a subscription.
///
/// Yields values in publish order. Dropping it unsubscribes on the next
/// publish.
#[derive(Debug)]
pub struct Subscription<T> {
    receiver: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    /// Wait for the next value; `None` once the source is gone.
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Take the next value if one is already queued.
    pub fn try_next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Drain everything queued and return only the newest value.
    pub fn latest(&mut self) -> Option<T> {
        let mut latest = None;
        while let Ok(value) = self.receiver.try_recv() {
            latest = Some(value);
        }
        latest
    }
}

/// Fan-out list of subscribers.
#[derive(Debug)]
pub struct Listeners<T> {
    senders: Vec<mpsc::UnboundedSender<T>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            senders: Vec::new(),
        }
    }
}

impl<T: Clone> Listeners<T> {
    /// Register a listener, optionally replaying a value to it first.
    pub fn subscribe(&mut self, replay: Option<T>) -> Subscription<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        if let Some(value) = replay {
            let _ = sender.send(value);
        }
        self.senders.push(sender);
        Subscription { receiver }
    }

    /// Deliver a value to every live listener, pruning closed ones.
    pub fn publish(&mut self, value: &T) {
        self.senders.retain(|sender| sender.send(value.clone()).is_ok());
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

/// A derived value at the UI boundary.
///
/// Setting an equal value is a no-op, so consecutive identical values never
/// reach subscribers.
#[derive(Debug)]
pub struct ViewCell<T> {
    inner: Arc<Mutex<CellState<T>>>,
}

#[derive(Debug)]
struct CellState<T> {
    value: T,
    listeners: Listeners<T>,
}

impl<T> Clone for ViewCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq> ViewCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CellState {
                value: initial,
                listeners: Listeners::default(),
            })),
        }
    }

    pub fn get(&self) -> T {
        lock(&self.inner).value.clone()
    }

    /// Store and publish `value`; returns `false` when it equals the current one.
    pub fn set(&self, value: T) -> bool {
        let mut state = lock(&self.inner);
        if state.value == value {
            return false;
        }
        state.value = value;
        let CellState { value, listeners } = &mut *state;
        listeners.publish(value);
        true
    }

    /// Subscribe with an initial replay of the current value.
    pub fn subscribe(&self) -> Subscription<T> {
        let mut state = lock(&self.inner);
        let current = state.value.clone();
        state.listeners.subscribe(Some(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_cell_skips_identical_values() {
        let cell = ViewCell::new(false);
        let mut subscription = cell.subscribe();
        assert_eq!(subscription.try_next(), Some(false));

        assert!(!cell.set(false));
        assert!(cell.set(true));
        assert!(!cell.set(true));
        assert!(cell.set(false));

        assert_eq!(subscription.try_next(), Some(true));
        assert_eq!(subscription.try_next(), Some(false));
        assert_eq!(subscription.try_next(), None);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut listeners = Listeners::default();
        let first = listeners.subscribe(None);
        let mut second = listeners.subscribe(Some(1));
        drop(first);

        listeners.publish(&2);
        assert_eq!(listeners.len(), 1);
        assert_eq!(second.latest(), Some(2));
    }
}
