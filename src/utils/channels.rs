//! Observable values for inter-component communication
//!
//! A [`Broadcast`] holds the latest value of a stream (history snapshots,
//! provider state, voice state, audio level) and fans every new value out to
//! all subscribers over crossbeam channels.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};

/// Publish/subscribe channel with a current-value cache
pub struct Broadcast<T: Clone> {
    /// Latest published value
    current: RwLock<T>,

    /// Live subscriber endpoints
    subscribers: Mutex<Vec<Sender<T>>>,
}

impl<T: Clone> Broadcast<T> {
    /// Create a broadcast seeded with an initial value
    pub fn new(initial: T) -> Self {
        Self {
            current: RwLock::new(initial),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Get a copy of the latest value
    pub fn get(&self) -> T {
        self.current.read().clone()
    }

    /// Replace the current value and notify every subscriber
    pub fn publish(&self, value: T) {
        // Subscribers lock is held while storing so fan-out order matches store order
        let mut subscribers = self.subscribers.lock();
        *self.current.write() = value.clone();
        subscribers.retain(|tx| tx.send(value.clone()).is_ok());
    }

    /// Mutate the current value in place, then publish the result
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut subscribers = self.subscribers.lock();
        let value = {
            let mut current = self.current.write();
            f(&mut current);
            current.clone()
        };
        subscribers.retain(|tx| tx.send(value.clone()).is_ok());
    }

    /// Subscribe to future values
    ///
    /// The returned receiver yields the current value first.
    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = unbounded();
        let mut subscribers = self.subscribers.lock();
        // Receiver is alive, so the seed send cannot fail
        let _ = tx.send(self.current.read().clone());
        subscribers.push(tx);
        rx
    }

    /// Number of subscribers still connected as of the last publish
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<T: Clone + Default> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscribers = self.subscribers.lock().len();
        f.debug_struct("Broadcast")
            .field("current", &self.get())
            .field("subscribers", &subscribers)
            .finish()
    }
}
