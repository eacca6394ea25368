//! Observable sign-in state.
//!
//! [`SessionState`] caches "is a credential stored" and fans every change out
//! to subscribers. Each subscriber gets its own unbounded channel, so no
//! transition is ever coalesced away: a subscriber sees the value current at
//! subscription time, then every later change in the order it happened.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use std::sync::Mutex;
use tracing::debug;

/// Stream of sign-in state values returned by
/// [`AuthManager::is_signed_in_stream`](crate::AuthManager::is_signed_in_stream).
///
/// Ends only when the owning [`SessionState`] is dropped.
pub type SessionStream = UnboundedReceiver<bool>;

struct Inner {
    value: bool,
    subscribers: Vec<UnboundedSender<bool>>,
}

/// Current value plus change notifications.
pub struct SessionState {
    inner: Mutex<Inner>,
}

impl SessionState {
    pub fn new(initial: bool) -> Self {
        Self {
            inner: Mutex::new(Inner {
                value: initial,
                subscribers: Vec::new(),
            }),
        }
    }

    // A panic while holding the lock cannot leave `Inner` half-updated, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self) -> bool {
        self.lock().value
    }

    /// Store `value` and notify subscribers if it differs from the current one.
    ///
    /// Returns whether a transition happened. Subscribers whose receiver was
    /// dropped are pruned here.
    pub fn set(&self, value: bool) -> bool {
        let mut inner = self.lock();
        if inner.value == value {
            return false;
        }

        inner.value = value;
        inner
            .subscribers
            .retain(|subscriber| subscriber.unbounded_send(value).is_ok());
        debug!(
            signed_in = value,
            subscribers = inner.subscribers.len(),
            "Session state changed"
        );
        true
    }

    /// Subscribe to the state. The current value is delivered first.
    pub fn subscribe(&self) -> SessionStream {
        let (tx, rx) = mpsc::unbounded();
        let mut inner = self.lock();

        inner.subscribers.retain(|subscriber| !subscriber.is_closed());
        // Cannot fail: `rx` is still in hand.
        let _ = tx.unbounded_send(inner.value);
        inner.subscribers.push(tx);
        rx
    }

    /// Number of live subscriptions as of the last prune.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(false)
    }
}
