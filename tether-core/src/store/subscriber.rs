//! Subscriber types for stores.
//!
//! A subscription is one registration of a callback on a store. The same
//! closure registered twice is two subscriptions, each with its own id and
//! each removed only by its own [`Unsubscriber`](super::Unsubscriber).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback informed of every value a store takes.
pub type Subscriber<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Teardown callback, given the store's value when its subscription ends.
pub type Invalidator<T> = Box<dyn FnOnce(&T) + Send>;

/// Shared form of a [`Subscriber`], as held by the store.
///
/// Kept behind an `Arc` so a broadcast can snapshot the listener list and
/// release the lock before any callback runs.
pub(crate) type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Unique identifier for a single subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Generate a new unique subscription ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}
