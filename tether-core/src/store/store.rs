//! Store Implementation
//!
//! The built-in writable store.
//!
//! # How Stores Work
//!
//! 1. `subscribe` registers the callback under a fresh subscription id and
//!    calls it once with the current value.
//!
//! 2. `set` replaces the value, snapshots the registered callbacks, and calls
//!    each one in registration order.
//!
//! 3. The returned [`Unsubscriber`] removes that one registration, calling the
//!    invalidator first if one was supplied.
//!
//! # Locking
//!
//! The value and the subscription map each sit behind a `parking_lot::Mutex`.
//! Neither lock is held while user code runs, so callbacks, updaters and
//! invalidators may re-enter the store.
//!
//! Writes, updates and subscribe replays from different threads are
//! serialized by a `parking_lot::ReentrantMutex`, held for the whole
//! broadcast. Subscribers therefore see values in the order they were stored,
//! and a thread may still `set` from inside its own callback. A callback that
//! blocks on another thread writing to the same store deadlocks.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, ReentrantMutex};
use smallvec::SmallVec;
use tracing::trace;

use super::subscriber::{Invalidator, Listener, Subscriber, SubscriptionId};
use super::unsubscriber::Unsubscriber;
use super::{Readable, Writable};

/// Counter for generating unique store IDs.
static STORE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identity of a store.
///
/// Allocated once per [`Store::new`]; every clone of that store reports the
/// same id. Bindings use it to decide when to re-subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(u64);

impl StoreId {
    /// Generate a new unique store ID.
    pub fn new() -> Self {
        Self(STORE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for StoreId {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener snapshot taken at the start of a broadcast.
type Snapshot<T> = SmallVec<[(SubscriptionId, Listener<T>); 8]>;

struct Shared<T> {
    value: Mutex<T>,
    /// Registered callbacks in subscription order.
    subscriptions: Mutex<IndexMap<SubscriptionId, Listener<T>>>,
    /// Held across each write and its broadcast.
    serial: ReentrantMutex<()>,
}

impl<T> Shared<T> {
    fn is_registered(&self, id: SubscriptionId) -> bool {
        self.subscriptions.lock().contains_key(&id)
    }
}

/// A writable store holding a value of type `T`.
///
/// Cloning a store is cheap and yields another handle to the same value and
/// subscriber list.
///
/// # Example
///
/// ```rust
/// use tether_core::{Readable, Store, Writable};
/// use std::sync::{Arc, Mutex};
///
/// let store = Store::new(0);
/// let log = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = log.clone();
/// let _sub = store.subscribe(move |v: &i32| sink.lock().unwrap().push(*v));
/// store.set(1);
/// store.update(|v| v * 10);
///
/// assert_eq!(*log.lock().unwrap(), vec![0, 1, 10]);
/// ```
pub struct Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    id: StoreId,
    shared: Arc<Shared<T>>,
}

impl<T> Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new store with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            id: StoreId::new(),
            shared: Arc::new(Shared {
                value: Mutex::new(value),
                subscriptions: Mutex::new(IndexMap::new()),
                serial: ReentrantMutex::new(()),
            }),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscriptions.lock().len()
    }

    fn snapshot(&self) -> Snapshot<T> {
        self.shared
            .subscriptions
            .lock()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect()
    }
}

impl<T> Readable<T> for Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn id(&self) -> StoreId {
        self.id
    }

    fn subscribe_with(
        &self,
        callback: Subscriber<T>,
        invalidate: Option<Invalidator<T>>,
    ) -> Unsubscriber {
        let subscription = SubscriptionId::new();
        let listener: Listener<T> = Arc::from(callback);
        let serial = self.shared.serial.lock();

        let subscribers = {
            let mut subscriptions = self.shared.subscriptions.lock();
            subscriptions.insert(subscription, Arc::clone(&listener));
            subscriptions.len()
        };
        trace!(
            store = self.id.raw(),
            subscription = subscription.raw(),
            subscribers,
            "subscribe"
        );

        let current = self.shared.value.lock().clone();
        listener(&current);
        drop(serial);

        let store = self.id;
        let shared = Arc::downgrade(&self.shared);
        Unsubscriber::new(move || {
            // A store that no longer exists has nothing left to remove.
            let Some(shared) = shared.upgrade() else {
                return;
            };
            if let Some(invalidate) = invalidate {
                let current = shared.value.lock().clone();
                invalidate(&current);
            }
            let subscribers = {
                let mut subscriptions = shared.subscriptions.lock();
                subscriptions.shift_remove(&subscription);
                subscriptions.len()
            };
            trace!(
                store = store.raw(),
                subscription = subscription.raw(),
                subscribers,
                "unsubscribe"
            );
        })
    }
}

impl<T> Writable<T> for Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn set(&self, value: T) {
        let _serial = self.shared.serial.lock();
        let current = {
            let mut guard = self.shared.value.lock();
            *guard = value;
            guard.clone()
        };

        let snapshot = self.snapshot();
        trace!(store = self.id.raw(), subscribers = snapshot.len(), "set");

        for (subscription, listener) in snapshot {
            // Skip registrations removed earlier in this broadcast.
            if self.shared.is_registered(subscription) {
                listener(&current);
            }
        }
    }

    fn update<F>(&self, updater: F)
    where
        F: FnOnce(&T) -> T,
        Self: Sized,
        T: Clone + Send + 'static,
    {
        let _serial = self.shared.serial.lock();
        let current = self.shared.value.lock().clone();
        self.set(updater(&current));
    }
}

impl<T> Clone for Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for Store<T>
where
    T: Clone + Send + Sync + Default + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Debug for Store<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.id)
            .field("value", &*self.shared.value.lock())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
