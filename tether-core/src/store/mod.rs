//! Stores
//!
//! A store holds one current value and a list of subscribers. Every change is
//! broadcast synchronously to the subscribers, in the order they subscribed.
//!
//! # Capabilities
//!
//! Code that only needs to observe a store takes a [`Readable`]; code that
//! also writes takes a [`Writable`]. [`Store`] is the built-in implementation,
//! but anything implementing the traits can be bound to a component or handed
//! to [`create_store_with`](crate::binding::create_store_with).
//!
//! # Replay on subscribe
//!
//! `subscribe` calls the new callback once, before returning, with the value
//! the store holds at that moment. There is no `get`: [`get_store_value`]
//! peeks by subscribing and immediately unsubscribing.
//!
//! # Re-entrancy
//!
//! Callbacks run with no internal lock held. A callback may subscribe,
//! unsubscribe (itself or others), or write to the store it is observing.

mod store;
mod subscriber;
mod unsubscriber;

pub use store::{Store, StoreId};
pub use subscriber::{Invalidator, Subscriber, SubscriptionId};
pub use unsubscriber::Unsubscriber;

use std::sync::Arc;

use parking_lot::Mutex;

/// Something that can be subscribed to.
pub trait Readable<T> {
    /// Identity of the underlying store. Clones share it.
    fn id(&self) -> StoreId;

    /// Register `callback`, replay the current value to it, and return the
    /// handle that removes this registration.
    ///
    /// When the subscription ends, `invalidate` (if any) is called first with
    /// the value the store holds at that moment.
    fn subscribe_with(
        &self,
        callback: Subscriber<T>,
        invalidate: Option<Invalidator<T>>,
    ) -> Unsubscriber;

    /// Subscribe with a plain closure.
    fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
        Self: Sized,
    {
        self.subscribe_with(Box::new(callback), None)
    }

    /// Subscribe with a plain closure and an invalidator.
    fn subscribe_invalidate<F, I>(&self, callback: F, invalidate: I) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
        I: FnOnce(&T) + Send + 'static,
        Self: Sized,
    {
        self.subscribe_with(Box::new(callback), Some(Box::new(invalidate)))
    }
}

/// Something that can be subscribed to and written.
pub trait Writable<T>: Readable<T> {
    /// Replace the value and notify every subscriber.
    fn set(&self, value: T);

    /// Set the value computed from the current one.
    fn update<F>(&self, updater: F)
    where
        F: FnOnce(&T) -> T,
        Self: Sized,
        T: Clone + Send + 'static,
    {
        let current = get_store_value(self);
        self.set(updater(&current));
    }
}

/// Read a store's current value without leaving a subscription behind.
///
/// # Panics
///
/// Panics if `store` does not replay its value synchronously from
/// `subscribe`, which every [`Readable`] must do.
pub fn get_store_value<T, R>(store: &R) -> T
where
    T: Clone + Send + 'static,
    R: Readable<T> + ?Sized,
{
    let captured = Arc::new(Mutex::new(None));
    let sink = captured.clone();

    store
        .subscribe_with(
            Box::new(move |value: &T| {
                *sink.lock() = Some(value.clone());
            }),
            None,
        )
        .unsubscribe();

    let value = captured.lock().take();
    match value {
        Some(value) => value,
        None => panic!("store {:?} did not replay its value on subscribe", store.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A store that forwards to `Store` but only implements the required methods.
    #[derive(Clone)]
    struct Minimal(Store<i32>);

    impl Readable<i32> for Minimal {
        fn id(&self) -> StoreId {
            self.0.id()
        }

        fn subscribe_with(
            &self,
            callback: Subscriber<i32>,
            invalidate: Option<Invalidator<i32>>,
        ) -> Unsubscriber {
            self.0.subscribe_with(callback, invalidate)
        }
    }

    impl Writable<i32> for Minimal {
        fn set(&self, value: i32) {
            Writable::set(&self.0, value);
        }
    }

    /// A store that forgets to replay.
    struct Silent;

    impl Readable<i32> for Silent {
        fn id(&self) -> StoreId {
            StoreId::new()
        }

        fn subscribe_with(&self, _: Subscriber<i32>, _: Option<Invalidator<i32>>) -> Unsubscriber {
            Unsubscriber::noop()
        }
    }

    #[test]
    fn get_store_value_peeks_without_residue() {
        let store = Store::new(7);
        let _keep = store.subscribe(|_| {});
        assert_eq!(store.subscriber_count(), 1);

        assert_eq!(get_store_value(&store), 7);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn get_store_value_works_through_trait_objects() {
        let store = Store::new(String::from("hi"));
        let readable: &dyn Readable<String> = &store;
        assert_eq!(get_store_value(readable), "hi");
    }

    #[test]
    fn default_update_goes_through_set() {
        let store = Minimal(Store::new(5));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _sub = store.subscribe(move |v| seen_clone.lock().push(*v));

        store.update(|v| v + 1);

        assert_eq!(get_store_value(&store), 6);
        assert_eq!(*seen.lock(), vec![5, 6]);
    }

    #[test]
    fn subscribe_invalidate_passes_invalidator() {
        let store = Store::new(1);
        let invalidated = Arc::new(AtomicUsize::new(0));
        let invalidated_clone = invalidated.clone();

        let sub = store.subscribe_invalidate(
            |_| {},
            move |v| {
                invalidated_clone.store(*v as usize, Ordering::SeqCst);
            },
        );
        store.set(9);
        sub.unsubscribe();

        assert_eq!(invalidated.load(Ordering::SeqCst), 9);
    }

    #[test]
    #[should_panic(expected = "did not replay")]
    fn get_store_value_rejects_silent_store() {
        let _ = get_store_value::<i32, _>(&Silent);
    }
}
