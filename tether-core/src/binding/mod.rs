//! Store Binding
//!
//! Lets a component treat a shared store like its own local state.
//!
//! # How the Binding Works
//!
//! 1. On the first render, local state is seeded with the store's current
//!    value via [`get_store_value`], which leaves no subscription behind.
//!
//! 2. After the render commits, an effect keyed by the store's id subscribes.
//!    The subscription copies every value into local state, which schedules a
//!    re-render.
//!
//! 3. On unmount, or when a later render binds a store with a different id,
//!    the effect's cleanup releases the subscription.
//!
//! The setter has the same [`SetState`] type as the one [`use_state`] returns,
//! so swapping one hook for the other leaves the component body unchanged. It
//! writes to the store only. Local state changes solely through
//! the subscription, so what the component shows cannot drift from the store
//! while it is subscribed.

mod factory;

pub use factory::{create_empty_store, create_store, create_store_with, CreatedStore};

use std::sync::Arc;

use tracing::debug;

use crate::error::HookError;
use crate::host::{use_effect, use_state, Cleanup, SetState};
use crate::store::{get_store_value, Writable};

/// Bind `store` to the component being rendered.
///
/// Returns the value to render and a setter that forwards to the store's
/// `set`, with the same types as [`use_state`].
pub fn use_store<T, W>(store: &W) -> Result<(T, SetState<T>), HookError>
where
    T: Clone + Send + Sync + 'static,
    W: Writable<T> + Clone + Send + Sync + 'static,
{
    let (value, set_value) = use_state(|| get_store_value(store))?;

    let source = store.clone();
    use_effect(store.id(), move || -> Cleanup {
        let id = source.id();
        let subscription = source.subscribe(move |next: &T| set_value(next.clone()));
        debug!(store = id.raw(), "binding subscribed");

        Box::new(move || {
            subscription.unsubscribe();
            debug!(store = id.raw(), "binding released");
        })
    })?;

    let target = store.clone();
    let set: SetState<T> = Arc::new(move |next: T| target.set(next));

    Ok((value, set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Component;
    use crate::store::Store;

    type Counter = Component<(i32, SetState<i32>)>;

    /// Mount a body that only knows the `(value, setter)` pair.
    fn doubled<H>(hook: H) -> Counter
    where
        H: Fn() -> Result<(i32, SetState<i32>), HookError> + 'static,
    {
        Component::mount(move || {
            let (n, set) = hook()?;
            Ok((n * 2, set))
        })
        .unwrap()
    }

    #[test]
    fn interchangeable_with_use_state() {
        let store = Store::new(1);
        let bound = store.clone();

        let mut local = doubled(|| use_state(|| 1));
        let mut shared = doubled(move || use_store(&bound));

        for component in [&mut local, &mut shared] {
            assert_eq!(component.view().0, 2);
            let set = component.view().1.clone();
            set(5);
            component.flush().unwrap();
            assert_eq!(component.view().0, 10);
        }
        assert_eq!(get_store_value(&store), 5);
    }

    #[test]
    fn setter_writes_through_to_store() {
        let store = Store::new(1);
        let bound = store.clone();
        let component = Component::mount(move || use_store(&bound)).unwrap();

        let set = component.view().1.clone();
        set(2);
        assert_eq!(get_store_value(&store), 2);

        // Still forwards after the component is gone.
        component.unmount();
        set(3);
        assert_eq!(get_store_value(&store), 3);
    }

    #[test]
    fn seeded_from_store_on_first_render() {
        let store = Store::new(String::from("hello"));
        let bound = store.clone();
        let component =
            Component::mount(move || use_store(&bound).map(|(value, _)| value)).unwrap();

        assert_eq!(component.view(), "hello");
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn release_on_unmount() {
        let store = Store::new(0);
        let bound = store.clone();
        let component =
            Component::mount(move || use_store(&bound).map(|(value, _)| value)).unwrap();
        assert_eq!(store.subscriber_count(), 1);

        component.unmount();
        assert_eq!(store.subscriber_count(), 0);

        // A torn-down component is not notified.
        store.set(5);
    }

    #[test]
    fn use_store_outside_render_fails() {
        let store = Store::new(0);
        assert_eq!(use_store(&store).err(), Some(HookError::OutsideRender));
        assert_eq!(store.subscriber_count(), 0);
    }
}
