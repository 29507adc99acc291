//! Store factory: a store plus a binding accessor already pointed at it.

use std::fmt;
use std::marker::PhantomData;

use super::use_store;
use crate::error::HookError;
use crate::host::SetState;
use crate::store::{Store, Writable};

/// A store and its bound accessor, as returned by [`create_store`].
pub struct CreatedStore<T, W> {
    /// The store itself, for access outside of components.
    pub store: W,
    _value: PhantomData<fn() -> T>,
}

impl<T, W> CreatedStore<T, W>
where
    T: Clone + Send + Sync + 'static,
    W: Writable<T> + Clone + Send + Sync + 'static,
{
    fn new(store: W) -> Self {
        Self {
            store,
            _value: PhantomData,
        }
    }

    /// [`use_store`] bound to this store. Call it while rendering a component.
    pub fn use_store(&self) -> Result<(T, SetState<T>), HookError> {
        use_store(&self.store)
    }
}

impl<T, W: Clone> Clone for CreatedStore<T, W> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _value: PhantomData,
        }
    }
}

impl<T, W: fmt::Debug> fmt::Debug for CreatedStore<T, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedStore")
            .field("store", &self.store)
            .finish()
    }
}

/// Create a [`Store`] holding `initial`, with its accessor.
pub fn create_store<T>(initial: T) -> CreatedStore<T, Store<T>>
where
    T: Clone + Send + Sync + 'static,
{
    create_store_with(initial, Store::new)
}

/// Create a store with `constructor`, with its accessor.
///
/// Any [`Writable`] works, so a store with extra behavior keeps the same
/// binding ergonomics.
pub fn create_store_with<T, W, C>(initial: T, constructor: C) -> CreatedStore<T, W>
where
    T: Clone + Send + Sync + 'static,
    W: Writable<T> + Clone + Send + Sync + 'static,
    C: FnOnce(T) -> W,
{
    CreatedStore::new(constructor(initial))
}

/// Create a store with no initial value. It starts out holding `None`.
pub fn create_empty_store<T>() -> CreatedStore<Option<T>, Store<Option<T>>>
where
    T: Clone + Send + Sync + 'static,
{
    create_store(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Component;
    use crate::store::{get_store_value, Invalidator, Readable, StoreId, Subscriber, Unsubscriber};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts writes on top of the built-in store.
    #[derive(Clone)]
    struct Counted {
        inner: Store<i32>,
        writes: Arc<AtomicUsize>,
    }

    impl Readable<i32> for Counted {
        fn id(&self) -> StoreId {
            self.inner.id()
        }

        fn subscribe_with(
            &self,
            callback: Subscriber<i32>,
            invalidate: Option<Invalidator<i32>>,
        ) -> Unsubscriber {
            self.inner.subscribe_with(callback, invalidate)
        }
    }

    impl Writable<i32> for Counted {
        fn set(&self, value: i32) {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(value);
        }
    }

    #[test]
    fn create_store_exposes_store() {
        let created = create_store(3);
        assert_eq!(get_store_value(&created.store), 3);

        created.store.set(4);
        assert_eq!(get_store_value(&created.store), 4);
    }

    #[test]
    fn empty_store_starts_as_none() {
        let created = create_empty_store::<String>();
        assert_eq!(get_store_value(&created.store), None);

        created.store.set(Some("set".to_string()));
        assert_eq!(get_store_value(&created.store), Some("set".to_string()));
    }

    #[test]
    fn custom_constructor_is_used() {
        let writes = Arc::new(AtomicUsize::new(0));
        let counter = writes.clone();
        let created = create_store_with(1, move |initial| Counted {
            inner: Store::new(initial),
            writes: counter,
        });

        created.store.set(2);
        created.store.update(|v| v * 3);

        assert_eq!(get_store_value(&created.store), 6);
        assert_eq!(writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn accessor_binds_to_its_store() {
        let created = create_store(10);
        let accessor = created.clone();

        let mut component = Component::mount(move || accessor.use_store()).unwrap();
        assert_eq!(component.view().0, 10);

        (component.view().1)(11);
        assert_eq!(get_store_value(&created.store), 11);

        component.flush().unwrap();
        assert_eq!(component.view().0, 11);
    }
}
