//! Hooks
//!
//! The two primitives components build on: local state and keyed effects.
//! Both must be called from inside a component render, in the same order on
//! every render.

use std::sync::Arc;

use parking_lot::Mutex;

use super::context::RenderContext;
use crate::error::HookError;
use crate::store::StoreId;

/// Setter returned by [`use_state`]. Replaces the value and schedules a
/// re-render; ignored once the component is unmounted.
pub type SetState<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Teardown returned by an effect's setup.
pub type Cleanup = Box<dyn FnOnce() + Send>;

/// Dependency key of an effect. The effect re-runs when its key changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectKey(u64);

impl EffectKey {
    /// Key from a raw value, for effects not tied to a store.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<StoreId> for EffectKey {
    fn from(id: StoreId) -> Self {
        Self(id.raw())
    }
}

/// Component-local state.
///
/// On the first render `init` produces the value; later renders return the
/// latest value passed to the setter.
pub fn use_state<T, F>(init: F) -> Result<(T, SetState<T>), HookError>
where
    T: Clone + Send + Sync + 'static,
    F: FnOnce() -> T,
{
    let (component, index) = RenderContext::next_hook()?;

    let cell = match component.state_cell::<T>(index)? {
        Some(cell) => cell,
        None => {
            // No slot lock is held here, so `init` may itself read stores.
            let cell = Arc::new(Mutex::new(init()));
            component.push_state(index, Arc::clone(&cell));
            cell
        }
    };
    let value = cell.lock().clone();

    let owner = Arc::downgrade(&component);
    let set: SetState<T> = Arc::new(move |next: T| {
        let Some(component) = owner.upgrade() else {
            return;
        };
        if !component.is_mounted() {
            return;
        }
        *cell.lock() = next;
        component.mark_dirty();
    });

    Ok((value, set))
}

/// Run `setup` after this render commits, if `key` differs from the previous
/// render's key (always on the first render).
///
/// The cleanup `setup` returns runs before the next setup of this effect and
/// when the component unmounts.
pub fn use_effect<K, F>(key: K, setup: F) -> Result<(), HookError>
where
    K: Into<EffectKey>,
    F: FnOnce() -> Cleanup + Send + 'static,
{
    let (component, index) = RenderContext::next_hook()?;
    component.effect(index, key.into(), Box::new(setup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Component;

    #[test]
    fn hooks_outside_render_fail() {
        assert_eq!(use_state(|| 1).err(), Some(HookError::OutsideRender));
        assert_eq!(
            use_effect(EffectKey::new(0), || Box::new(|| {})),
            Err(HookError::OutsideRender)
        );
    }

    #[test]
    fn store_id_converts_to_effect_key() {
        let id = StoreId::new();
        assert_eq!(EffectKey::from(id), EffectKey::new(id.raw()));
    }

    #[test]
    fn independent_state_slots() {
        let mut component = Component::mount(|| {
            let (a, set_a) = use_state(|| 1)?;
            let (b, set_b) = use_state(|| "b")?;
            Ok((a, b, set_a, set_b))
        })
        .unwrap();

        let set_a = component.view().2.clone();
        set_a(10);
        component.flush().unwrap();

        assert_eq!(component.view().0, 10);
        assert_eq!(component.view().1, "b");
    }
}
