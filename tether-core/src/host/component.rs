//! Components
//!
//! A component is a render closure plus the hook slots it owns. The closure
//! runs inside a [`RenderContext`], so hooks called from it land in this
//! component's slots, in call order.
//!
//! # Lifecycle
//!
//! 1. `mount` renders once, then commits: every effect queued during the
//!    render has its previous cleanup run and its setup run.
//!
//! 2. State setters mark the component dirty. `flush` re-renders until the
//!    component is clean.
//!
//! 3. `unmount` (or dropping the component) runs every remaining cleanup once
//!    and ignores later state updates.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::context::RenderContext;
use super::hooks::{Cleanup, EffectKey};
use crate::error::HookError;

/// Upper bound on consecutive re-renders in one `flush`.
pub const MAX_RENDER_PASSES: usize = 25;

/// Unique identifier for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Generate a new unique component ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) type Setup = Box<dyn FnOnce() -> Cleanup + Send>;

enum Slot {
    /// Type-erased `Mutex<T>` behind an `Arc`.
    State(Arc<dyn Any + Send + Sync>),
    Effect {
        key: EffectKey,
        cleanup: Option<Cleanup>,
    },
}

struct PendingEffect {
    index: usize,
    /// Stored in the slot only once the render commits.
    key: EffectKey,
    setup: Setup,
}

/// The hook storage and flags of a component, shared with its setters.
pub(crate) struct ComponentCore {
    id: ComponentId,
    slots: Mutex<Vec<Slot>>,
    /// Effects queued by the current render, run at commit.
    pending: Mutex<Vec<PendingEffect>>,
    dirty: AtomicBool,
    mounted: AtomicBool,
    /// Set after the first render; the slot count is fixed from then on.
    frozen: AtomicBool,
}

impl ComponentCore {
    pub(crate) fn new() -> Self {
        Self {
            id: ComponentId::new(),
            slots: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
            dirty: AtomicBool::new(false),
            mounted: AtomicBool::new(true),
            frozen: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> ComponentId {
        self.id
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::SeqCst)
    }

    fn missing_slot(&self, slots: &[Slot], index: usize) -> Result<(), HookError> {
        if self.is_frozen() {
            Err(HookError::HookCountChanged {
                expected: slots.len(),
                found: index + 1,
            })
        } else {
            Ok(())
        }
    }

    /// The state cell at `index`, or `None` if this is its first render.
    pub(crate) fn state_cell<T>(&self, index: usize) -> Result<Option<Arc<Mutex<T>>>, HookError>
    where
        T: Send + 'static,
    {
        let slots = self.slots.lock();
        match slots.get(index) {
            Some(Slot::State(cell)) => Arc::clone(cell)
                .downcast::<Mutex<T>>()
                .map(Some)
                .map_err(|_| HookError::HookMismatch {
                    index,
                    expected: "use_state",
                }),
            Some(Slot::Effect { .. }) => Err(HookError::HookMismatch {
                index,
                expected: "use_state",
            }),
            None => self.missing_slot(&slots, index).map(|()| None),
        }
    }

    pub(crate) fn push_state<T>(&self, index: usize, cell: Arc<Mutex<T>>)
    where
        T: Send + 'static,
    {
        let mut slots = self.slots.lock();
        debug_assert_eq!(slots.len(), index);
        slots.push(Slot::State(cell));
        trace!(component = self.id.raw(), index, "state slot");
    }

    /// Queue `setup` for the effect at `index` if its key changed.
    pub(crate) fn effect(
        &self,
        index: usize,
        key: EffectKey,
        setup: Setup,
    ) -> Result<(), HookError> {
        let mut slots = self.slots.lock();
        match slots.get(index) {
            Some(Slot::Effect { key: current, .. }) => {
                if *current == key {
                    return Ok(());
                }
            }
            Some(Slot::State(_)) => {
                return Err(HookError::HookMismatch {
                    index,
                    expected: "use_effect",
                });
            }
            None => {
                self.missing_slot(&slots, index)?;
                debug_assert_eq!(slots.len(), index);
                slots.push(Slot::Effect { key, cleanup: None });
                trace!(component = self.id.raw(), index, "effect slot");
            }
        }
        drop(slots);

        self.pending.lock().push(PendingEffect { index, key, setup });
        Ok(())
    }

    /// Run queued effects: previous cleanup first, then setup.
    fn commit(&self) {
        let pending = std::mem::take(&mut *self.pending.lock());
        for PendingEffect { index, key, setup } in pending {
            if let Some(cleanup) = self.take_cleanup(index) {
                cleanup();
            }
            let cleanup = setup();
            if let Some(Slot::Effect {
                key: current,
                cleanup: slot,
            }) = self.slots.lock().get_mut(index)
            {
                *current = key;
                *slot = Some(cleanup);
            }
        }
    }

    fn take_cleanup(&self, index: usize) -> Option<Cleanup> {
        match self.slots.lock().get_mut(index) {
            Some(Slot::Effect { cleanup, .. }) => cleanup.take(),
            _ => None,
        }
    }

    /// Run every cleanup once. Later calls do nothing.
    fn teardown(&self) {
        if !self.mounted.swap(false, Ordering::SeqCst) {
            return;
        }
        self.pending.lock().clear();

        let cleanups: Vec<Cleanup> = self
            .slots
            .lock()
            .iter_mut()
            .filter_map(|slot| match slot {
                Slot::Effect { cleanup, .. } => cleanup.take(),
                Slot::State(_) => None,
            })
            .collect();
        for cleanup in cleanups {
            cleanup();
        }
        debug!(component = self.id.raw(), "unmount");
    }
}

type Render<V> = Box<dyn FnMut() -> Result<V, HookError>>;

/// A mounted component.
///
/// # Example
///
/// ```rust
/// use tether_core::host::{use_state, Component};
///
/// let mut component = Component::mount(|| {
///     let (count, set_count) = use_state(|| 0)?;
///     Ok((count, set_count))
/// })
/// .unwrap();
///
/// let set_count = component.view().1.clone();
/// set_count(5);
/// component.flush().unwrap();
/// assert_eq!(component.view().0, 5);
/// ```
pub struct Component<V> {
    core: Arc<ComponentCore>,
    render: Render<V>,
    view: V,
    render_count: usize,
}

impl<V> Component<V> {
    /// Render for the first time, commit effects, and flush.
    pub fn mount<F>(render: F) -> Result<Self, HookError>
    where
        F: FnMut() -> Result<V, HookError> + 'static,
    {
        let core = Arc::new(ComponentCore::new());
        let mut render: Render<V> = Box::new(render);

        let view = match Self::render_pass(&core, &mut render) {
            Ok(view) => view,
            Err(err) => {
                core.teardown();
                return Err(err);
            }
        };
        core.frozen.store(true, Ordering::SeqCst);
        debug!(component = core.id.raw(), "mount");

        let mut component = Self {
            core,
            render,
            view,
            render_count: 1,
        };
        component.flush()?;
        Ok(component)
    }

    fn render_pass(core: &Arc<ComponentCore>, render: &mut Render<V>) -> Result<V, HookError> {
        core.dirty.store(false, Ordering::SeqCst);

        let ctx = RenderContext::enter(Arc::clone(core));
        let result = render();
        let hooks = RenderContext::hook_count();
        drop(ctx);

        let checked = result.and_then(|view| {
            let expected = core.slots.lock().len();
            if core.is_frozen() && hooks != expected {
                return Err(HookError::HookCountChanged {
                    expected,
                    found: hooks,
                });
            }
            Ok(view)
        });
        match checked {
            Ok(view) => {
                core.commit();
                Ok(view)
            }
            Err(err) => {
                core.pending.lock().clear();
                Err(err)
            }
        }
    }

    fn render_once(&mut self) -> Result<(), HookError> {
        self.view = Self::render_pass(&self.core, &mut self.render)?;
        self.render_count += 1;
        trace!(
            component = self.core.id.raw(),
            renders = self.render_count,
            "render"
        );
        Ok(())
    }

    /// Re-render while the component is dirty. Returns the number of passes.
    pub fn flush(&mut self) -> Result<usize, HookError> {
        let mut passes = 0;
        while self.core.is_dirty() {
            if passes == MAX_RENDER_PASSES {
                return Err(HookError::RenderLoop { passes });
            }
            self.render_once()?;
            passes += 1;
        }
        Ok(passes)
    }

    /// Render now, whether dirty or not, then flush.
    ///
    /// Use this when something the render closure reads outside of hooks has
    /// changed, such as which store it binds to.
    pub fn rerender(&mut self) -> Result<(), HookError> {
        debug!(component = self.core.id.raw(), "rerender");
        self.render_once()?;
        self.flush().map(|_| ())
    }

    /// Output of the latest render.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Number of completed renders.
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    /// Whether a state update is waiting for a re-render.
    pub fn is_dirty(&self) -> bool {
        self.core.is_dirty()
    }

    /// Identity of this component, as seen in its log events.
    pub fn id(&self) -> ComponentId {
        self.core.id
    }

    /// Run every effect cleanup and stop accepting state updates.
    pub fn unmount(self) {
        self.core.teardown();
    }
}

impl<V> Drop for Component<V> {
    fn drop(&mut self) {
        self.core.teardown();
    }
}

impl<V: fmt::Debug> fmt::Debug for Component<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.core.id)
            .field("view", &self.view)
            .field("render_count", &self.render_count)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}
