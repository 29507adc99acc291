//! Render Context
//!
//! The render context tracks which component is currently rendering, so
//! hooks can find their slots without being handed the component.
//!
//! # Implementation
//!
//! A thread-local stack of frames. Rendering a component pushes a frame
//! holding the component and a hook cursor; each hook call advances the
//! cursor. The frame is popped when the guard drops, even if the render
//! panics. Nested renders (a component mounted from inside another's render)
//! each see their own frame.

use std::cell::RefCell;
use std::sync::Arc;

use super::component::{ComponentCore, ComponentId};
use crate::error::HookError;

thread_local! {
    static RENDER_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

struct Frame {
    component: Arc<ComponentCore>,
    /// Index of the next hook to be called.
    cursor: usize,
}

/// Guard that pops the frame when dropped.
pub struct RenderContext {
    component: ComponentId,
}

impl RenderContext {
    /// Start rendering `component` on this thread.
    pub(crate) fn enter(component: Arc<ComponentCore>) -> Self {
        let id = component.id();
        RENDER_STACK.with(|stack| {
            stack.borrow_mut().push(Frame {
                component,
                cursor: 0,
            });
        });

        Self { component: id }
    }

    /// Check if a component is rendering on this thread.
    pub fn is_active() -> bool {
        RENDER_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// The component currently rendering, if any.
    pub fn current_component() -> Option<ComponentId> {
        RENDER_STACK.with(|stack| stack.borrow().last().map(|frame| frame.component.id()))
    }

    /// Claim the next hook slot of the rendering component.
    pub(crate) fn next_hook() -> Result<(Arc<ComponentCore>, usize), HookError> {
        RENDER_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let frame = stack.last_mut().ok_or(HookError::OutsideRender)?;
            let index = frame.cursor;
            frame.cursor += 1;
            Ok((Arc::clone(&frame.component), index))
        })
    }

    /// Hooks called so far in the innermost render.
    pub(crate) fn hook_count() -> usize {
        RENDER_STACK.with(|stack| stack.borrow().last().map_or(0, |frame| frame.cursor))
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        RENDER_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(frame) = popped {
                debug_assert_eq!(
                    frame.component.id(),
                    self.component,
                    "RenderContext mismatch: expected {:?}, got {:?}",
                    self.component,
                    frame.component.id()
                );
            }
        });
    }
}
