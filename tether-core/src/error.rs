//! Errors raised by the component host.
//!
//! Stores themselves never fail. Hooks do, when they are called outside a
//! render or in a different shape than on the first render.

use thiserror::Error;

/// Misuse of the hook API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// A hook ran with no component being rendered on this thread.
    #[error("hook called outside of a component render")]
    OutsideRender,

    /// The hook at `index` is not the kind it was on the first render.
    #[error("hook #{index} changed between renders, expected {expected}")]
    HookMismatch { index: usize, expected: &'static str },

    /// A render called a different number of hooks than the first render.
    #[error("render called {found} hooks, first render called {expected}")]
    HookCountChanged { expected: usize, found: usize },

    /// The component kept scheduling re-renders.
    #[error("component still dirty after {passes} render passes")]
    RenderLoop { passes: usize },
}
