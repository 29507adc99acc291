//! Component Host
//!
//! A headless component runtime providing the two hook primitives a binding
//! needs from a UI framework: local state and keyed effects.
//!
//! # Concepts
//!
//! ## Render context
//!
//! Hooks find the component they belong to through a thread-local render
//! context, pushed for the duration of each render. Calling a hook anywhere
//! else is an error.
//!
//! ## State
//!
//! [`use_state`] gives a component a value that survives re-renders and a
//! setter that schedules a re-render.
//!
//! ## Effects
//!
//! [`use_effect`] runs setup code after a render commits, keyed so it only
//! re-runs when its key changes. The cleanup it returns runs before the next
//! setup and on unmount. This is the scoped acquisition a store binding uses
//! for its subscription.

mod component;
mod context;
mod hooks;

pub use component::{Component, ComponentId, MAX_RENDER_PASSES};
pub use context::RenderContext;
pub use hooks::{use_effect, use_state, Cleanup, EffectKey, SetState};
