//! Tether Core
//!
//! Observable stores and a hook-style binding that lets a component use a
//! shared store exactly like its own local state.
//!
//! - Stores holding one value and broadcasting every change, synchronously and
//!   in subscription order
//! - A headless component host with `use_state` and `use_effect` hooks
//! - The binding (`use_store`) and a factory pairing a store with it
//!
//! # Architecture
//!
//! - `store`: the [`Readable`]/[`Writable`] capabilities and the built-in [`Store`]
//! - `host`: render context, hooks and the [`Component`](host::Component) lifecycle
//! - `binding`: [`use_store`] and [`create_store`]
//!
//! # Example
//!
//! ```rust
//! use tether_core::host::Component;
//! use tether_core::{create_store, get_store_value, Writable};
//!
//! let counter = create_store(0);
//!
//! let accessor = counter.clone();
//! let mut component = Component::mount(move || {
//!     let (count, set_count) = accessor.use_store()?;
//!     Ok((format!("count: {count}"), set_count))
//! })
//! .unwrap();
//! assert_eq!(component.view().0, "count: 0");
//!
//! // Writes from outside the component show up on the next flush.
//! counter.store.set(5);
//! component.flush().unwrap();
//! assert_eq!(component.view().0, "count: 5");
//!
//! // The setter writes to the store, not to the component.
//! (component.view().1)(6);
//! assert_eq!(get_store_value(&counter.store), 6);
//! ```

pub mod binding;
pub mod error;
pub mod host;
pub mod store;

pub use binding::{create_empty_store, create_store, create_store_with, use_store, CreatedStore};
pub use error::HookError;
pub use store::{
    get_store_value, Invalidator, Readable, Store, StoreId, Subscriber, SubscriptionId,
    Unsubscriber, Writable,
};
