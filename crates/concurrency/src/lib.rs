//! Concurrency layer for item states
//!
//! This crate implements the transient, copy-on-write side of the item-state
//! layer:
//! - ItemState: Status machine, overlay link, staleness detection
//! - PropertyState: Property variant (name, type, definition, values)
//! - ItemStateListener / Observable: Lifecycle notification fabric
//! - ListenerRegistry: Weak, snapshot-iterated listener registry
//!
//! Staleness is the optimistic-concurrency conflict signal: an overlay whose
//! persistent state was modified or destroyed by another session reports
//! `StaleModified` / `StaleDestroyed`. Resolving the conflict is up to the
//! transaction manager that owns the session.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod item_state;
pub mod listener;
pub mod property;
pub mod registry;

pub use item_state::{ItemState, ItemVariant, OverlayObserver};
pub use listener::{ItemRecord, ItemStateListener, ListenerId, Observable, StateEvent};
pub use property::{PropertyData, PropertyState, Values};
pub use registry::ListenerRegistry;
