//! Item-state engine
//!
//! Entry point for the persistent-state manager:
//! - StateConfig: `itemstate.toml` configuration
//! - StateFactory: fresh / overlay / restore construction and record I/O
//!
//! Re-exports the core, concurrency, and durability APIs so callers only
//! need this crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod factory;

pub use config::{StateConfig, CONFIG_FILE_NAME};
pub use factory::StateFactory;

pub use itemstate_concurrency::{
    ItemRecord, ItemState, ItemStateListener, ItemVariant, ListenerId, ListenerRegistry,
    Observable, OverlayObserver, PropertyData, PropertyState, StateEvent, Values,
};
pub use itemstate_core::{
    BinaryValue, InternalValue, ItemId, NodeId, PropDefId, PropertyId, PropertyType, QName,
    StateError, StateResult, Status, Timestamp, DEFAULT_BASE_VERSION,
};
pub use itemstate_durability::{
    decode_property, encode_property, PropertyRecord, DEFAULT_BINARY_BUFFER_CAPACITY,
};
