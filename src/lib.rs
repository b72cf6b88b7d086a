//! itemstate - Transactional copy-on-write item-state layer
//!
//! Tracks, per session, copy-on-write snapshots of repository item states so
//! modifications can be built up and inspected without touching the shared
//! persistent record, while concurrent sessions keep working against it.
//!
//! # Quick Start
//!
//! ```
//! use itemstate::{InternalValue, NodeId, PropertyType, QName, StateFactory, Status};
//!
//! let factory = StateFactory::default();
//! let persistent = factory
//!     .new_property(QName::local("title")?, Some(NodeId::new()), Status::Existing)?;
//! persistent.set_property_type(PropertyType::String);
//! persistent.set_values(Some(vec![InternalValue::from("Hello")]));
//!
//! // A session takes a transient copy...
//! let transient = factory.overlay_property(&persistent, Status::ExistingModified)?;
//! assert!(transient.is_transient());
//!
//! // ...and another session modifies the persistent state underneath it.
//! persistent.notify_modified();
//! assert_eq!(transient.status(), Status::StaleModified);
//!
//! transient.dispose();
//! # Ok::<(), itemstate::StateError>(())
//! ```
//!
//! # Architecture
//!
//! - `itemstate-core`: ids, statuses, values, errors
//! - `itemstate-concurrency`: item states, overlays, listener fabric
//! - `itemstate-durability`: persisted property record codec
//! - `itemstate-engine`: configuration and construction factory

pub use itemstate_engine::*;
