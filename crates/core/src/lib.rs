//! Core types for the item-state layer
//!
//! This crate defines the foundational types used throughout the system:
//! - Status: Closed set of item-state statuses
//! - NodeId / QName / PropertyId / ItemId: Item identity
//! - PropDefId: Property-definition reference
//! - PropertyType / InternalValue / BinaryValue: Typed property values
//! - Timestamp: Last-modified stamp
//! - StateError: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod status;
pub mod timestamp;
pub mod types;
pub mod value;

pub use error::{StateError, StateResult};
pub use status::Status;
pub use timestamp::Timestamp;
pub use types::{ItemId, NodeId, PropDefId, PropertyId, QName};
pub use value::{BinaryValue, InternalValue, PropertyType};

/// Base version assigned to freshly constructed states
pub const DEFAULT_BASE_VERSION: &str = "v0.0";
