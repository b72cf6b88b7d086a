//! Error types for the item-state layer
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Staleness is deliberately absent here: a stale state is reported through
//! its status (`StaleModified` / `StaleDestroyed`), never as an error.

use crate::status::Status;
use crate::types::ItemId;
use crate::value::PropertyType;
use thiserror::Error;

/// Result type alias for item-state operations
pub type StateResult<T> = std::result::Result<T, StateError>;

/// Boxed underlying cause carried by encoding errors
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for the item-state layer
#[derive(Debug, Error)]
pub enum StateError {
    /// Status not permitted for the requested operation
    ///
    /// Raised by the construction contracts. This signals a programming
    /// error in the caller and must not be retried.
    #[error("illegal status {status} for {operation}")]
    InvalidStatus {
        /// The rejected status
        status: Status,
        /// Operation that rejected it
        operation: &'static str,
    },

    /// Raw status code outside the closed status set
    #[error("illegal status code: {0}")]
    UnknownStatusCode(i32),

    /// Raw property type code outside the closed type set
    #[error("unknown property type code: {0}")]
    UnknownPropertyType(i32),

    /// Overlay requested on a state that already overlays another
    #[error("cannot overlay {0}: target is itself an overlay")]
    NestedOverlay(ItemId),

    /// Canonical text could not be parsed into a value of the given type
    #[error("invalid {property_type} value '{text}': {reason}")]
    InvalidValue {
        /// Target property type
        property_type: PropertyType,
        /// Offending text
        text: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Malformed qualified name
    #[error("invalid qualified name: {0}")]
    InvalidName(String),

    /// Persistence-format failure, wrapping the underlying cause
    #[error("encoding error: {reason}")]
    Encoding {
        /// What was being encoded or decoded
        reason: String,
        /// Underlying cause
        #[source]
        source: BoxedCause,
    },

    /// Configuration could not be read, parsed, or validated
    #[error("configuration error: {0}")]
    Config(String),
}

impl StateError {
    /// Wrap an underlying cause as a persistence-format error
    pub fn encoding(reason: impl Into<String>, source: impl Into<BoxedCause>) -> Self {
        StateError::Encoding {
            reason: reason.into(),
            source: source.into(),
        }
    }

    /// Whether this error reports a caller programming error
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            StateError::InvalidStatus { .. }
                | StateError::UnknownStatusCode(_)
                | StateError::NestedOverlay(_)
        )
    }
}
