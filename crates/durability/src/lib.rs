//! Durability layer for item states
//!
//! This crate owns the persisted property record format:
//! - PropertyRecord: name, type code, and value block of a property
//! - encode_property / decode_property: bit-exact record codec
//!
//! Storage I/O itself is out of scope; the codec writes to any `io::Write`
//! and reads from any `io::Read`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;

pub use codec::{
    decode_property, encode_property, PropertyRecord, DEFAULT_BINARY_BUFFER_CAPACITY,
};
