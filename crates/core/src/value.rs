//! Property value types
//!
//! This module defines:
//! - PropertyType: Closed set of property type codes
//! - BinaryValue: Immutable byte payload read through a stream
//! - InternalValue: One typed value of a property
//!
//! ## Canonical Text Form
//!
//! Every non-binary value has a canonical textual form that parses back to
//! an equal value ([`InternalValue::to_canonical_string`] /
//! [`InternalValue::value_of`]):
//!
//! | Type      | Form                                   |
//! |-----------|----------------------------------------|
//! | STRING    | the string itself                      |
//! | LONG      | decimal i64                            |
//! | DOUBLE    | shortest round-trip decimal            |
//! | DATE      | RFC 3339, sub-second digits as needed  |
//! | BOOLEAN   | `true` / `false`                       |
//! | NAME      | `{uri}local`                           |
//! | PATH      | the path text                          |
//! | REFERENCE | hyphenated UUID of the target node     |
//!
//! BINARY payloads are not text; the persisted format base64-encodes their
//! byte stream instead.

use crate::error::{StateError, StateResult};
use crate::types::{NodeId, QName};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

/// Property type code
///
/// These values are part of the persisted format and MUST NOT change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum PropertyType {
    /// No type assigned yet
    #[default]
    Undefined = 0,
    /// UTF-8 string
    String = 1,
    /// Opaque byte payload
    Binary = 2,
    /// 64-bit signed integer
    Long = 3,
    /// 64-bit float
    Double = 4,
    /// Calendar date with offset
    Date = 5,
    /// Boolean
    Boolean = 6,
    /// Qualified name
    Name = 7,
    /// Repository path
    Path = 8,
    /// Reference to a node
    Reference = 9,
}

impl PropertyType {
    /// Every type code, in code order
    pub const ALL: [PropertyType; 10] = [
        PropertyType::Undefined,
        PropertyType::String,
        PropertyType::Binary,
        PropertyType::Long,
        PropertyType::Double,
        PropertyType::Date,
        PropertyType::Boolean,
        PropertyType::Name,
        PropertyType::Path,
        PropertyType::Reference,
    ];

    /// Persisted integer code
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Resolve an integer code
    ///
    /// # Errors
    /// Returns `UnknownPropertyType` for codes outside the closed set.
    pub fn from_code(code: i32) -> StateResult<Self> {
        PropertyType::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or(StateError::UnknownPropertyType(code))
    }

    /// Type name as a string
    pub const fn name(self) -> &'static str {
        match self {
            PropertyType::Undefined => "Undefined",
            PropertyType::String => "String",
            PropertyType::Binary => "Binary",
            PropertyType::Long => "Long",
            PropertyType::Double => "Double",
            PropertyType::Date => "Date",
            PropertyType::Boolean => "Boolean",
            PropertyType::Name => "Name",
            PropertyType::Path => "Path",
            PropertyType::Reference => "Reference",
        }
    }
}

impl TryFrom<i32> for PropertyType {
    type Error = StateError;

    fn try_from(code: i32) -> StateResult<Self> {
        PropertyType::from_code(code)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable binary payload
///
/// Cloning shares the underlying buffer. Consumers read the payload through
/// [`BinaryValue::stream`], which yields a fresh reader each call.
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryValue(Arc<[u8]>);

impl BinaryValue {
    /// Wrap owned bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }

    /// Drain a reader into a new payload
    pub fn from_stream(mut reader: impl Read) -> io::Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(Self::new(buf))
    }

    /// Fresh reader positioned at the start of the payload
    pub fn stream(&self) -> Cursor<Arc<[u8]>> {
        Cursor::new(Arc::clone(&self.0))
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy the payload out
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Debug for BinaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryValue({} bytes)", self.0.len())
    }
}

/// One typed property value
#[derive(Debug, Clone, PartialEq)]
pub enum InternalValue {
    /// STRING value
    String(String),
    /// BINARY value
    Binary(BinaryValue),
    /// LONG value
    Long(i64),
    /// DOUBLE value (IEEE-754 equality)
    Double(f64),
    /// DATE value
    Date(DateTime<FixedOffset>),
    /// BOOLEAN value
    Boolean(bool),
    /// NAME value
    Name(QName),
    /// PATH value
    Path(String),
    /// REFERENCE value
    Reference(NodeId),
}

impl InternalValue {
    /// The property type this value belongs to
    pub fn property_type(&self) -> PropertyType {
        match self {
            InternalValue::String(_) => PropertyType::String,
            InternalValue::Binary(_) => PropertyType::Binary,
            InternalValue::Long(_) => PropertyType::Long,
            InternalValue::Double(_) => PropertyType::Double,
            InternalValue::Date(_) => PropertyType::Date,
            InternalValue::Boolean(_) => PropertyType::Boolean,
            InternalValue::Name(_) => PropertyType::Name,
            InternalValue::Path(_) => PropertyType::Path,
            InternalValue::Reference(_) => PropertyType::Reference,
        }
    }

    /// Canonical textual form
    ///
    /// Binary payloads are rendered as lossy UTF-8; use the payload stream
    /// when the exact bytes matter.
    pub fn to_canonical_string(&self) -> String {
        match self {
            InternalValue::String(s) | InternalValue::Path(s) => s.clone(),
            InternalValue::Binary(b) => String::from_utf8_lossy(&b.0).into_owned(),
            InternalValue::Long(n) => n.to_string(),
            InternalValue::Double(d) => d.to_string(),
            InternalValue::Date(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            InternalValue::Boolean(b) => b.to_string(),
            InternalValue::Name(name) => name.to_string(),
            InternalValue::Reference(id) => id.to_string(),
        }
    }

    /// Parse a value of the given type from its canonical textual form
    ///
    /// # Errors
    /// Returns `InvalidValue` if the text is not a valid rendering of the
    /// type, or if the type is `Undefined`.
    pub fn value_of(text: &str, property_type: PropertyType) -> StateResult<Self> {
        let invalid = |reason: String| StateError::InvalidValue {
            property_type,
            text: text.to_string(),
            reason,
        };

        let value = match property_type {
            PropertyType::String => InternalValue::String(text.to_string()),
            PropertyType::Binary => InternalValue::Binary(BinaryValue::new(text.as_bytes())),
            PropertyType::Long => {
                InternalValue::Long(text.parse().map_err(|e| invalid(format!("{}", e)))?)
            }
            PropertyType::Double => {
                InternalValue::Double(text.parse().map_err(|e| invalid(format!("{}", e)))?)
            }
            PropertyType::Date => InternalValue::Date(
                DateTime::parse_from_rfc3339(text).map_err(|e| invalid(format!("{}", e)))?,
            ),
            PropertyType::Boolean => match text {
                "true" => InternalValue::Boolean(true),
                "false" => InternalValue::Boolean(false),
                _ => return Err(invalid("expected 'true' or 'false'".to_string())),
            },
            PropertyType::Name => {
                InternalValue::Name(text.parse().map_err(|e| invalid(format!("{}", e)))?)
            }
            PropertyType::Path => InternalValue::Path(text.to_string()),
            PropertyType::Reference => InternalValue::Reference(
                NodeId::from_string(text).ok_or_else(|| invalid("not a UUID".to_string()))?,
            ),
            PropertyType::Undefined => {
                return Err(invalid("undefined type has no values".to_string()))
            }
        };
        Ok(value)
    }
}

impl From<&str> for InternalValue {
    fn from(s: &str) -> Self {
        InternalValue::String(s.to_string())
    }
}

impl From<String> for InternalValue {
    fn from(s: String) -> Self {
        InternalValue::String(s)
    }
}

impl From<i64> for InternalValue {
    fn from(n: i64) -> Self {
        InternalValue::Long(n)
    }
}

impl From<f64> for InternalValue {
    fn from(d: f64) -> Self {
        InternalValue::Double(d)
    }
}

impl From<bool> for InternalValue {
    fn from(b: bool) -> Self {
        InternalValue::Boolean(b)
    }
}

impl From<BinaryValue> for InternalValue {
    fn from(b: BinaryValue) -> Self {
        InternalValue::Binary(b)
    }
}

impl fmt::Display for InternalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}
