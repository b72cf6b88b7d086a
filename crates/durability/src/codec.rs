//! Persisted property record encoding
//!
//! ## Record Format
//!
//! ```text
//! record      := name, type-code, value-block
//! name        := text
//! type-code   := i32 (big-endian)
//! value-block := 0x00                              ABSENT
//!              | 0x01, count: u32 (BE), text * count
//! text        := len: u32 (BE), UTF-8 bytes
//! ```
//!
//! Fields are written and read in exactly this order. There is no outer
//! record length; the text framing is the only length information.
//!
//! For `BINARY` properties every text is the standard (padded) base64 of the
//! value's byte stream. All other types store the value's canonical text.
//! An absent value sequence is encoded as `ABSENT` and decodes as absent,
//! never as an empty sequence.

use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderStringWriter;
use base64::Engine;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use itemstate_concurrency::PropertyState;
use itemstate_core::{
    BinaryValue, InternalValue, PropertyType, QName, StateError, StateResult,
};
use std::io::{self, Read, Write};
use tracing::trace;

/// Value-block tag: no value sequence
pub const VALUES_ABSENT: u8 = 0x00;

/// Value-block tag: value sequence follows
pub const VALUES_PRESENT: u8 = 0x01;

/// Initial capacity of the base64 buffer for binary values
///
/// Binary payloads are rarely just a few bytes.
pub const DEFAULT_BINARY_BUFFER_CAPACITY: usize = 32 * 1024;

/// Decoded (or to-be-encoded) property record
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    /// Property name
    pub name: QName,
    /// Property type code
    pub property_type: PropertyType,
    /// Values; `None` when absent
    pub values: Option<Vec<InternalValue>>,
}

impl PropertyRecord {
    /// Capture the persisted fields of a property state
    pub fn from_state(state: &PropertyState) -> Self {
        Self {
            name: state.name(),
            property_type: state.property_type(),
            values: state.values().map(|values| values.to_vec()),
        }
    }

    /// Encode this record with the default binary buffer capacity
    pub fn encode<W: Write>(&self, writer: &mut W) -> StateResult<()> {
        self.encode_with_capacity(writer, DEFAULT_BINARY_BUFFER_CAPACITY)
    }

    /// Encode this record
    ///
    /// `binary_buffer_capacity` sizes the buffer that receives the base64
    /// text of each binary value.
    ///
    /// Nothing is written unless every value matches the record's type.
    ///
    /// # Errors
    /// Returns `Encoding` if a value does not belong to the record's type
    /// (including any value under `UNDEFINED`), a binary stream fails, or the
    /// writer fails.
    pub fn encode_with_capacity<W: Write>(
        &self,
        writer: &mut W,
        binary_buffer_capacity: usize,
    ) -> StateResult<()> {
        self.check_value_types()?;
        write_text(writer, &self.name.to_string())?;
        writer
            .write_i32::<BigEndian>(self.property_type.code())
            .map_err(|e| StateError::encoding("property type", e))?;

        let values = match &self.values {
            None => {
                writer
                    .write_u8(VALUES_ABSENT)
                    .map_err(|e| StateError::encoding("value block", e))?;
                trace!(target: "itemstate::codec", name = %self.name, "Encoded property with absent values");
                return Ok(());
            }
            Some(values) => values,
        };

        writer
            .write_u8(VALUES_PRESENT)
            .map_err(|e| StateError::encoding("value block", e))?;
        let count =
            u32::try_from(values.len()).map_err(|e| StateError::encoding("value count", e))?;
        writer
            .write_u32::<BigEndian>(count)
            .map_err(|e| StateError::encoding("value count", e))?;

        for (index, value) in values.iter().enumerate() {
            let text = if self.property_type == PropertyType::Binary {
                encode_binary(value, binary_buffer_capacity)
                    .map_err(|e| StateError::encoding(format!("binary value {}", index), e))?
            } else {
                value.to_canonical_string()
            };
            write_text(writer, &text)?;
        }

        trace!(target: "itemstate::codec", name = %self.name, values = values.len(), "Encoded property");
        Ok(())
    }

    fn check_value_types(&self) -> StateResult<()> {
        let values = match &self.values {
            Some(values) => values,
            None => return Ok(()),
        };
        if self.property_type == PropertyType::Undefined && !values.is_empty() {
            return Err(StateError::encoding(
                format!("values of {}", self.name),
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    "property type UNDEFINED cannot hold values",
                ),
            ));
        }
        for (index, value) in values.iter().enumerate() {
            if value.property_type() != self.property_type {
                return Err(StateError::encoding(
                    format!("value {} of {}", index, self.name),
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!(
                            "expected {} value, found {}",
                            self.property_type,
                            value.property_type()
                        ),
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Decode a record
    ///
    /// # Errors
    /// Returns `Encoding` on truncated input, invalid UTF-8, an unknown type
    /// code, an unknown value-block tag, invalid base64, or text that does not
    /// parse as a value of the record's type.
    pub fn decode<R: Read>(reader: &mut R) -> StateResult<Self> {
        let name_text = read_text(reader)?;
        let name: QName = name_text
            .parse()
            .map_err(|e| StateError::encoding("property name", e))?;

        let code = reader
            .read_i32::<BigEndian>()
            .map_err(|e| StateError::encoding("property type", e))?;
        let property_type =
            PropertyType::from_code(code).map_err(|e| StateError::encoding("property type", e))?;

        let tag = reader
            .read_u8()
            .map_err(|e| StateError::encoding("value block", e))?;
        let values = match tag {
            VALUES_ABSENT => None,
            VALUES_PRESENT => {
                let count = reader
                    .read_u32::<BigEndian>()
                    .map_err(|e| StateError::encoding("value count", e))?;
                let mut values = Vec::new();
                for index in 0..count {
                    let text = read_text(reader)?;
                    let value = decode_value(&text, property_type).map_err(|e| {
                        StateError::encoding(format!("value {} of {}", index, name), e)
                    })?;
                    values.push(value);
                }
                Some(values)
            }
            other => {
                return Err(StateError::encoding(
                    "value block",
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("unknown value-block tag 0x{:02x}", other),
                    ),
                ))
            }
        };

        trace!(target: "itemstate::codec", %name, absent = values.is_none(), "Decoded property");
        Ok(Self {
            name,
            property_type,
            values,
        })
    }
}

/// Encode the persisted fields of `state`
pub fn encode_property<W: Write>(state: &PropertyState, writer: &mut W) -> StateResult<()> {
    PropertyRecord::from_state(state).encode(writer)
}

/// Decode a property record
pub fn decode_property<R: Read>(reader: &mut R) -> StateResult<PropertyRecord> {
    PropertyRecord::decode(reader)
}

fn encode_binary(value: &InternalValue, capacity: usize) -> Result<String, io::Error> {
    let binary = match value {
        InternalValue::Binary(binary) => binary,
        other => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected binary value, found {}", other.property_type()),
            ))
        }
    };
    let mut stream = binary.stream();
    let mut encoder = EncoderStringWriter::from_consumer(String::with_capacity(capacity), &STANDARD);
    io::copy(&mut stream, &mut encoder)?;
    Ok(encoder.into_inner())
}

fn decode_value(text: &str, property_type: PropertyType) -> StateResult<InternalValue> {
    if property_type == PropertyType::Binary {
        let bytes = STANDARD
            .decode(text)
            .map_err(|e| StateError::encoding("base64", e))?;
        return Ok(InternalValue::Binary(BinaryValue::new(bytes)));
    }
    InternalValue::value_of(text, property_type)
}

fn write_text<W: Write>(writer: &mut W, text: &str) -> StateResult<()> {
    let bytes = text.as_bytes();
    let len = u32::try_from(bytes.len()).map_err(|e| StateError::encoding("text length", e))?;
    writer
        .write_u32::<BigEndian>(len)
        .map_err(|e| StateError::encoding("text length", e))?;
    writer
        .write_all(bytes)
        .map_err(|e| StateError::encoding("text", e))
}

fn read_text<R: Read>(reader: &mut R) -> StateResult<String> {
    let len = reader
        .read_u32::<BigEndian>()
        .map_err(|e| StateError::encoding("text length", e))? as u64;
    let mut bytes = Vec::new();
    reader
        .take(len)
        .read_to_end(&mut bytes)
        .map_err(|e| StateError::encoding("text", e))?;
    if bytes.len() as u64 != len {
        return Err(StateError::encoding(
            "text",
            io::Error::new(io::ErrorKind::UnexpectedEof, "truncated text"),
        ));
    }
    String::from_utf8(bytes).map_err(|e| StateError::encoding("text", e))
}
