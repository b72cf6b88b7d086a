//! Persisted Record Tests
//!
//! Property states written through a configured factory and read back.

use crate::common::*;
use itemstate::{
    decode_property, encode_property, BinaryValue, InternalValue, NodeId, PropertyState,
    PropertyType, StateConfig, StateError, StateFactory, Status, CONFIG_FILE_NAME,
};
use rand::Rng;
use std::io::Cursor;
use tempfile::TempDir;

fn binary_property(payloads: &[Vec<u8>]) -> std::sync::Arc<PropertyState> {
    let state = PropertyState::new_property(qname("data"), Some(NodeId::new()), Status::New).unwrap();
    state.set_property_type(PropertyType::Binary);
    state.set_values(Some(
        payloads
            .iter()
            .map(|bytes| InternalValue::from(BinaryValue::new(bytes.clone())))
            .collect(),
    ));
    state
}

#[test]
fn factory_from_config_file_round_trips_binary_values() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "initial_base_version = \"v1.0\"\nbinary_buffer_capacity = 64\n",
    )
    .unwrap();
    let factory = StateFactory::new(StateConfig::from_file(&path).unwrap()).unwrap();

    let mut large = vec![0u8; 200_000];
    rand::thread_rng().fill(&mut large[..]);
    let state = binary_property(&[Vec::new(), b"small".to_vec(), large.clone()]);

    let mut buf = Vec::new();
    factory.encode(&state, &mut buf).unwrap();
    let record = factory.decode(&mut Cursor::new(buf)).unwrap();
    let restored = factory
        .restore_property(record, state.parent_id(), Status::Existing)
        .unwrap();

    assert_eq!(restored.base_version(), "v1.0");
    assert_eq!(restored.property_type(), PropertyType::Binary);
    let values = restored.values().unwrap();
    assert_eq!(values.len(), 3);
    match (&values[0], &values[1], &values[2]) {
        (InternalValue::Binary(a), InternalValue::Binary(b), InternalValue::Binary(c)) => {
            assert!(a.is_empty());
            assert_eq!(b.to_vec(), b"small");
            assert_eq!(c.to_vec(), large);
        }
        other => panic!("expected binary values, got {:?}", other),
    }
}

#[test]
fn string_values_survive_in_order() {
    let state = persistent_string_property("greeting", &["Hello", "World"]);

    let mut buf = Vec::new();
    encode_property(&state, &mut buf).unwrap();
    let record = decode_property(&mut Cursor::new(buf)).unwrap();

    assert_eq!(record.name, qname("greeting"));
    assert_eq!(record.property_type, PropertyType::String);
    assert_eq!(
        record.values,
        Some(vec![InternalValue::from("Hello"), InternalValue::from("World")])
    );
}

#[test]
fn records_are_read_back_to_back_from_one_stream() {
    let first = persistent_string_property("a", &["1"]);
    let second = binary_property(&[b"\x00\xff".to_vec()]);
    second.set_values(None);

    let mut buf = Vec::new();
    encode_property(&first, &mut buf).unwrap();
    encode_property(&second, &mut buf).unwrap();

    let mut reader = Cursor::new(buf);
    let a = decode_property(&mut reader).unwrap();
    let b = decode_property(&mut reader).unwrap();
    assert_eq!(a.values, Some(vec![InternalValue::from("1")]));
    assert_eq!(b.property_type, PropertyType::Binary);
    assert!(b.values.is_none());
    assert!(decode_property(&mut reader).is_err());
}

#[test]
fn typed_values_survive() {
    let date = sample_date();
    let state = PropertyState::new_property(qname("typed"), None, Status::New).unwrap();
    state.set_property_type(PropertyType::Date);
    state.set_values(Some(vec![date.clone()]));

    let mut buf = Vec::new();
    encode_property(&state, &mut buf).unwrap();
    let record = decode_property(&mut Cursor::new(buf)).unwrap();
    assert_eq!(record.values, Some(vec![date]));
}

/// A DATE value built through its textual form.
fn sample_date() -> InternalValue {
    InternalValue::value_of("2024-03-01T12:30:45.250+02:00", PropertyType::Date).unwrap()
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "binary_buffer_capacity = 0\n").unwrap();

    let err = StateConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, StateError::Config(_)));
}

#[test]
fn default_config_file_is_written_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    StateConfig::write_default_if_missing(&path).unwrap();
    assert_eq!(StateConfig::from_file(&path).unwrap(), StateConfig::default());

    let custom = StateConfig {
        initial_base_version: "v2.0".to_string(),
        ..StateConfig::default()
    };
    custom.write_to_file(&path).unwrap();
    StateConfig::write_default_if_missing(&path).unwrap();
    assert_eq!(StateConfig::from_file(&path).unwrap(), custom);
}

#[test]
fn untyped_or_mistyped_values_are_refused_before_writing() {
    let factory = StateFactory::default();
    let untyped = factory
        .new_property(qname("t"), None, Status::New)
        .unwrap();
    untyped.set_values(Some(vec![InternalValue::from("Hello")]));

    let mut buf = Vec::new();
    let err = factory.encode(&untyped, &mut buf).unwrap_err();
    assert!(matches!(err, StateError::Encoding { .. }));
    assert!(buf.is_empty());

    untyped.set_property_type(PropertyType::Long);
    assert!(factory.encode(&untyped, &mut buf).is_err());
    assert!(buf.is_empty());

    untyped.set_property_type(PropertyType::String);
    factory.encode(&untyped, &mut buf).unwrap();
    let record = factory.decode(&mut Cursor::new(buf)).unwrap();
    assert_eq!(record.values, Some(vec![InternalValue::from("Hello")]));
}
