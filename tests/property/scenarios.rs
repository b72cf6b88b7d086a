//! Session Scenarios
//!
//! A session creates, copies, and loses race against other sessions on
//! property states, the way the persistent-state manager drives them.

use crate::common::*;
use itemstate::{
    InternalValue, ItemId, NodeId, Observable, PropDefId, PropertyId, PropertyType, StateEvent,
    StateFactory, Status,
};
use std::sync::Arc;

#[test]
fn new_title_property_is_transient_without_overlay() {
    init_tracing();
    let factory = StateFactory::default();
    let root = NodeId::new();
    let title = factory
        .new_property(qname("title"), Some(root), Status::New)
        .unwrap();

    assert!(title.is_transient());
    assert!(!title.has_overlayed_state());
    assert!(!title.is_node());
    assert_eq!(title.parent_id(), Some(root));
    assert_eq!(title.property_type(), PropertyType::Undefined);
    assert_eq!(title.values().map(|v| v.len()), Some(0));
    assert_eq!(
        title.id(),
        &ItemId::Property(PropertyId {
            parent: Some(root),
            name: qname("title"),
        })
    );
}

#[test]
fn modified_copy_of_persistent_property() {
    let factory = StateFactory::default();
    let persistent = persistent_string_property("title", &["Hello"]);
    persistent.set_definition_id(Some(PropDefId::new("nt:base/title")));

    let transient = factory
        .overlay_property(&persistent, Status::ExistingModified)
        .unwrap();

    assert!(transient.is_transient());
    assert!(transient.has_overlayed_state());
    assert_eq!(transient.name(), persistent.name());
    assert_eq!(transient.property_type(), PropertyType::String);
    assert_eq!(transient.definition_id(), persistent.definition_id());
    let values = transient.values().unwrap();
    assert_eq!(&values[..], &[InternalValue::from("Hello")]);
    // The copy shares the persistent value sequence until it is replaced.
    assert!(Arc::ptr_eq(&values, &persistent.values().unwrap()));
}

#[test]
fn transient_edits_do_not_reach_persistent_state() {
    let factory = StateFactory::default();
    let persistent = persistent_string_property("title", &["Hello"]);
    let transient = factory
        .overlay_property(&persistent, Status::ExistingModified)
        .unwrap();

    transient.set_values(Some(vec![InternalValue::from("Goodbye")]));
    transient.set_property_type(PropertyType::Path);

    assert_eq!(
        &persistent.values().unwrap()[..],
        &[InternalValue::from("Hello")]
    );
    assert_eq!(persistent.property_type(), PropertyType::String);
    assert_eq!(transient.status(), Status::ExistingModified);
}

#[test]
fn another_session_removes_the_property() {
    let factory = StateFactory::default();
    let persistent = persistent_string_property("title", &["Hello"]);
    let mine = factory
        .overlay_property(&persistent, Status::ExistingModified)
        .unwrap();
    let theirs = factory
        .overlay_property(&persistent, Status::ExistingRemoved)
        .unwrap();

    // Their removal is saved: the persistent state is destroyed.
    theirs.dispose();
    persistent.set_status(Status::Undefined);
    persistent.notify_destroyed();

    assert_eq!(mine.status(), Status::StaleDestroyed);
    assert!(mine.is_transient());
    assert_eq!(theirs.status(), Status::Undefined);
}

#[test]
fn session_discards_its_copy() {
    let factory = StateFactory::default();
    let persistent = persistent_string_property("title", &["Hello"]);
    let transient = factory
        .overlay_property(&persistent, Status::ExistingModified)
        .unwrap();
    let item_manager = RecordingListener::new();
    transient.add_listener(item_manager.clone());

    transient.discard();

    assert_eq!(item_manager.events(), vec![StateEvent::Discarded]);
    assert_eq!(transient.status(), Status::Undefined);
    // Discarding a copy says nothing to the persistent state.
    assert_eq!(persistent.status(), Status::Existing);

    transient.dispose();
    assert_eq!(persistent.listener_count(), 0);
}

#[test]
fn absent_and_empty_values_are_distinct() {
    let state = persistent_string_property("multi", &[]);
    assert_eq!(state.values().map(|v| v.len()), Some(0));

    state.set_values(None);
    assert!(state.values().is_none());
}
