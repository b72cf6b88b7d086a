//! Overlay Staleness Tests
//!
//! An overlay reflects what happens to the state it copies:
//! - target modified  -> STALE_MODIFIED
//! - target destroyed -> STALE_DESTROYED
//! - other events leave the overlay untouched

use crate::common::*;
use itemstate::{Observable, PropertyState, StateEvent, Status};

#[test]
fn target_destroyed_makes_overlay_stale_destroyed() {
    init_tracing();
    let target = persistent_string_property("p", &["v"]);
    let overlay = PropertyState::overlay(&target, Status::ExistingRemoved).unwrap();

    target.notify_destroyed();
    assert_eq!(overlay.status(), Status::StaleDestroyed);
    assert!(overlay.is_transient());
}

#[test]
fn target_modified_makes_overlay_stale_modified() {
    let target = persistent_string_property("p", &["v"]);
    let overlay = PropertyState::overlay(&target, Status::ExistingModified).unwrap();

    target.notify_modified();
    assert_eq!(overlay.status(), Status::StaleModified);
}

#[test]
fn later_events_overwrite_earlier_staleness() {
    let target = persistent_string_property("p", &["v"]);
    let overlay = PropertyState::overlay(&target, Status::ExistingModified).unwrap();

    target.notify_modified();
    target.notify_destroyed();
    assert_eq!(overlay.status(), Status::StaleDestroyed);
}

#[test]
fn created_and_discarded_do_not_affect_overlay() {
    let target = persistent_string_property("p", &["v"]);
    let overlay = PropertyState::overlay(&target, Status::ExistingModified).unwrap();

    target.notify_created();
    target.discard();
    assert_eq!(target.status(), Status::Undefined);
    assert_eq!(overlay.status(), Status::ExistingModified);
}

#[test]
fn every_overlay_of_a_target_goes_stale() {
    let target = persistent_string_property("p", &["v"]);
    let overlays: Vec<_> = (0..8)
        .map(|i| {
            let status = if i % 2 == 0 {
                Status::ExistingModified
            } else {
                Status::ExistingRemoved
            };
            PropertyState::overlay(&target, status).unwrap()
        })
        .collect();

    target.notify_modified();
    assert!(overlays
        .iter()
        .all(|overlay| overlay.status() == Status::StaleModified));
}

#[test]
fn overlay_listeners_are_not_told_about_staleness() {
    let target = persistent_string_property("p", &["v"]);
    let overlay = PropertyState::overlay(&target, Status::ExistingModified).unwrap();
    let listener = RecordingListener::new();
    overlay.add_listener(listener.clone());

    target.notify_modified();
    assert_eq!(overlay.status(), Status::StaleModified);
    assert!(listener.events().is_empty());

    overlay.discard();
    assert_eq!(listener.events(), vec![StateEvent::Discarded]);
    assert_eq!(listener.observed_statuses(), vec![Status::StaleModified]);
}

#[test]
fn disposed_overlay_ignores_target_events() {
    let target = persistent_string_property("p", &["v"]);
    let overlay = PropertyState::overlay(&target, Status::ExistingModified).unwrap();

    overlay.dispose();
    target.notify_destroyed();
    assert_eq!(overlay.status(), Status::Undefined);
    assert!(!overlay.has_overlayed_state());
}
