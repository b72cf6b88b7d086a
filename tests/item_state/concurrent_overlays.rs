//! Concurrent Overlay Tests
//!
//! Multiple sessions copy, watch and release the same persistent state from
//! different threads while it is being modified and destroyed.

use crate::common::*;
use itemstate::{ItemRecord, ItemStateListener, Observable, PropertyState, StateEvent, Status};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const SESSIONS: usize = 8;

#[test]
fn overlays_created_on_many_threads_all_go_stale() {
    init_tracing();
    let target = persistent_string_property("shared", &["v"]);
    let barrier = Arc::new(Barrier::new(SESSIONS));

    let handles: Vec<_> = (0..SESSIONS)
        .map(|_| {
            let target = Arc::clone(&target);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                PropertyState::overlay(&target, Status::ExistingModified).unwrap()
            })
        })
        .collect();
    let overlays: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(target.listener_count(), SESSIONS);
    target.notify_destroyed();
    for overlay in &overlays {
        assert_eq!(overlay.status(), Status::StaleDestroyed);
    }
}

#[test]
fn dispose_racing_with_destroyed_always_ends_undefined() {
    for _ in 0..200 {
        let target = persistent_string_property("shared", &["v"]);
        let overlay = PropertyState::overlay(&target, Status::ExistingModified).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let notifier = {
            let target = Arc::clone(&target);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                target.notify_destroyed();
            })
        };
        let disposer = {
            let overlay = Arc::clone(&overlay);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                overlay.dispose();
            })
        };
        notifier.join().unwrap();
        disposer.join().unwrap();

        assert_eq!(overlay.status(), Status::Undefined);
        assert_eq!(target.listener_count(), 0);
    }
}

#[test]
fn concurrent_discards_deliver_one_pass() {
    for _ in 0..100 {
        let state = persistent_string_property("shared", &["v"]);
        let listener = RecordingListener::new();
        state.add_listener(listener.clone());
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let state = Arc::clone(&state);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    state.discard();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(listener.count(StateEvent::Discarded), 1);
        assert_eq!(state.status(), Status::Undefined);
    }
}

/// Signals entry into `state_discarded`, then stalls the pass.
struct SlowDiscardListener {
    entered: Arc<Barrier>,
}

impl ItemStateListener for SlowDiscardListener {
    fn state_discarded(&self, _discarded: &dyn ItemRecord) {
        self.entered.wait();
        thread::sleep(Duration::from_millis(150));
    }
}

#[test]
fn discard_during_running_pass_returns_only_once_undefined() {
    let state = persistent_string_property("shared", &["v"]);
    let entered = Arc::new(Barrier::new(2));
    let slow = Arc::new(SlowDiscardListener {
        entered: Arc::clone(&entered),
    });
    state.add_listener(slow.clone());
    let recorder = RecordingListener::new();
    state.add_listener(recorder.clone());

    let first = {
        let state = Arc::clone(&state);
        thread::spawn(move || state.discard())
    };

    entered.wait();
    state.discard();
    assert_eq!(state.status(), Status::Undefined);

    first.join().unwrap();
    assert_eq!(recorder.count(StateEvent::Discarded), 1);
}

#[test]
fn registration_churn_during_notification() {
    let state = persistent_string_property("shared", &["v"]);
    let stable = RecordingListener::new();
    state.add_listener(stable.clone());
    let barrier = Arc::new(Barrier::new(3));

    let churn = {
        let state = Arc::clone(&state);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..500 {
                let transient = RecordingListener::new();
                let id = state.add_listener(transient.clone());
                state.remove_listener(id);
            }
        })
    };
    let self_removers = {
        let state = Arc::clone(&state);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            let mut kept = Vec::new();
            for _ in 0..50 {
                let remover = Arc::new(SelfRemovingListener::default());
                state.add_listener(remover.clone());
                kept.push(remover);
            }
            kept
        })
    };

    barrier.wait();
    for _ in 0..100 {
        state.notify_modified();
    }
    churn.join().unwrap();
    let removers = self_removers.join().unwrap();

    assert_eq!(stable.count(StateEvent::Modified), 100);

    state.discard();
    assert_eq!(stable.count(StateEvent::Discarded), 1);
    for remover in &removers {
        assert_eq!(remover.discarded.load(Ordering::SeqCst), 1);
    }
    assert_eq!(state.listener_count(), 1);
}
