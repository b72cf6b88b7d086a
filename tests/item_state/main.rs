//! Item-State Integration Tests
//!
//! Tests for the state record: construction contracts, the listener fabric,
//! overlay staleness, discard/dispose lifecycle, and concurrent use.

#[path = "../common/mod.rs"]
mod common;

mod concurrent_overlays;
mod staleness;
