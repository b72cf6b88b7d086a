//! Construction surface used by the persistent-state manager
//!
//! `StateFactory` applies a [`StateConfig`] to the two construction
//! contracts (fresh and overlay), restores states from persisted records,
//! and encodes states with the configured binary buffer size.

use crate::config::StateConfig;
use itemstate_concurrency::PropertyState;
use itemstate_core::{NodeId, QName, StateResult, Status};
use itemstate_durability::PropertyRecord;
use std::io::{Read, Write};
use std::sync::Arc;
use tracing::debug;

/// Factory for property states
#[derive(Debug, Clone)]
pub struct StateFactory {
    config: Arc<StateConfig>,
}

impl StateFactory {
    /// Create a factory from a validated config
    ///
    /// # Errors
    /// Returns `Config` if the config fails validation.
    pub fn new(config: StateConfig) -> StateResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    /// Fresh property state, stamped with the configured base version
    ///
    /// # Errors
    /// Returns `InvalidStatus` unless `status` is `Existing` or `New`.
    pub fn new_property(
        &self,
        name: QName,
        parent: Option<NodeId>,
        status: Status,
    ) -> StateResult<Arc<PropertyState>> {
        PropertyState::new_property_with_base_version(
            name,
            parent,
            status,
            self.config.initial_base_version.as_str(),
        )
    }

    /// Transient copy-on-write overlay of a persistent property state
    ///
    /// # Errors
    /// - `InvalidStatus` unless `status` is `ExistingModified` or `ExistingRemoved`
    /// - `NestedOverlay` if `target` is itself an overlay
    pub fn overlay_property(
        &self,
        target: &Arc<PropertyState>,
        status: Status,
    ) -> StateResult<Arc<PropertyState>> {
        PropertyState::overlay(target, status)
    }

    /// Rebuild a property state from a decoded record
    ///
    /// # Errors
    /// Returns `InvalidStatus` unless `status` is `Existing` or `New`.
    pub fn restore_property(
        &self,
        record: PropertyRecord,
        parent: Option<NodeId>,
        status: Status,
    ) -> StateResult<Arc<PropertyState>> {
        let state = self.new_property(record.name, parent, status)?;
        state.set_property_type(record.property_type);
        state.set_values(record.values);
        debug!(target: "itemstate::factory", item = %state.id(), "Restored property state");
        Ok(state)
    }

    /// Encode the persisted fields of `state`
    pub fn encode<W: Write>(&self, state: &PropertyState, writer: &mut W) -> StateResult<()> {
        PropertyRecord::from_state(state)
            .encode_with_capacity(writer, self.config.binary_buffer_capacity)
    }

    /// Decode a persisted property record
    pub fn decode<R: Read>(&self, reader: &mut R) -> StateResult<PropertyRecord> {
        PropertyRecord::decode(reader)
    }
}

impl Default for StateFactory {
    fn default() -> Self {
        Self {
            config: Arc::new(StateConfig::default()),
        }
    }
}
