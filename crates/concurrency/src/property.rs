//! Property variant of the item state
//!
//! A property state carries a name, a type code, an optional definition
//! reference, and its values. The value sequence is replaced as a whole and
//! shared by reference: an overlay copy points at the same sequence as its
//! target until one side replaces it.
//!
//! `None` values (absent) and an empty sequence are distinct states.

use crate::item_state::{ItemState, ItemVariant};
use itemstate_core::{
    InternalValue, ItemId, NodeId, PropDefId, PropertyId, PropertyType, QName, StateResult, Status,
    DEFAULT_BASE_VERSION,
};
use std::sync::Arc;

/// Shared, immutable value sequence
pub type Values = Arc<[InternalValue]>;

/// Property-specific payload
#[derive(Debug, Clone)]
pub struct PropertyData {
    name: QName,
    property_type: PropertyType,
    definition: Option<PropDefId>,
    values: Option<Values>,
}

impl PropertyData {
    /// Payload for a new property: undefined type, no definition, no values
    pub fn new(name: QName) -> Self {
        Self {
            name,
            property_type: PropertyType::Undefined,
            definition: None,
            values: Some(Arc::from(Vec::new())),
        }
    }
}

impl ItemVariant for PropertyData {
    const IS_NODE: bool = false;

    fn overlay_copy(&self) -> Self {
        // Arc clone: values are shared with the target, not duplicated.
        self.clone()
    }
}

/// State of a repository property
pub type PropertyState = ItemState<PropertyData>;

impl ItemState<PropertyData> {
    /// Construct a fresh property state under `parent`
    ///
    /// The identifier is derived from the parent and the name.
    ///
    /// # Errors
    /// Returns `InvalidStatus` unless `status` is `Existing` or `New`.
    pub fn new_property(
        name: QName,
        parent: Option<NodeId>,
        status: Status,
    ) -> StateResult<Arc<Self>> {
        Self::new_property_with_base_version(name, parent, status, DEFAULT_BASE_VERSION)
    }

    /// Construct a fresh property state with an explicit initial base version
    ///
    /// # Errors
    /// Returns `InvalidStatus` unless `status` is `Existing` or `New`.
    pub fn new_property_with_base_version(
        name: QName,
        parent: Option<NodeId>,
        status: Status,
        base_version: impl Into<String>,
    ) -> StateResult<Arc<Self>> {
        let id = ItemId::Property(PropertyId::new(parent, name.clone()));
        Self::fresh_with_base_version(id, parent, status, base_version, PropertyData::new(name))
    }

    /// Property name
    pub fn name(&self) -> QName {
        self.data().name.clone()
    }

    /// Property type code
    pub fn property_type(&self) -> PropertyType {
        self.data().property_type
    }

    /// Set the property type code
    pub fn set_property_type(&self, property_type: PropertyType) {
        self.data_mut().property_type = property_type;
    }

    /// Applicable property definition
    pub fn definition_id(&self) -> Option<PropDefId> {
        self.data().definition.clone()
    }

    /// Set the applicable property definition
    pub fn set_definition_id(&self, definition: Option<PropDefId>) {
        self.data_mut().definition = definition;
    }

    /// Current values; `None` when absent
    pub fn values(&self) -> Option<Values> {
        self.data().values.clone()
    }

    /// Replace the whole value sequence
    pub fn set_values(&self, values: Option<Vec<InternalValue>>) {
        self.data_mut().values = values.map(Arc::from);
    }

    /// Replace the value sequence with an already shared one
    pub fn set_shared_values(&self, values: Option<Values>) {
        self.data_mut().values = values;
    }
}
