//! Identity types for repository items
//!
//! This module defines:
//! - NodeId: UUID of a node
//! - QName: Namespace-qualified item name
//! - PropertyId: Identity of a property (parent node + name)
//! - ItemId: Identity of any item (node or property)
//! - PropDefId: Reference to an applicable property definition

use crate::error::{StateError, StateResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a node
///
/// A NodeId wraps a UUID v4. Properties reference their owning node through
/// it, and REFERENCE values point at nodes by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new random NodeId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a NodeId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a NodeId from a string representation
    ///
    /// Accepts standard UUID format (with or without hyphens).
    ///
    /// # Errors
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Get the raw bytes of this NodeId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Namespace-qualified name
///
/// Rendered as `{namespace-uri}local-name`. An empty namespace renders as
/// `{}local-name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QName {
    namespace_uri: String,
    local_name: String,
}

impl QName {
    /// Create a qualified name
    ///
    /// # Errors
    /// Returns `InvalidName` if the local name is empty or contains a brace.
    pub fn new(namespace_uri: impl Into<String>, local_name: impl Into<String>) -> StateResult<Self> {
        let namespace_uri = namespace_uri.into();
        let local_name = local_name.into();
        if local_name.is_empty() {
            return Err(StateError::InvalidName("empty local name".to_string()));
        }
        if local_name.contains(['{', '}']) || namespace_uri.contains(['{', '}']) {
            return Err(StateError::InvalidName(format!(
                "{{{}}}{}",
                namespace_uri, local_name
            )));
        }
        Ok(Self {
            namespace_uri,
            local_name,
        })
    }

    /// Name in the default (empty) namespace
    pub fn local(local_name: impl Into<String>) -> StateResult<Self> {
        Self::new("", local_name)
    }

    /// Namespace URI
    pub fn namespace_uri(&self) -> &str {
        &self.namespace_uri
    }

    /// Local part
    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace_uri, self.local_name)
    }
}

impl FromStr for QName {
    type Err = StateError;

    /// Parse `{uri}local`; a string without a leading brace is a local name
    fn from_str(s: &str) -> StateResult<Self> {
        match s.strip_prefix('{') {
            Some(rest) => {
                let (uri, local) = rest
                    .split_once('}')
                    .ok_or_else(|| StateError::InvalidName(s.to_string()))?;
                QName::new(uri, local)
            }
            None => QName::local(s),
        }
    }
}

/// Identity of a property: owning node plus property name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId {
    /// Owning node, `None` for a free-floating property
    pub parent: Option<NodeId>,
    /// Property name
    pub name: QName,
}

impl PropertyId {
    /// Create a property id
    pub fn new(parent: Option<NodeId>, name: QName) -> Self {
        Self { parent, name }
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{}/{}", parent, self.name),
            None => write!(f, "/{}", self.name),
        }
    }
}

/// Identity of any repository item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemId {
    /// A node, identified by UUID
    Node(NodeId),
    /// A property, identified by parent and name
    Property(PropertyId),
}

impl ItemId {
    /// Whether this identifies a node
    pub fn denotes_node(&self) -> bool {
        matches!(self, ItemId::Node(_))
    }
}

impl From<NodeId> for ItemId {
    fn from(id: NodeId) -> Self {
        ItemId::Node(id)
    }
}

impl From<PropertyId> for ItemId {
    fn from(id: PropertyId) -> Self {
        ItemId::Property(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Node(id) => write!(f, "node:{}", id),
            ItemId::Property(id) => write!(f, "property:{}", id),
        }
    }
}

/// Reference to the property definition applicable to a property state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropDefId(String);

impl PropDefId {
    /// Wrap a definition identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropDefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
