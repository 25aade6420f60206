//! Graph nodes and the ontology taxonomy

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Identifier of a node within one graph (e.g. `"a1"`)
///
/// Identifiers are assigned by the extraction step, so they are strings
/// rather than locally generated ULIDs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id, trimming surrounding whitespace
    ///
    /// # Errors
    /// Returns `GraphError::InvalidNodeId` if the id is empty
    pub fn new(id: impl Into<String>) -> Result<Self, GraphError> {
        let raw = id.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GraphError::InvalidNodeId(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeId {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ontological category of a node
///
/// Alignment across domains is only valid between nodes of the same
/// category, independent of their domain-specific labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OntologyCategory {
    /// Physical components or entities (the "what")
    Structure,
    /// Actions, processes or logic (the "how")
    Function,
    /// Performance metrics or abstract qualities (the "cost/value")
    Attribute,
}

impl OntologyCategory {
    /// Every category, in taxonomy order
    pub const ALL: [Self; 3] = [Self::Structure, Self::Function, Self::Attribute];

    /// Canonical upper-case label
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "STRUCTURE",
            Self::Function => "FUNCTION",
            Self::Attribute => "ATTRIBUTE",
        }
    }

    /// Polymorphism rule: two categories are compatible only if identical
    #[inline]
    #[must_use]
    pub fn is_compatible_with(self, other: Self) -> bool {
        self == other
    }
}

impl fmt::Display for OntologyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OntologyCategory {
    type Err = GraphError;

    /// Accepts `STRUCTURE`, `structure` and `[STRUCTURE]` alike
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim().trim_start_matches('[').trim_end_matches(']').trim();
        match cleaned.to_ascii_uppercase().as_str() {
            "STRUCTURE" => Ok(Self::Structure),
            "FUNCTION" => Ok(Self::Function),
            "ATTRIBUTE" => Ok(Self::Attribute),
            _ => Err(GraphError::UnknownCategory(s.to_string())),
        }
    }
}

/// Single node in a logical property graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicNode {
    /// Identifier, unique within its graph
    pub id: NodeId,
    /// Human-readable label
    pub label: String,
    /// Ontological category
    pub category: OntologyCategory,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Optional metadata
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl LogicNode {
    /// Create node with empty description
    #[inline]
    #[must_use]
    pub fn new(id: NodeId, label: impl Into<String>, category: OntologyCategory) -> Self {
        Self {
            id,
            label: label.into(),
            category,
            description: String::new(),
            properties: serde_json::Map::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With a metadata entry
    #[inline]
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}
