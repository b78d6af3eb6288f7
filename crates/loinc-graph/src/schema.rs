//! Schema registry: node, edge, and property type definitions.
//!
//! A [`Schema`] is built once per pipeline session and shared by every
//! component that needs type information. Registrations accumulate
//! monotonically; nothing is ever removed. In strict mode an unknown key is
//! a contract violation, in dynamic mode it is lazily registered on first
//! use so that a vocabulary release introducing new codes does not crash the
//! pipeline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use loinc_types::{EdgeKey, NodeKey, PropKey};

use crate::error::SchemaError;

/// Namespace used in synthetic base URLs for dynamically-created node types.
const DYNAMIC_TAG_NAMESPACE: &str = "comploinc";

/// Identifier pattern a node type's codes must match.
///
/// LOINC term codes (`NNNNN-N`) and part codes (`LPNNNNN-N`) are disjoint by
/// construction; validating codes against the owning type's pattern turns
/// that implicit invariant into an enforced one, since both types format
/// identifiers under the same base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodePattern {
    /// Digits, a dash, then check digits: `100021-5`.
    LoincTerm,
    /// `LP` prefix followed by the term pattern: `LP14082-9`.
    LoincPart,
    /// An all-digit SNOMED CT identifier.
    SctId,
    /// No constraint; used by dynamically-created node types.
    Any,
}

impl CodePattern {
    /// Returns true if `code` matches this pattern.
    pub fn matches(self, code: &str) -> bool {
        match self {
            Self::LoincTerm => dashed_digits(code),
            Self::LoincPart => code
                .strip_prefix("LP")
                .map_or(false, dashed_digits),
            Self::SctId => !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()),
            Self::Any => true,
        }
    }
}

fn dashed_digits(code: &str) -> bool {
    match code.split_once('-') {
        Some((left, right)) => {
            !left.is_empty()
                && !right.is_empty()
                && left.chars().all(|c| c.is_ascii_digit())
                && right.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Describes one scalar attribute slot on a node or edge type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyType {
    key: PropKey,
    name: String,
    description: Option<String>,
}

impl PropertyType {
    /// Creates a property type.
    pub fn new(key: PropKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            description: None,
        }
    }

    /// Sets the human description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn dynamic(key: PropKey) -> Self {
        let name = key.code().to_string();
        Self {
            key,
            name,
            description: None,
        }
    }

    /// The property key.
    pub fn key(&self) -> &PropKey {
        &self.key
    }

    /// The human name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Describes one category of directed relationship.
///
/// Edge types may own property types of their own (e.g. the code system an
/// edge was asserted in).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeType {
    key: EdgeKey,
    name: String,
    description: Option<String>,
    property_types: HashMap<PropKey, PropertyType>,
}

impl EdgeType {
    /// Creates an edge type.
    pub fn new(key: EdgeKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            description: None,
            property_types: HashMap::new(),
        }
    }

    /// Sets the human description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn dynamic(key: EdgeKey) -> Self {
        let name = key.code().to_string();
        Self {
            key,
            name,
            description: None,
            property_types: HashMap::new(),
        }
    }

    /// The edge key.
    pub fn key(&self) -> &EdgeKey {
        &self.key
    }

    /// The human name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Property types owned by this edge type.
    pub fn property_types(&self) -> &HashMap<PropKey, PropertyType> {
        &self.property_types
    }
}

/// Describes one category of graph entity.
///
/// All nodes of a type share the same identifier template: the node
/// identifier is always `base_url + code`, so resolving the same
/// `(type, code)` pair from independent loaders converges on the same node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeType {
    key: NodeKey,
    name: String,
    description: Option<String>,
    base_url: String,
    pattern: CodePattern,
    strict: bool,
    property_types: HashMap<PropKey, PropertyType>,
    edge_types: HashMap<EdgeKey, EdgeType>,
}

impl NodeType {
    /// Creates a node type. The `strict` flag is inherited from the schema
    /// at registration time.
    pub fn new(
        key: NodeKey,
        name: impl Into<String>,
        base_url: impl Into<String>,
        pattern: CodePattern,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            description: None,
            base_url: base_url.into(),
            pattern,
            strict: false,
            property_types: HashMap::new(),
            edge_types: HashMap::new(),
        }
    }

    /// Sets the human description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn dynamic(key: NodeKey) -> Self {
        let base_url = format!("tag:{DYNAMIC_TAG_NAMESPACE}:node.{}/", key.code());
        let name = key.code().to_string();
        Self {
            key,
            name,
            description: None,
            base_url,
            pattern: CodePattern::Any,
            strict: false,
            property_types: HashMap::new(),
            edge_types: HashMap::new(),
        }
    }

    /// The node key.
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    /// The human name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The identifier base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The code pattern for this type.
    pub fn pattern(&self) -> CodePattern {
        self.pattern
    }

    /// Whether unknown property/edge keys on this type are rejected.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Formats the canonical node identifier for a code.
    pub fn node_id(&self, code: &str) -> String {
        format!("{}{code}", self.base_url)
    }

    /// Extracts the code back out of a node identifier, if it belongs to
    /// this type.
    pub fn code_of<'a>(&self, node_id: &'a str) -> Option<&'a str> {
        node_id
            .strip_prefix(self.base_url.as_str())
            .filter(|code| self.pattern.matches(code))
    }

    /// Property types owned by this node type (including dynamically-cached
    /// ones).
    pub fn property_types(&self) -> &HashMap<PropKey, PropertyType> {
        &self.property_types
    }

    /// Edge types owned by this node type.
    pub fn edge_types(&self) -> &HashMap<EdgeKey, EdgeType> {
        &self.edge_types
    }
}

/// The type registry shared by one pipeline session.
///
/// Property and edge lookup follows a three-tier order: the node type's own
/// map, then the schema-global map, then dynamic creation (non-strict only).
/// Dynamic creation caches the new type in the node type's own map so the
/// next lookup hits tier one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    strict: bool,
    node_types: HashMap<NodeKey, NodeType>,
    global_properties: HashMap<PropKey, PropertyType>,
    global_edge_types: HashMap<EdgeKey, EdgeType>,
}

impl Schema {
    /// Creates an empty schema. Strict schemas reject unknown keys; dynamic
    /// schemas auto-register them on first use.
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            node_types: HashMap::new(),
            global_properties: HashMap::new(),
            global_edge_types: HashMap::new(),
        }
    }

    /// Whether this schema rejects unknown keys.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Registers a node type. The schema's strictness is stamped onto the
    /// type at registration.
    ///
    /// # Errors
    /// Returns [`SchemaError::DuplicateType`] if the key is already
    /// registered.
    pub fn add_node_type(&mut self, mut node_type: NodeType) -> Result<(), SchemaError> {
        if self.node_types.contains_key(&node_type.key) {
            return Err(SchemaError::DuplicateType {
                key: node_type.key.code().to_string(),
            });
        }
        node_type.strict = self.strict;
        self.node_types.insert(node_type.key.clone(), node_type);
        Ok(())
    }

    /// Registers a schema-global property type, shared across node types.
    ///
    /// # Errors
    /// Returns [`SchemaError::DuplicateType`] if the key is already
    /// registered.
    pub fn add_global_property(&mut self, property: PropertyType) -> Result<(), SchemaError> {
        if self.global_properties.contains_key(&property.key) {
            return Err(SchemaError::DuplicateType {
                key: property.key.code().to_string(),
            });
        }
        self.global_properties.insert(property.key.clone(), property);
        Ok(())
    }

    /// Registers a schema-global edge type, shared across node types.
    ///
    /// # Errors
    /// Returns [`SchemaError::DuplicateType`] if the key is already
    /// registered.
    pub fn add_global_edge_type(&mut self, edge_type: EdgeType) -> Result<(), SchemaError> {
        if self.global_edge_types.contains_key(&edge_type.key) {
            return Err(SchemaError::DuplicateType {
                key: edge_type.key.code().to_string(),
            });
        }
        self.global_edge_types
            .insert(edge_type.key.clone(), edge_type);
        Ok(())
    }

    /// Looks up a registered node type.
    pub fn node_type(&self, key: &NodeKey) -> Option<&NodeType> {
        self.node_types.get(key)
    }

    /// Looks up a registered global property type.
    pub fn global_property(&self, key: &PropKey) -> Option<&PropertyType> {
        self.global_properties.get(key)
    }

    /// Looks up a registered global edge type.
    pub fn global_edge_type(&self, key: &EdgeKey) -> Option<&EdgeType> {
        self.global_edge_types.get(key)
    }

    /// Returns the node type for `key`, creating a dynamically-typed one if
    /// absent and the schema is non-strict.
    ///
    /// Dynamic node types get a synthetic `tag:` base URL derived from the
    /// key and accept any code.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownType`] in strict mode when the key is
    /// not registered.
    pub fn getsert_node_type(&mut self, key: &NodeKey) -> Result<&NodeType, SchemaError> {
        if !self.node_types.contains_key(key) {
            if self.strict {
                return Err(SchemaError::UnknownType {
                    key: key.code().to_string(),
                });
            }
            self.node_types
                .insert(key.clone(), NodeType::dynamic(key.clone()));
        }
        self.node_types.get(key).ok_or_else(|| SchemaError::UnknownType {
            key: key.code().to_string(),
        })
    }

    /// Resolves the property type governing `key` on node type `node_kind`.
    ///
    /// Resolution order: type-local, then schema-global, then dynamic
    /// creation cached into the type-local map.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownType`] if the node type is not
    /// registered, or [`SchemaError::UnknownProperty`] in strict mode when
    /// the key is unknown at every tier.
    pub fn resolve_property(
        &mut self,
        node_kind: &NodeKey,
        key: &PropKey,
    ) -> Result<&PropertyType, SchemaError> {
        let strict = match self.node_types.get(node_kind) {
            Some(node_type) => node_type.strict,
            None => {
                return Err(SchemaError::UnknownType {
                    key: node_kind.code().to_string(),
                })
            }
        };

        let local = self
            .node_types
            .get(node_kind)
            .map_or(false, |nt| nt.property_types.contains_key(key));

        if !local {
            if let Some(global) = self.global_properties.get(key) {
                return Ok(global);
            }
            if strict {
                return Err(SchemaError::UnknownProperty {
                    node_type: node_kind.code().to_string(),
                    key: key.code().to_string(),
                });
            }
            if let Some(node_type) = self.node_types.get_mut(node_kind) {
                node_type
                    .property_types
                    .insert(key.clone(), PropertyType::dynamic(key.clone()));
            }
        }

        self.node_types
            .get(node_kind)
            .and_then(|nt| nt.property_types.get(key))
            .ok_or_else(|| SchemaError::UnknownProperty {
                node_type: node_kind.code().to_string(),
                key: key.code().to_string(),
            })
    }

    /// Resolves the edge type governing `key` on node type `node_kind`.
    ///
    /// Same three-tier order as [`Schema::resolve_property`].
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownType`] if the node type is not
    /// registered, or [`SchemaError::UnknownEdge`] in strict mode when the
    /// key is unknown at every tier.
    pub fn resolve_edge_type(
        &mut self,
        node_kind: &NodeKey,
        key: &EdgeKey,
    ) -> Result<&EdgeType, SchemaError> {
        let strict = match self.node_types.get(node_kind) {
            Some(node_type) => node_type.strict,
            None => {
                return Err(SchemaError::UnknownType {
                    key: node_kind.code().to_string(),
                })
            }
        };

        let local = self
            .node_types
            .get(node_kind)
            .map_or(false, |nt| nt.edge_types.contains_key(key));

        if !local {
            if let Some(global) = self.global_edge_types.get(key) {
                return Ok(global);
            }
            if strict {
                return Err(SchemaError::UnknownEdge {
                    node_type: node_kind.code().to_string(),
                    key: key.code().to_string(),
                });
            }
            if let Some(node_type) = self.node_types.get_mut(node_kind) {
                node_type
                    .edge_types
                    .insert(key.clone(), EdgeType::dynamic(key.clone()));
            }
        }

        self.node_types
            .get(node_kind)
            .and_then(|nt| nt.edge_types.get(key))
            .ok_or_else(|| SchemaError::UnknownEdge {
                node_type: node_kind.code().to_string(),
                key: key.code().to_string(),
            })
    }

    /// Resolves the property type governing `key` on an edge of kind
    /// `edge_key` going out of node type `node_kind`.
    ///
    /// The edge type is located first (type-local, then global); its own
    /// property map is consulted, then the schema-global property map, then
    /// dynamic creation cached onto the owning edge type.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownEdge`] if the edge type was never
    /// resolved, or [`SchemaError::UnknownProperty`] in strict mode when the
    /// property key is unknown at every tier.
    pub fn resolve_edge_property(
        &mut self,
        node_kind: &NodeKey,
        edge_key: &EdgeKey,
        key: &PropKey,
    ) -> Result<&PropertyType, SchemaError> {
        let strict = self
            .node_types
            .get(node_kind)
            .map_or(self.strict, |nt| nt.strict);

        let node_local = self
            .node_types
            .get(node_kind)
            .map_or(false, |nt| nt.edge_types.contains_key(edge_key));

        if !node_local && !self.global_edge_types.contains_key(edge_key) {
            return Err(SchemaError::UnknownEdge {
                node_type: node_kind.code().to_string(),
                key: edge_key.code().to_string(),
            });
        }

        let edge_has = if node_local {
            self.node_types
                .get(node_kind)
                .and_then(|nt| nt.edge_types.get(edge_key))
                .map_or(false, |et| et.property_types.contains_key(key))
        } else {
            self.global_edge_types
                .get(edge_key)
                .map_or(false, |et| et.property_types.contains_key(key))
        };

        if !edge_has {
            if let Some(global) = self.global_properties.get(key) {
                return Ok(global);
            }
            if strict {
                return Err(SchemaError::UnknownProperty {
                    node_type: node_kind.code().to_string(),
                    key: key.code().to_string(),
                });
            }
            let property = PropertyType::dynamic(key.clone());
            if node_local {
                if let Some(et) = self
                    .node_types
                    .get_mut(node_kind)
                    .and_then(|nt| nt.edge_types.get_mut(edge_key))
                {
                    et.property_types.insert(key.clone(), property);
                }
            } else if let Some(et) = self.global_edge_types.get_mut(edge_key) {
                et.property_types.insert(key.clone(), property);
            }
        }

        let resolved = if node_local {
            self.node_types
                .get(node_kind)
                .and_then(|nt| nt.edge_types.get(edge_key))
                .and_then(|et| et.property_types.get(key))
        } else {
            self.global_edge_types
                .get(edge_key)
                .and_then(|et| et.property_types.get(key))
        };

        resolved.ok_or_else(|| SchemaError::UnknownProperty {
            node_type: node_kind.code().to_string(),
            key: key.code().to_string(),
        })
    }
}

/// Builds the standard schema for a LOINC/SNOMED composition session.
///
/// Registers the three stable node types plus every statically-known
/// property and edge kind as global types. Loaders for the primary release
/// files run against a strict instance of this schema; exploratory ingestion
/// can pass `strict = false` to absorb codes not yet modeled.
pub fn default_schema(strict: bool) -> Result<Schema, SchemaError> {
    let mut schema = Schema::new(strict);

    schema.add_node_type(
        NodeType::new(
            NodeKey::LoincTerm,
            "LOINC term",
            "https://loinc.org/",
            CodePattern::LoincTerm,
        )
        .with_description("A LOINC observation code"),
    )?;
    schema.add_node_type(
        NodeType::new(
            NodeKey::LoincPart,
            "LOINC part",
            "https://loinc.org/",
            CodePattern::LoincPart,
        )
        .with_description("One axis value of a LOINC term's model"),
    )?;
    schema.add_node_type(
        NodeType::new(
            NodeKey::SnomedConcept,
            "SNOMED CT concept",
            "http://snomed.info/id/",
            CodePattern::SctId,
        )
        .with_description("A concept from a SNOMED CT or LOINC Ontology release"),
    )?;

    for key in PropKey::known() {
        let name = key.code().to_string();
        schema.add_global_property(PropertyType::new(key, name))?;
    }
    for key in EdgeKey::known() {
        let name = key.code().to_string();
        schema.add_global_edge_type(EdgeType::new(key, name))?;
    }

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_patterns() {
        assert!(CodePattern::LoincTerm.matches("100021-5"));
        assert!(!CodePattern::LoincTerm.matches("LP14082-9"));
        assert!(!CodePattern::LoincTerm.matches("100021"));
        assert!(CodePattern::LoincPart.matches("LP14082-9"));
        assert!(!CodePattern::LoincPart.matches("100021-5"));
        assert!(CodePattern::SctId.matches("40081010000107"));
        assert!(!CodePattern::SctId.matches("LP1-1"));
        assert!(CodePattern::Any.matches("anything at all"));
    }

    #[test]
    fn test_node_id_roundtrip() {
        let node_type = NodeType::new(
            NodeKey::LoincTerm,
            "LOINC term",
            "https://loinc.org/",
            CodePattern::LoincTerm,
        );
        let id = node_type.node_id("100021-5");
        assert_eq!(id, "https://loinc.org/100021-5");
        assert_eq!(node_type.code_of(&id), Some("100021-5"));
        assert_eq!(node_type.code_of("https://example.org/100021-5"), None);

        // the extracted code borrows from the identifier, not the type
        let code = {
            let scoped = NodeType::new(
                NodeKey::LoincTerm,
                "LOINC term",
                "https://loinc.org/",
                CodePattern::LoincTerm,
            );
            scoped.code_of(&id)
        };
        assert_eq!(code, Some("100021-5"));
    }

    #[test]
    fn test_duplicate_node_type_rejected() {
        let mut schema = Schema::new(true);
        let make = || {
            NodeType::new(
                NodeKey::LoincTerm,
                "LOINC term",
                "https://loinc.org/",
                CodePattern::LoincTerm,
            )
        };
        schema.add_node_type(make()).unwrap();
        let err = schema.add_node_type(make()).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType { .. }));
    }

    #[test]
    fn test_getsert_node_type_dynamic() {
        let mut schema = Schema::new(false);
        let key = NodeKey::Dynamic("chebi_entity".to_string());
        let node_type = schema.getsert_node_type(&key).unwrap();
        assert_eq!(node_type.base_url(), "tag:comploinc:node.chebi_entity/");
        assert_eq!(node_type.pattern(), CodePattern::Any);
        // second call returns the same registration
        assert!(schema.node_type(&key).is_some());
        schema.getsert_node_type(&key).unwrap();
        assert_eq!(
            schema
                .node_type(&key)
                .map(|nt| nt.base_url().to_string()),
            Some("tag:comploinc:node.chebi_entity/".to_string())
        );
    }

    #[test]
    fn test_getsert_node_type_strict_rejects() {
        let mut schema = Schema::new(true);
        let key = NodeKey::Dynamic("chebi_entity".to_string());
        let err = schema.getsert_node_type(&key).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
    }

    #[test]
    fn test_property_resolution_prefers_global() {
        let mut schema = default_schema(true).unwrap();
        // status is registered globally; a strict lookup succeeds
        let property = schema
            .resolve_property(&NodeKey::LoincTerm, &PropKey::Status)
            .unwrap();
        assert_eq!(property.key(), &PropKey::Status);
        // and did not get cached into the node type's local map
        let node_type = schema.node_type(&NodeKey::LoincTerm).unwrap();
        assert!(!node_type.property_types().contains_key(&PropKey::Status));
    }

    #[test]
    fn test_dynamic_property_cached_locally() {
        let mut schema = default_schema(false).unwrap();
        let key = PropKey::Dynamic("new_column".to_string());
        schema
            .resolve_property(&NodeKey::LoincTerm, &key)
            .unwrap();
        let node_type = schema.node_type(&NodeKey::LoincTerm).unwrap();
        assert!(node_type.property_types().contains_key(&key));

        // a second resolution hits tier one and must not re-create
        let before = node_type.property_types().len();
        schema
            .resolve_property(&NodeKey::LoincTerm, &key)
            .unwrap();
        let after = schema
            .node_type(&NodeKey::LoincTerm)
            .unwrap()
            .property_types()
            .len();
        assert_eq!(before, after);
    }

    #[test]
    fn test_strict_property_resolution_rejects_unknown() {
        let mut schema = default_schema(true).unwrap();
        let key = PropKey::Dynamic("new_column".to_string());
        let err = schema
            .resolve_property(&NodeKey::LoincTerm, &key)
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownProperty { .. }));
        // nothing was registered anywhere
        assert!(schema.global_property(&key).is_none());
        let node_type = schema.node_type(&NodeKey::LoincTerm).unwrap();
        assert!(!node_type.property_types().contains_key(&key));
    }

    #[test]
    fn test_dynamic_edge_type_cached_locally() {
        let mut schema = default_schema(false).unwrap();
        let key = EdgeKey::Dynamic("derived_from".to_string());
        schema
            .resolve_edge_type(&NodeKey::LoincTerm, &key)
            .unwrap();
        let node_type = schema.node_type(&NodeKey::LoincTerm).unwrap();
        assert!(node_type.edge_types().contains_key(&key));
    }

    #[test]
    fn test_edge_property_resolution() {
        let mut schema = default_schema(true).unwrap();
        // part_code_system is globally registered, so a strict edge-property
        // lookup succeeds through tier two
        let property = schema
            .resolve_edge_property(
                &NodeKey::LoincTerm,
                &EdgeKey::PrimaryComponent,
                &PropKey::PartCodeSystem,
            )
            .unwrap();
        assert_eq!(property.key(), &PropKey::PartCodeSystem);
    }

    #[test]
    fn test_default_schema_registers_vocabulary() {
        let schema = default_schema(true).unwrap();
        assert!(schema.node_type(&NodeKey::LoincTerm).is_some());
        assert!(schema.node_type(&NodeKey::LoincPart).is_some());
        assert!(schema.node_type(&NodeKey::SnomedConcept).is_some());
        assert!(schema.global_property(&PropKey::LongCommonName).is_some());
        assert!(schema.global_edge_type(&EdgeKey::TreeParent).is_some());
    }
}
