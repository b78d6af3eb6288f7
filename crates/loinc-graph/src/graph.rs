//! The typed multigraph.
//!
//! Nodes live in an arena indexed by their canonical identifier string;
//! edges are adjacency lists of `(target, kind, properties)` records on the
//! source node. A node's identifier is a pure function of `(type, code)`, so
//! independent loaders referencing the same domain code converge on the same
//! node without any allocation step, and identity is stable across process
//! restarts and graph reloads.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use loinc_types::{EdgeKey, NodeKey, PropKey};

use crate::error::{GraphError, GraphResult};
use crate::schema::Schema;
use crate::view::{NodeMut, NodeView};

/// Opaque handle to a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

/// Opaque handle to one outgoing edge of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId {
    pub(crate) from: NodeId,
    pub(crate) index: usize,
}

/// Marker stored per ingested source in the loaded-sources registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceMarker {
    /// The whole source has been ingested.
    Loaded,
    /// Only the named relation kinds have been ingested from this source.
    Relations(HashSet<EdgeKey>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EdgeRecord {
    pub(crate) kind: EdgeKey,
    pub(crate) target: NodeId,
    pub(crate) properties: HashMap<PropKey, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct NodeRecord {
    pub(crate) id: String,
    pub(crate) kind: NodeKey,
    pub(crate) code: String,
    pub(crate) properties: HashMap<PropKey, String>,
    pub(crate) out_edges: Vec<EdgeRecord>,
}

/// A directed multigraph of typed nodes, owned by one pipeline session.
///
/// All access is routed through the [`Schema`] carried by the graph: node
/// resolution formats identifiers via the node type, and property/edge
/// writes validate (or dynamically register) their keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyGraph {
    schema: Schema,
    nodes: Vec<NodeRecord>,
    ids: HashMap<String, NodeId>,
    loaded_sources: HashMap<String, SourceMarker>,
}

impl OntologyGraph {
    /// Creates an empty graph over the given schema.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            nodes: Vec::new(),
            ids: HashMap::new(),
            loaded_sources: HashMap::new(),
        }
    }

    /// The schema this graph validates against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Mutable access to the schema, for registrations after construction.
    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.out_edges.len()).sum()
    }

    /// Looks up a node by `(type, code)` without creating it.
    pub fn get_node(&self, kind: &NodeKey, code: &str) -> Option<NodeView<'_>> {
        let node_type = self.schema.node_type(kind)?;
        let id = node_type.node_id(code);
        let index = *self.ids.get(&id)?;
        Some(NodeView::new(self, index))
    }

    /// Resolves a node by `(type, code)`, creating it if absent.
    ///
    /// The node identifier is `base_url + code`; repeated calls for the same
    /// pair always return the same handle, which is what makes loading
    /// idempotent at the node level.
    ///
    /// # Errors
    /// Fails if the node type is unknown in a strict schema, or if the code
    /// does not match the type's identifier pattern.
    pub fn getsert_node(&mut self, kind: &NodeKey, code: &str) -> GraphResult<NodeId> {
        let node_type = self.schema.getsert_node_type(kind)?;
        if !node_type.pattern().matches(code) {
            return Err(GraphError::InvalidCode {
                node_type: kind.code().to_string(),
                code: code.to_string(),
            });
        }
        let id = node_type.node_id(code);

        if let Some(&index) = self.ids.get(&id) {
            return Ok(index);
        }
        let index = NodeId(self.nodes.len());
        self.nodes.push(NodeRecord {
            id: id.clone(),
            kind: kind.clone(),
            code: code.to_string(),
            properties: HashMap::new(),
            out_edges: Vec::new(),
        });
        self.ids.insert(id, index);
        Ok(index)
    }

    /// Read view of a node.
    ///
    /// # Panics
    /// Panics if the handle does not belong to this graph.
    pub fn node(&self, id: NodeId) -> NodeView<'_> {
        NodeView::new(self, id)
    }

    /// Write view of a node.
    ///
    /// # Panics
    /// Panics if the handle does not belong to this graph.
    pub fn node_mut(&mut self, id: NodeId) -> NodeMut<'_> {
        NodeMut::new(self, id)
    }

    /// Iterates every node in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeView<'_>> {
        (0..self.nodes.len()).map(move |i| NodeView::new(self, NodeId(i)))
    }

    /// Iterates the nodes of one type, in insertion order.
    pub fn nodes_of(&self, kind: &NodeKey) -> impl Iterator<Item = NodeView<'_>> {
        let kind = kind.clone();
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, record)| record.kind == kind)
            .map(move |(i, _)| NodeView::new(self, NodeId(i)))
    }

    // ── loaded-sources registry ─────────────────────────────────────────

    /// Returns true if a source has been fully ingested.
    pub fn is_source_loaded(&self, key: &str) -> bool {
        matches!(self.loaded_sources.get(key), Some(SourceMarker::Loaded))
    }

    /// Marks a source as fully ingested. Loaders call this only after all
    /// writes for the source succeeded, so a crash mid-load leaves the
    /// source unmarked and a retry redoes the work.
    pub fn mark_source_loaded(&mut self, key: &str) {
        self.loaded_sources
            .insert(key.to_string(), SourceMarker::Loaded);
    }

    /// The relation kinds already ingested from a per-relation source.
    pub fn loaded_relations(&self, key: &str) -> HashSet<EdgeKey> {
        match self.loaded_sources.get(key) {
            Some(SourceMarker::Relations(kinds)) => kinds.clone(),
            _ => HashSet::new(),
        }
    }

    /// Records additional relation kinds as ingested from a source.
    pub fn mark_relations_loaded(
        &mut self,
        key: &str,
        kinds: impl IntoIterator<Item = EdgeKey>,
    ) {
        let marker = self
            .loaded_sources
            .entry(key.to_string())
            .or_insert_with(|| SourceMarker::Relations(HashSet::new()));
        if let SourceMarker::Relations(loaded) = marker {
            loaded.extend(kinds);
        }
    }

    /// The raw loaded-sources registry.
    pub fn loaded_sources(&self) -> &HashMap<String, SourceMarker> {
        &self.loaded_sources
    }

    // ── persistence ─────────────────────────────────────────────────────

    /// Serializes the whole graph (schema, nodes, edges, loaded-sources) to
    /// a writer. The format is opaque; node identifiers are preserved
    /// exactly.
    pub fn to_writer<W: Write>(&self, writer: W) -> GraphResult<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Deserializes a graph previously written by [`OntologyGraph::to_writer`].
    pub fn from_reader<R: Read>(reader: R) -> GraphResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Saves the graph to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> GraphResult<()> {
        let file = File::create(path)?;
        self.to_writer(BufWriter::new(file))
    }

    /// Loads a graph from a file written by [`OntologyGraph::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> GraphResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    // ── record access for views and mutation ────────────────────────────

    pub(crate) fn record(&self, id: NodeId) -> &NodeRecord {
        &self.nodes[id.0]
    }

    pub(crate) fn set_node_property(
        &mut self,
        id: NodeId,
        key: &PropKey,
        value: Option<&str>,
    ) -> GraphResult<()> {
        let kind = self.nodes[id.0].kind.clone();
        self.schema.resolve_property(&kind, key)?;
        match value {
            Some(value) => {
                self.nodes[id.0]
                    .properties
                    .insert(key.clone(), value.to_string());
            }
            // clearing removes the key entirely so that "absent" and
            // "explicitly null" are indistinguishable in storage
            None => {
                self.nodes[id.0].properties.remove(key);
            }
        }
        Ok(())
    }

    pub(crate) fn add_edge_single(
        &mut self,
        from: NodeId,
        kind: &EdgeKey,
        to: NodeId,
        error_if_duplicate: bool,
    ) -> GraphResult<EdgeId> {
        let node_kind = self.nodes[from.0].kind.clone();
        self.schema.resolve_edge_type(&node_kind, kind)?;

        // an exactly-identical edge is a no-op, which keeps per-source
        // retries from accumulating duplicates of multi-valued relations
        if let Some(index) = self.nodes[from.0]
            .out_edges
            .iter()
            .position(|e| &e.kind == kind && e.target == to)
        {
            return Ok(EdgeId { from, index });
        }

        if error_if_duplicate {
            if let Some(existing) = self.nodes[from.0].out_edges.iter().find(|e| &e.kind == kind)
            {
                return Err(GraphError::ConflictingEdge {
                    from: self.nodes[from.0].id.clone(),
                    kind: kind.code().to_string(),
                    existing: self.nodes[existing.target.0].id.clone(),
                    new: self.nodes[to.0].id.clone(),
                });
            }
        }

        self.nodes[from.0].out_edges.push(EdgeRecord {
            kind: kind.clone(),
            target: to,
            properties: HashMap::new(),
        });
        Ok(EdgeId {
            from,
            index: self.nodes[from.0].out_edges.len() - 1,
        })
    }

    pub(crate) fn set_edge_property(
        &mut self,
        edge: EdgeId,
        key: &PropKey,
        value: Option<&str>,
    ) -> GraphResult<()> {
        let node_kind = self.nodes[edge.from.0].kind.clone();
        let edge_kind = self.nodes[edge.from.0].out_edges[edge.index].kind.clone();
        self.schema
            .resolve_edge_property(&node_kind, &edge_kind, key)?;
        let properties = &mut self.nodes[edge.from.0].out_edges[edge.index].properties;
        match value {
            Some(value) => {
                properties.insert(key.clone(), value.to_string());
            }
            None => {
                properties.remove(key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::default_schema;

    fn graph() -> OntologyGraph {
        OntologyGraph::new(default_schema(true).unwrap())
    }

    #[test]
    fn test_identifier_determinism() {
        let mut graph = graph();
        let first = graph.getsert_node(&NodeKey::LoincTerm, "100021-5").unwrap();
        let second = graph.getsert_node(&NodeKey::LoincTerm, "100021-5").unwrap();
        assert_eq!(first, second);
        assert_eq!(graph.node_count(), 1);

        let found = graph.get_node(&NodeKey::LoincTerm, "100021-5").unwrap();
        assert_eq!(found.node_id(), "https://loinc.org/100021-5");
        assert_eq!(found.id(), first);
    }

    #[test]
    fn test_get_node_miss_is_none() {
        let graph = graph();
        assert!(graph.get_node(&NodeKey::LoincTerm, "100021-5").is_none());
    }

    #[test]
    fn test_invalid_code_rejected() {
        let mut graph = graph();
        let err = graph
            .getsert_node(&NodeKey::LoincTerm, "LP14082-9")
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidCode { .. }));
        // the part code is valid for the part type under the same base URL
        graph.getsert_node(&NodeKey::LoincPart, "LP14082-9").unwrap();
    }

    #[test]
    fn test_nodes_of_kind() {
        let mut graph = graph();
        graph.getsert_node(&NodeKey::LoincTerm, "100021-5").unwrap();
        graph.getsert_node(&NodeKey::LoincPart, "LP14082-9").unwrap();
        graph.getsert_node(&NodeKey::LoincTerm, "2345-7").unwrap();

        let terms: Vec<String> = graph
            .nodes_of(&NodeKey::LoincTerm)
            .map(|n| n.code().to_string())
            .collect();
        assert_eq!(terms, vec!["100021-5", "2345-7"]);
    }

    #[test]
    fn test_loaded_sources_markers() {
        let mut graph = graph();
        assert!(!graph.is_source_loaded("LoincTable/Loinc.csv"));
        graph.mark_source_loaded("LoincTable/Loinc.csv");
        assert!(graph.is_source_loaded("LoincTable/Loinc.csv"));
    }

    #[test]
    fn test_relation_markers_accumulate() {
        let mut graph = graph();
        graph.mark_relations_loaded("snomed/relations", [EdgeKey::SnomedIsA]);
        graph.mark_relations_loaded("snomed/relations", [EdgeKey::SnomedComponent]);
        let loaded = graph.loaded_relations("snomed/relations");
        assert!(loaded.contains(&EdgeKey::SnomedIsA));
        assert!(loaded.contains(&EdgeKey::SnomedComponent));
        // a relation-marked source is not "fully loaded"
        assert!(!graph.is_source_loaded("snomed/relations"));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut graph = graph();
        let term = graph.getsert_node(&NodeKey::LoincTerm, "100021-5").unwrap();
        let part = graph.getsert_node(&NodeKey::LoincPart, "LP14082-9").unwrap();
        graph
            .node_mut(term)
            .set_property(&PropKey::LoincNumber, Some("100021-5"))
            .unwrap();
        graph
            .node_mut(term)
            .add_edge_single(&EdgeKey::PrimaryComponent, part, true)
            .unwrap();
        graph.mark_source_loaded("LoincTable/Loinc.csv");

        let mut buffer = Vec::new();
        graph.to_writer(&mut buffer).unwrap();
        let reloaded = OntologyGraph::from_reader(buffer.as_slice()).unwrap();

        assert_eq!(reloaded.node_count(), 2);
        assert_eq!(reloaded.edge_count(), 1);
        assert!(reloaded.is_source_loaded("LoincTable/Loinc.csv"));
        let term = reloaded.get_node(&NodeKey::LoincTerm, "100021-5").unwrap();
        assert_eq!(term.node_id(), "https://loinc.org/100021-5");
        assert_eq!(term.get_property(&PropKey::LoincNumber), Some("100021-5"));
        let targets: Vec<&str> = term
            .get_all_out_edges()
            .map(|e| e.to_node().node_id())
            .collect();
        assert_eq!(targets, vec!["https://loinc.org/LP14082-9"]);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let mut graph = graph();
        graph.getsert_node(&NodeKey::SnomedConcept, "40081010000107").unwrap();
        graph.save(&path).unwrap();

        let reloaded = OntologyGraph::load(&path).unwrap();
        assert!(reloaded
            .get_node(&NodeKey::SnomedConcept, "40081010000107")
            .is_some());
    }
}
