//! Read and write views over graph nodes and edges.
//!
//! [`NodeView`] is a cheap copyable handle borrowing the graph immutably;
//! [`NodeMut`] borrows it mutably and routes every write through the schema.
//! Loaders hold a `NodeMut` for the row they are ingesting and chain property
//! writes on it.

use loinc_types::{EdgeKey, NodeKey, PropKey};

use crate::error::GraphResult;
use crate::graph::{EdgeId, NodeId, OntologyGraph};

/// Immutable view of one node.
#[derive(Clone, Copy)]
pub struct NodeView<'g> {
    graph: &'g OntologyGraph,
    id: NodeId,
}

impl<'g> NodeView<'g> {
    pub(crate) fn new(graph: &'g OntologyGraph, id: NodeId) -> Self {
        Self { graph, id }
    }

    /// The arena handle of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The canonical identifier string (`base_url + code`).
    pub fn node_id(&self) -> &'g str {
        &self.graph.record(self.id).id
    }

    /// The node's type key.
    pub fn kind(&self) -> &'g NodeKey {
        &self.graph.record(self.id).kind
    }

    /// The domain code this node was created from.
    pub fn code(&self) -> &'g str {
        &self.graph.record(self.id).code
    }

    /// A property value, or `None` if the slot is unset.
    pub fn get_property(&self, key: &PropKey) -> Option<&'g str> {
        self.graph
            .record(self.id)
            .properties
            .get(key)
            .map(String::as_str)
    }

    /// All outgoing edges, in insertion order.
    pub fn get_all_out_edges(&self) -> impl Iterator<Item = EdgeView<'g>> {
        let graph = self.graph;
        let from = self.id;
        (0..graph.record(from).out_edges.len())
            .map(move |index| EdgeView::new(graph, EdgeId { from, index }))
    }

    /// Outgoing edges whose kind is in `kinds`, in insertion order.
    pub fn get_out_edges(&self, kinds: &[EdgeKey]) -> Vec<EdgeView<'g>> {
        let kinds = kinds.to_vec();
        self.get_all_out_edges()
            .filter(|edge| kinds.contains(edge.kind()))
            .collect()
    }
}

/// Immutable view of one outgoing edge.
#[derive(Clone, Copy)]
pub struct EdgeView<'g> {
    graph: &'g OntologyGraph,
    id: EdgeId,
}

impl<'g> EdgeView<'g> {
    pub(crate) fn new(graph: &'g OntologyGraph, id: EdgeId) -> Self {
        Self { graph, id }
    }

    /// The edge's kind key.
    pub fn kind(&self) -> &'g EdgeKey {
        &self.graph.record(self.id.from).out_edges[self.id.index].kind
    }

    /// The node this edge starts at.
    pub fn from_node(&self) -> NodeView<'g> {
        NodeView::new(self.graph, self.id.from)
    }

    /// The node this edge points at.
    pub fn to_node(&self) -> NodeView<'g> {
        let target = self.graph.record(self.id.from).out_edges[self.id.index].target;
        NodeView::new(self.graph, target)
    }

    /// An edge property value, or `None` if the slot is unset.
    pub fn get_property(&self, key: &PropKey) -> Option<&'g str> {
        self.graph.record(self.id.from).out_edges[self.id.index]
            .properties
            .get(key)
            .map(String::as_str)
    }
}

/// Mutable view of one node.
pub struct NodeMut<'g> {
    graph: &'g mut OntologyGraph,
    id: NodeId,
}

impl<'g> NodeMut<'g> {
    pub(crate) fn new(graph: &'g mut OntologyGraph, id: NodeId) -> Self {
        Self { graph, id }
    }

    /// The arena handle of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Sets or clears a property. `Some(value)` overwrites; `None` removes
    /// the slot entirely.
    ///
    /// # Errors
    /// Fails if the property key is unknown and the node type is strict.
    pub fn set_property(&mut self, key: &PropKey, value: Option<&str>) -> GraphResult<&mut Self> {
        self.graph.set_node_property(self.id, key, value)?;
        Ok(self)
    }

    /// Adds an outgoing edge.
    ///
    /// An edge identical in kind and target to an existing one is a no-op
    /// returning the existing handle. With `error_if_duplicate`, an edge of
    /// the same kind toward a different target is a conflict.
    ///
    /// # Errors
    /// Fails on an unknown edge kind in a strict schema, or on a conflicting
    /// target for a single-valued kind.
    pub fn add_edge_single(
        &mut self,
        kind: &EdgeKey,
        to: NodeId,
        error_if_duplicate: bool,
    ) -> GraphResult<EdgeId> {
        self.graph.add_edge_single(self.id, kind, to, error_if_duplicate)
    }

    /// Sets or clears a property on an edge previously returned by
    /// [`NodeMut::add_edge_single`].
    ///
    /// # Errors
    /// Fails if the property key is unknown on the edge type and the node
    /// type is strict.
    pub fn set_edge_property(
        &mut self,
        edge: EdgeId,
        key: &PropKey,
        value: Option<&str>,
    ) -> GraphResult<&mut Self> {
        self.graph.set_edge_property(edge, key, value)?;
        Ok(self)
    }
}
