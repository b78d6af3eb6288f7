//! Typed multigraph and schema registry for composing the LOINC ontology.
//!
//! This crate provides the in-memory graph the tabular loaders write into:
//! a schema registry describing node, property, and edge types, and a
//! directed multigraph whose node identifiers are deterministic functions of
//! `(node type, domain code)`.
//!
//! # Features
//!
//! - Strict schemas reject unregistered type keys; dynamic schemas register
//!   them on first use
//! - Node resolution is get-or-insert, so loaders may run in any order and
//!   re-run without duplicating nodes
//! - A loaded-sources registry makes whole-source ingestion idempotent
//! - The full graph serializes to JSON and reloads with identities intact
//!
//! # Usage
//!
//! ```
//! use loinc_graph::{default_schema, OntologyGraph};
//! use loinc_types::{NodeKey, PropKey};
//!
//! # fn main() -> Result<(), loinc_graph::GraphError> {
//! let mut graph = OntologyGraph::new(default_schema(true)?);
//! let term = graph.getsert_node(&NodeKey::LoincTerm, "100021-5")?;
//! graph
//!     .node_mut(term)
//!     .set_property(&PropKey::LongCommonName, Some("DTaP Ab panel"))?;
//!
//! let view = graph.get_node(&NodeKey::LoincTerm, "100021-5").unwrap();
//! assert_eq!(view.node_id(), "https://loinc.org/100021-5");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod graph;
mod schema;
mod view;

pub use error::{GraphError, GraphResult, SchemaError};
pub use graph::{EdgeId, NodeId, OntologyGraph, SourceMarker};
pub use schema::{default_schema, CodePattern, EdgeType, NodeType, PropertyType, Schema};
pub use view::{EdgeView, NodeMut, NodeView};
