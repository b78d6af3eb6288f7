//! Entity projection.
//!
//! A [`Module`] is a named, serializable snapshot of graph content shaped
//! for downstream ontology emitters: flat entities keyed by code, with edge
//! targets flattened to node identifier URLs. Building one is a sequence of
//! explicit steps (instantiate, label, annotate) so callers can project
//! exactly as much as a given output needs.

use std::collections::BTreeMap;

use serde::Serialize;

use loinc_graph::{NodeView, OntologyGraph};
use loinc_types::{EdgeKey, NodeKey, PropKey};

/// Projected LOINC term.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoincTermEntity {
    /// Node identifier URL.
    pub id: String,
    /// Display label, `LT`-prefixed.
    pub label: Option<String>,
    /// Term code.
    pub loinc_number: Option<String>,
    /// Long common name.
    pub long_common_name: Option<String>,
    /// Term status.
    pub status: Option<String>,
    /// LOINC class.
    pub class: Option<String>,
    /// Primary component part, as a node identifier URL.
    pub primary_component: Option<String>,
    /// Primary property part.
    pub primary_property: Option<String>,
    /// Primary time part.
    pub primary_time: Option<String>,
    /// Primary system part.
    pub primary_system: Option<String>,
    /// Primary scale part.
    pub primary_scale: Option<String>,
    /// Primary method part.
    pub primary_method: Option<String>,
}

/// Projected LOINC part.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoincPartEntity {
    /// Node identifier URL.
    pub id: String,
    /// Display label, `LP`-prefixed.
    pub label: Option<String>,
    /// Part code.
    pub part_number: Option<String>,
    /// Canonical part name.
    pub part_name: Option<String>,
    /// Axis the part belongs to.
    pub part_type_name: Option<String>,
    /// Part status.
    pub status: Option<String>,
    /// Hierarchy parents, as node identifier URLs.
    pub parents: Vec<String>,
}

/// Projected SNOMED concept.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SnomedConceptEntity {
    /// Node identifier URL.
    pub id: String,
    /// Display label, the fully specified name.
    pub label: Option<String>,
    /// Is-a parents, as node identifier URLs.
    pub parents: Vec<String>,
}

/// A named set of projected entities, keyed by domain code.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    name: String,
    terms: BTreeMap<String, LoincTermEntity>,
    parts: BTreeMap<String, LoincPartEntity>,
    concepts: BTreeMap<String, SnomedConceptEntity>,
}

impl Module {
    /// Creates an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            terms: BTreeMap::new(),
            parts: BTreeMap::new(),
            concepts: BTreeMap::new(),
        }
    }

    /// The module's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Projected terms, keyed by code.
    pub fn terms(&self) -> &BTreeMap<String, LoincTermEntity> {
        &self.terms
    }

    /// Projected parts, keyed by code.
    pub fn parts(&self) -> &BTreeMap<String, LoincPartEntity> {
        &self.parts
    }

    /// Projected concepts, keyed by code.
    pub fn concepts(&self) -> &BTreeMap<String, SnomedConceptEntity> {
        &self.concepts
    }

    /// Adds an entity for every term node not yet in the module.
    pub fn instantiate_terms(&mut self, graph: &OntologyGraph) {
        for node in graph.nodes_of(&NodeKey::LoincTerm) {
            self.terms
                .entry(node.code().to_string())
                .or_insert_with(|| LoincTermEntity {
                    id: node.node_id().to_string(),
                    ..Default::default()
                });
        }
    }

    /// Adds an entity for every part node not yet in the module.
    pub fn instantiate_parts(&mut self, graph: &OntologyGraph) {
        for node in graph.nodes_of(&NodeKey::LoincPart) {
            self.parts
                .entry(node.code().to_string())
                .or_insert_with(|| LoincPartEntity {
                    id: node.node_id().to_string(),
                    ..Default::default()
                });
        }
    }

    /// Adds an entity for every concept node not yet in the module.
    pub fn instantiate_concepts(&mut self, graph: &OntologyGraph) {
        for node in graph.nodes_of(&NodeKey::SnomedConcept) {
            self.concepts
                .entry(node.code().to_string())
                .or_insert_with(|| SnomedConceptEntity {
                    id: node.node_id().to_string(),
                    ..Default::default()
                });
        }
    }

    /// Sets display labels on entities whose source node carries the label
    /// property. Terms label from the long common name, parts from the part
    /// name, concepts from the fully specified name.
    pub fn add_labels(&mut self, graph: &OntologyGraph) {
        for (code, entity) in &mut self.terms {
            if let Some(node) = graph.get_node(&NodeKey::LoincTerm, code) {
                if let Some(name) = node.get_property(&PropKey::LongCommonName) {
                    entity.label = Some(format!("LT   {name}"));
                }
            }
        }
        for (code, entity) in &mut self.parts {
            if let Some(node) = graph.get_node(&NodeKey::LoincPart, code) {
                if let Some(name) = node.get_property(&PropKey::PartName) {
                    entity.label = Some(format!("LP   {name}"));
                }
            }
        }
        for (code, entity) in &mut self.concepts {
            if let Some(node) = graph.get_node(&NodeKey::SnomedConcept, code) {
                if let Some(name) = node.get_property(&PropKey::FullySpecifiedName) {
                    entity.label = Some(name.to_string());
                }
            }
        }
    }

    /// Copies term properties and primary model slots onto term entities.
    pub fn annotate_terms(&mut self, graph: &OntologyGraph) {
        for (code, entity) in &mut self.terms {
            let Some(node) = graph.get_node(&NodeKey::LoincTerm, code) else {
                continue;
            };
            entity.loinc_number = owned(node.get_property(&PropKey::LoincNumber));
            entity.long_common_name = owned(node.get_property(&PropKey::LongCommonName));
            entity.status = owned(node.get_property(&PropKey::Status));
            entity.class = owned(node.get_property(&PropKey::Class));
            entity.primary_component = slot(node, EdgeKey::PrimaryComponent);
            entity.primary_property = slot(node, EdgeKey::PrimaryProperty);
            entity.primary_time = slot(node, EdgeKey::PrimaryTime);
            entity.primary_system = slot(node, EdgeKey::PrimarySystem);
            entity.primary_scale = slot(node, EdgeKey::PrimaryScale);
            entity.primary_method = slot(node, EdgeKey::PrimaryMethod);
        }
    }

    /// Copies part properties and hierarchy parents onto part entities.
    pub fn annotate_parts(&mut self, graph: &OntologyGraph) {
        for (code, entity) in &mut self.parts {
            let Some(node) = graph.get_node(&NodeKey::LoincPart, code) else {
                continue;
            };
            entity.part_number = owned(node.get_property(&PropKey::PartNumber));
            entity.part_name = owned(node.get_property(&PropKey::PartName));
            entity.part_type_name = owned(node.get_property(&PropKey::PartTypeName));
            entity.status = owned(node.get_property(&PropKey::Status));
            entity.parents = node
                .get_out_edges(&[EdgeKey::TreeParent])
                .iter()
                .map(|edge| edge.to_node().node_id().to_string())
                .collect();
        }
    }

    /// Copies is-a parents onto concept entities.
    pub fn annotate_concepts(&mut self, graph: &OntologyGraph) {
        for (code, entity) in &mut self.concepts {
            let Some(node) = graph.get_node(&NodeKey::SnomedConcept, code) else {
                continue;
            };
            entity.parents = node
                .get_out_edges(&[EdgeKey::SnomedIsA])
                .iter()
                .map(|edge| edge.to_node().node_id().to_string())
                .collect();
        }
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn slot(node: NodeView<'_>, kind: EdgeKey) -> Option<String> {
    node.get_out_edges(&[kind])
        .first()
        .map(|edge| edge.to_node().node_id().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loinc_graph::default_schema;

    fn populated_graph() -> OntologyGraph {
        let mut graph = OntologyGraph::new(default_schema(true).unwrap());
        let term = graph.getsert_node(&NodeKey::LoincTerm, "100021-5").unwrap();
        let part = graph.getsert_node(&NodeKey::LoincPart, "LP14082-9").unwrap();
        let parent = graph.getsert_node(&NodeKey::LoincPart, "LP31755-9").unwrap();

        graph
            .node_mut(term)
            .set_property(&PropKey::LoincNumber, Some("100021-5"))
            .unwrap()
            .set_property(
                &PropKey::LongCommonName,
                Some("Albumin [Mass/volume] in Serum or Plasma"),
            )
            .unwrap()
            .set_property(&PropKey::Status, Some("ACTIVE"))
            .unwrap();
        graph
            .node_mut(term)
            .add_edge_single(&EdgeKey::PrimaryComponent, part, true)
            .unwrap();

        graph
            .node_mut(part)
            .set_property(&PropKey::PartName, Some("Albumin"))
            .unwrap();
        graph
            .node_mut(part)
            .add_edge_single(&EdgeKey::TreeParent, parent, false)
            .unwrap();
        graph
    }

    #[test]
    fn test_instantiate_is_add_if_absent() {
        let graph = populated_graph();
        let mut module = Module::new("main");
        module.instantiate_terms(&graph);
        module.instantiate_terms(&graph);
        assert_eq!(module.terms().len(), 1);
        assert_eq!(
            module.terms()["100021-5"].id,
            "https://loinc.org/100021-5"
        );
    }

    #[test]
    fn test_labels() {
        let graph = populated_graph();
        let mut module = Module::new("main");
        module.instantiate_terms(&graph);
        module.instantiate_parts(&graph);
        module.add_labels(&graph);

        assert_eq!(
            module.terms()["100021-5"].label.as_deref(),
            Some("LT   Albumin [Mass/volume] in Serum or Plasma")
        );
        assert_eq!(
            module.parts()["LP14082-9"].label.as_deref(),
            Some("LP   Albumin")
        );
        // the parent part has no name property and stays unlabeled
        assert_eq!(module.parts()["LP31755-9"].label, None);
    }

    #[test]
    fn test_annotate_terms_extracts_primary_slots() {
        let graph = populated_graph();
        let mut module = Module::new("main");
        module.instantiate_terms(&graph);
        module.annotate_terms(&graph);

        let term = &module.terms()["100021-5"];
        assert_eq!(term.status.as_deref(), Some("ACTIVE"));
        assert_eq!(
            term.primary_component.as_deref(),
            Some("https://loinc.org/LP14082-9")
        );
        assert_eq!(term.primary_system, None);
    }

    #[test]
    fn test_annotate_parts_collects_parents() {
        let graph = populated_graph();
        let mut module = Module::new("main");
        module.instantiate_parts(&graph);
        module.annotate_parts(&graph);

        let part = &module.parts()["LP14082-9"];
        assert_eq!(part.part_name.as_deref(), Some("Albumin"));
        assert_eq!(part.parents, vec!["https://loinc.org/LP31755-9"]);
    }

    #[test]
    fn test_module_serializes() {
        let graph = populated_graph();
        let mut module = Module::new("main");
        module.instantiate_terms(&graph);
        module.add_labels(&graph);

        let json = serde_json::to_value(&module).unwrap();
        assert_eq!(json["name"], "main");
        assert_eq!(
            json["terms"]["100021-5"]["id"],
            "https://loinc.org/100021-5"
        );
    }
}
