//! Loaders for SNOMED release files.
//!
//! Two sources feed the graph: the LOINC-SNOMED Ontology module (tab
//! separated description, identifier, and relationship files) and the
//! international SNOMED relationship file, from which only selected relation
//! kinds are ingested.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use loinc_graph::OntologyGraph;
use loinc_types::well_known::snomed_relation;
use loinc_types::{EdgeKey, NodeKey, PropKey};

use crate::error::LoadResult;
use crate::sources::{
    LOINC_SNOMED_DESCRIPTION_KEY, LOINC_SNOMED_IDENTIFIER_KEY, LOINC_SNOMED_RELATIONSHIP_KEY,
    SNOMED_RELATIONS_KEY,
};
use crate::table::{field, TableRecord, TableReader};

/// Description type SCTID of fully specified names.
const FULLY_SPECIFIED_NAME_TYPE: &str = "900000000000003001";

/// One row of a description file.
#[derive(Debug, Clone)]
pub struct DescriptionRow {
    /// Description SCTID.
    pub id: String,
    /// Release date the row took effect.
    pub effective_time: String,
    /// `"1"` if the row is active.
    pub active: String,
    /// Module SCTID.
    pub module_id: String,
    /// Concept the description names.
    pub concept_id: String,
    /// Language code.
    pub language_code: String,
    /// Description type SCTID.
    pub type_id: String,
    /// The description text itself.
    pub term: String,
    /// Case significance SCTID.
    pub case_significance_id: String,
}

impl TableRecord for DescriptionRow {
    const COLUMNS: usize = 10;
    const DELIMITER: u8 = b'\t';

    fn from_record(record: &StringRecord) -> Self {
        Self {
            id: field(record, 1),
            effective_time: field(record, 2),
            active: field(record, 3),
            module_id: field(record, 4),
            concept_id: field(record, 5),
            language_code: field(record, 6),
            type_id: field(record, 7),
            term: field(record, 8),
            case_significance_id: field(record, 9),
        }
    }
}

/// One row of the alternate-identifier file mapping LOINC codes to concepts.
#[derive(Debug, Clone)]
pub struct IdentifierRow {
    /// The foreign identifier, a LOINC term code here.
    pub alternate_identifier: String,
    /// Release date the row took effect.
    pub effective_time: String,
    /// `"1"` if the row is active.
    pub active: String,
    /// Module SCTID.
    pub module_id: String,
    /// Identifier scheme SCTID.
    pub identifier_scheme_id: String,
    /// Concept the identifier maps to.
    pub referenced_component_id: String,
}

impl TableRecord for IdentifierRow {
    const COLUMNS: usize = 7;
    const DELIMITER: u8 = b'\t';

    fn from_record(record: &StringRecord) -> Self {
        Self {
            alternate_identifier: field(record, 1),
            effective_time: field(record, 2),
            active: field(record, 3),
            module_id: field(record, 4),
            identifier_scheme_id: field(record, 5),
            referenced_component_id: field(record, 6),
        }
    }
}

/// One row of a relationship file.
#[derive(Debug, Clone)]
pub struct RelationshipRow {
    /// Relationship SCTID.
    pub id: String,
    /// Release date the row took effect.
    pub effective_time: String,
    /// `"1"` if the row is active.
    pub active: String,
    /// Module SCTID.
    pub module_id: String,
    /// Source concept SCTID.
    pub source_id: String,
    /// Destination concept SCTID.
    pub destination_id: String,
    /// Relationship group number.
    pub relationship_group: String,
    /// Relationship type SCTID.
    pub type_id: String,
    /// Characteristic type SCTID.
    pub characteristic_type_id: String,
    /// Modifier SCTID.
    pub modifier_id: String,
}

impl TableRecord for RelationshipRow {
    const COLUMNS: usize = 11;
    const DELIMITER: u8 = b'\t';

    fn from_record(record: &StringRecord) -> Self {
        Self {
            id: field(record, 1),
            effective_time: field(record, 2),
            active: field(record, 3),
            module_id: field(record, 4),
            source_id: field(record, 5),
            destination_id: field(record, 6),
            relationship_group: field(record, 7),
            type_id: field(record, 8),
            characteristic_type_id: field(record, 9),
            modifier_id: field(record, 10),
        }
    }
}

fn is_active(row_active: &str) -> bool {
    row_active == "1"
}

/// Loader for the LOINC-SNOMED Ontology module files.
pub struct LoincSnomedLoader<'g> {
    graph: &'g mut OntologyGraph,
}

impl<'g> LoincSnomedLoader<'g> {
    /// Creates a loader over the graph.
    pub fn new(graph: &'g mut OntologyGraph) -> Self {
        Self { graph }
    }

    /// Loads fully specified names from a description file.
    pub fn load_description<P: AsRef<Path>>(&mut self, path: P) -> LoadResult<usize> {
        if self.graph.is_source_loaded(LOINC_SNOMED_DESCRIPTION_KEY) {
            return Ok(0);
        }
        let reader = TableReader::from_path(path)?;
        self.load_description_rows(reader)
    }

    /// Loads description rows from an in-memory source.
    pub fn load_description_from<R: Read>(&mut self, reader: R) -> LoadResult<usize> {
        if self.graph.is_source_loaded(LOINC_SNOMED_DESCRIPTION_KEY) {
            return Ok(0);
        }
        self.load_description_rows(TableReader::from_reader(reader)?)
    }

    fn load_description_rows<R: Read>(
        &mut self,
        reader: TableReader<R, DescriptionRow>,
    ) -> LoadResult<usize> {
        let mut rows = 0;
        for row in reader {
            let row = row?;
            rows += 1;
            if !is_active(&row.active) || row.type_id != FULLY_SPECIFIED_NAME_TYPE {
                continue;
            }
            let concept = self
                .graph
                .getsert_node(&NodeKey::SnomedConcept, &row.concept_id)?;
            self.graph
                .node_mut(concept)
                .set_property(&PropKey::FullySpecifiedName, Some(&row.term))?;
        }
        self.graph.mark_source_loaded(LOINC_SNOMED_DESCRIPTION_KEY);
        info!(source = LOINC_SNOMED_DESCRIPTION_KEY, rows, "source loaded");
        Ok(rows)
    }

    /// Loads LOINC-to-concept mappings from the alternate-identifier file.
    pub fn load_identifier<P: AsRef<Path>>(&mut self, path: P) -> LoadResult<usize> {
        if self.graph.is_source_loaded(LOINC_SNOMED_IDENTIFIER_KEY) {
            return Ok(0);
        }
        let reader = TableReader::from_path(path)?;
        self.load_identifier_rows(reader)
    }

    /// Loads identifier rows from an in-memory source.
    pub fn load_identifier_from<R: Read>(&mut self, reader: R) -> LoadResult<usize> {
        if self.graph.is_source_loaded(LOINC_SNOMED_IDENTIFIER_KEY) {
            return Ok(0);
        }
        self.load_identifier_rows(TableReader::from_reader(reader)?)
    }

    fn load_identifier_rows<R: Read>(
        &mut self,
        reader: TableReader<R, IdentifierRow>,
    ) -> LoadResult<usize> {
        let mut rows = 0;
        for row in reader {
            let row = row?;
            rows += 1;
            if !is_active(&row.active) {
                continue;
            }
            let term = self
                .graph
                .getsert_node(&NodeKey::LoincTerm, &row.alternate_identifier)?;
            let concept = self
                .graph
                .getsert_node(&NodeKey::SnomedConcept, &row.referenced_component_id)?;
            self.graph
                .node_mut(term)
                .add_edge_single(&EdgeKey::MapsTo, concept, false)?;
        }
        self.graph.mark_source_loaded(LOINC_SNOMED_IDENTIFIER_KEY);
        info!(source = LOINC_SNOMED_IDENTIFIER_KEY, rows, "source loaded");
        Ok(rows)
    }

    /// Loads concept relationships from the module's relationship file.
    pub fn load_relationship<P: AsRef<Path>>(&mut self, path: P) -> LoadResult<usize> {
        if self.graph.is_source_loaded(LOINC_SNOMED_RELATIONSHIP_KEY) {
            return Ok(0);
        }
        let reader = TableReader::from_path(path)?;
        self.load_relationship_rows(reader)
    }

    /// Loads relationship rows from an in-memory source.
    pub fn load_relationship_from<R: Read>(&mut self, reader: R) -> LoadResult<usize> {
        if self.graph.is_source_loaded(LOINC_SNOMED_RELATIONSHIP_KEY) {
            return Ok(0);
        }
        self.load_relationship_rows(TableReader::from_reader(reader)?)
    }

    fn load_relationship_rows<R: Read>(
        &mut self,
        reader: TableReader<R, RelationshipRow>,
    ) -> LoadResult<usize> {
        let mut rows = 0;
        for row in reader {
            let row = row?;
            rows += 1;
            if !is_active(&row.active) {
                continue;
            }
            let Some(kind) = snomed_relation(&row.type_id) else {
                debug!(type_id = %row.type_id, "unmodeled relationship type, skipping");
                continue;
            };
            let source = self
                .graph
                .getsert_node(&NodeKey::SnomedConcept, &row.source_id)?;
            let destination = self
                .graph
                .getsert_node(&NodeKey::SnomedConcept, &row.destination_id)?;
            self.graph
                .node_mut(source)
                .add_edge_single(&kind, destination, false)?;
        }
        self.graph.mark_source_loaded(LOINC_SNOMED_RELATIONSHIP_KEY);
        info!(source = LOINC_SNOMED_RELATIONSHIP_KEY, rows, "source loaded");
        Ok(rows)
    }
}

/// Loader for the international SNOMED relationship file.
///
/// Unlike the whole-file loaders, ingestion is tracked per relation kind:
/// asking for `is-a` edges today and `component` edges tomorrow reads the
/// file twice but ingests each kind exactly once.
pub struct SnomedReleaseLoader<'g> {
    graph: &'g mut OntologyGraph,
}

impl<'g> SnomedReleaseLoader<'g> {
    /// Creates a loader over the graph.
    pub fn new(graph: &'g mut OntologyGraph) -> Self {
        Self { graph }
    }

    /// Loads the selected relation kinds from the relationship file.
    ///
    /// Kinds already recorded in the loaded-sources registry are skipped;
    /// rows of other kinds are ignored without error.
    pub fn load_selected_relations<P: AsRef<Path>>(
        &mut self,
        path: P,
        kinds: &[EdgeKey],
    ) -> LoadResult<usize> {
        let wanted = self.wanted(kinds);
        if wanted.is_empty() {
            return Ok(0);
        }
        let reader = TableReader::from_path(path)?;
        self.load_selected_rows(reader, wanted)
    }

    /// Loads selected relation kinds from an in-memory source.
    pub fn load_selected_relations_from<R: Read>(
        &mut self,
        reader: R,
        kinds: &[EdgeKey],
    ) -> LoadResult<usize> {
        let wanted = self.wanted(kinds);
        if wanted.is_empty() {
            return Ok(0);
        }
        self.load_selected_rows(TableReader::from_reader(reader)?, wanted)
    }

    fn wanted(&self, kinds: &[EdgeKey]) -> Vec<EdgeKey> {
        let already = self.graph.loaded_relations(SNOMED_RELATIONS_KEY);
        kinds
            .iter()
            .filter(|kind| !already.contains(kind))
            .cloned()
            .collect()
    }

    fn load_selected_rows<R: Read>(
        &mut self,
        reader: TableReader<R, RelationshipRow>,
        wanted: Vec<EdgeKey>,
    ) -> LoadResult<usize> {
        let mut edges = 0;
        for row in reader {
            let row = row?;
            if !is_active(&row.active) {
                continue;
            }
            let Some(kind) = snomed_relation(&row.type_id) else {
                continue;
            };
            if !wanted.contains(&kind) {
                continue;
            }
            let source = self
                .graph
                .getsert_node(&NodeKey::SnomedConcept, &row.source_id)?;
            let destination = self
                .graph
                .getsert_node(&NodeKey::SnomedConcept, &row.destination_id)?;
            self.graph
                .node_mut(source)
                .add_edge_single(&kind, destination, false)?;
            edges += 1;
        }
        self.graph
            .mark_relations_loaded(SNOMED_RELATIONS_KEY, wanted);
        info!(source = SNOMED_RELATIONS_KEY, edges, "relations loaded");
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loinc_graph::default_schema;
    use loinc_types::well_known;

    fn graph() -> OntologyGraph {
        OntologyGraph::new(default_schema(true).unwrap())
    }

    fn tsv_of(columns: usize, rows: &[Vec<&str>]) -> String {
        let header: Vec<String> = (0..columns).map(|i| format!("c{i}")).collect();
        let mut out = header.join("\t") + "\n";
        for row in rows {
            assert_eq!(row.len(), columns);
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_description_sets_fsn() {
        let data = tsv_of(
            10,
            &[
                // fully specified name
                vec![
                    "1", "101", "20230901", "1", "11010000107", "40081010000107", "en",
                    FULLY_SPECIFIED_NAME_TYPE, "Albumin measurement (procedure)", "1",
                ],
                // synonym of the same concept, ignored
                vec![
                    "2", "102", "20230901", "1", "11010000107", "40081010000107", "en",
                    "900000000000013009", "Albumin measurement", "1",
                ],
                // inactive FSN, ignored
                vec![
                    "3", "103", "20230901", "0", "11010000107", "50091010000102", "en",
                    FULLY_SPECIFIED_NAME_TYPE, "Withdrawn concept", "1",
                ],
            ],
        );
        let mut graph = graph();
        LoincSnomedLoader::new(&mut graph)
            .load_description_from(data.as_bytes())
            .unwrap();

        let concept = graph
            .get_node(&NodeKey::SnomedConcept, "40081010000107")
            .unwrap();
        assert_eq!(
            concept.get_property(&PropKey::FullySpecifiedName),
            Some("Albumin measurement (procedure)")
        );
        assert!(graph.get_node(&NodeKey::SnomedConcept, "50091010000102").is_none());
    }

    #[test]
    fn test_identifier_maps_term_to_concept() {
        let data = tsv_of(
            7,
            &[vec![
                "1", "100021-5", "20230901", "1", "11010000107", "705114005", "40081010000107",
            ]],
        );
        let mut graph = graph();
        LoincSnomedLoader::new(&mut graph)
            .load_identifier_from(data.as_bytes())
            .unwrap();

        let term = graph.get_node(&NodeKey::LoincTerm, "100021-5").unwrap();
        let mapped = term.get_out_edges(&[EdgeKey::MapsTo]);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].to_node().code(), "40081010000107");
        assert_eq!(mapped[0].to_node().kind(), &NodeKey::SnomedConcept);
    }

    #[test]
    fn test_relationship_maps_known_types() {
        let data = tsv_of(
            11,
            &[
                vec![
                    "1", "201", "20230901", "1", "11010000107", "40081010000107",
                    "41341010000109", "0", well_known::IS_A, "900000000000011006", "900000000000451002",
                ],
                // unmodeled relationship type, skipped
                vec![
                    "2", "202", "20230901", "1", "11010000107", "40081010000107",
                    "272741003", "0", "123037004", "900000000000011006", "900000000000451002",
                ],
            ],
        );
        let mut graph = graph();
        LoincSnomedLoader::new(&mut graph)
            .load_relationship_from(data.as_bytes())
            .unwrap();

        let source = graph
            .get_node(&NodeKey::SnomedConcept, "40081010000107")
            .unwrap();
        let parents = source.get_out_edges(&[EdgeKey::SnomedIsA]);
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].to_node().code(), "41341010000109");
        // the skipped row created no nodes
        assert!(graph.get_node(&NodeKey::SnomedConcept, "272741003").is_none());
    }

    #[test]
    fn test_selected_relations_incremental() {
        let data = tsv_of(
            11,
            &[
                vec![
                    "1", "201", "20230901", "1", "11010000107", "74964007", "138875005",
                    "0", well_known::IS_A, "900000000000011006", "900000000000451002",
                ],
                vec![
                    "2", "202", "20230901", "1", "11010000107", "74964007", "123038009",
                    "0", well_known::COMPONENT, "900000000000011006", "900000000000451002",
                ],
            ],
        );
        let mut graph = graph();

        let edges = SnomedReleaseLoader::new(&mut graph)
            .load_selected_relations_from(data.as_bytes(), &[EdgeKey::SnomedIsA])
            .unwrap();
        assert_eq!(edges, 1);

        // the is-a kind is already ingested; only component remains wanted
        let edges = SnomedReleaseLoader::new(&mut graph)
            .load_selected_relations_from(
                data.as_bytes(),
                &[EdgeKey::SnomedIsA, EdgeKey::SnomedComponent],
            )
            .unwrap();
        assert_eq!(edges, 1);
        assert_eq!(graph.edge_count(), 2);

        // everything wanted is ingested; the file is not re-read
        let edges = SnomedReleaseLoader::new(&mut graph)
            .load_selected_relations_from(
                data.as_bytes(),
                &[EdgeKey::SnomedIsA, EdgeKey::SnomedComponent],
            )
            .unwrap();
        assert_eq!(edges, 0);
    }
}
