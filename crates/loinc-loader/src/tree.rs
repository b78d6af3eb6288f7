//! Loader for the LOINC part hierarchy tree exports.
//!
//! Each export is read in two passes: the first indexes every record by its
//! record id, the second creates parent edges for part rows only. Tree roots
//! have no parent, and non-part rows (class headings, terms mixed into the
//! exports) contribute display text at most, never hierarchy edges.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, info, warn};

use loinc_graph::OntologyGraph;
use loinc_types::{EdgeKey, NodeKey, PropKey};

use crate::error::LoadResult;
use crate::sources::TreeSource;
use crate::table::{field, TableRecord, TableReader};

/// One row of a tree export.
#[derive(Debug, Clone)]
pub struct TreeRow {
    /// Record id, unique within one export.
    pub id: String,
    /// Record id of the parent row, empty for roots.
    pub parent_id: String,
    /// LOINC code of the row, a part code for hierarchy rows.
    pub code: String,
    /// Display text of the row.
    pub code_text: String,
}

impl TableRecord for TreeRow {
    const COLUMNS: usize = 13;

    fn from_record(record: &StringRecord) -> Self {
        Self {
            id: field(record, 1),
            parent_id: field(record, 2),
            code: field(record, 4),
            code_text: field(record, 6),
        }
    }
}

fn is_part_code(code: &str) -> bool {
    code.starts_with("LP")
}

/// Loader for the tree exports of one release.
pub struct LoincTreeLoader<'g> {
    graph: &'g mut OntologyGraph,
    trees_path: PathBuf,
}

impl<'g> LoincTreeLoader<'g> {
    /// Creates a loader rooted at the directory holding the tree exports.
    pub fn new<P: AsRef<Path>>(graph: &'g mut OntologyGraph, trees_path: P) -> Self {
        Self {
            graph,
            trees_path: trees_path.as_ref().to_path_buf(),
        }
    }

    /// Loads every tree export.
    pub fn load_all(&mut self) -> LoadResult<usize> {
        let mut rows = 0;
        for source in TreeSource::all() {
            rows += self.load(source)?;
        }
        Ok(rows)
    }

    /// Loads one tree export. Idempotent per export.
    pub fn load(&mut self, source: TreeSource) -> LoadResult<usize> {
        if self.graph.is_source_loaded(&source.key()) {
            return Ok(0);
        }
        let reader = TableReader::from_path(self.trees_path.join(source.file_name()))?;
        self.load_rows(reader, source)
    }

    /// Loads one tree export from an in-memory source.
    pub fn load_from<R: Read>(&mut self, reader: R, source: TreeSource) -> LoadResult<usize> {
        if self.graph.is_source_loaded(&source.key()) {
            return Ok(0);
        }
        self.load_rows(TableReader::from_reader(reader)?, source)
    }

    fn load_rows<R: Read>(
        &mut self,
        reader: TableReader<R, TreeRow>,
        source: TreeSource,
    ) -> LoadResult<usize> {
        // first pass: index by record id so parent lookups do not depend on
        // row order within the export
        let mut by_id: HashMap<String, TreeRow> = HashMap::new();
        let mut rows = 0;
        for row in reader {
            let row = row?;
            rows += 1;
            by_id.insert(row.id.clone(), row);
        }

        // second pass: hierarchy edges for part rows only
        for row in by_id.values() {
            if !is_part_code(&row.code) {
                continue;
            }
            let part = self.graph.getsert_node(&NodeKey::LoincPart, &row.code)?;
            self.graph
                .node_mut(part)
                .set_property(&PropKey::CodeText, Some(&row.code_text))?;

            if row.parent_id.is_empty() {
                continue;
            }
            let Some(parent_row) = by_id.get(&row.parent_id) else {
                warn!(tree = %source, id = %row.id, parent_id = %row.parent_id,
                    "parent record missing, skipping edge");
                continue;
            };
            if !is_part_code(&parent_row.code) {
                debug!(tree = %source, id = %row.id, parent_code = %parent_row.code,
                    "parent is not a part, skipping edge");
                continue;
            }
            let parent = self
                .graph
                .getsert_node(&NodeKey::LoincPart, &parent_row.code)?;
            self.graph
                .node_mut(part)
                .add_edge_single(&EdgeKey::TreeParent, parent, false)?;
        }

        self.graph.mark_source_loaded(&source.key());
        info!(source = %source, rows, "source loaded");
        Ok(rows)
    }
}
