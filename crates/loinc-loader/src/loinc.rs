//! Loaders for the main LOINC release files.
//!
//! Covers the term table, the part file, and the two part-link tables. All
//! columns are positional; blank values are stored as empty strings, as
//! read, so a property set from a blank column reads back as `""` rather
//! than as absent.

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::info;

use loinc_graph::OntologyGraph;
use loinc_types::link::{primary_link_edge, supplementary_link_edge};
use loinc_types::{EdgeKey, NodeKey, PropKey};

use crate::error::{LoadError, LoadResult};
use crate::sources::LoincSource;
use crate::table::{field, TableRecord, TableReader};

/// One row of `LoincTable/Loinc.csv`.
#[derive(Debug, Clone)]
pub struct LoincTermRow {
    /// Term code (`NNNNN-N`).
    pub loinc_number: String,
    /// Component axis text.
    pub component: String,
    /// Property axis text.
    pub property: String,
    /// Time aspect axis text.
    pub time_aspect: String,
    /// System axis text.
    pub system: String,
    /// Scale type axis text.
    pub scale_type: String,
    /// Method type axis text.
    pub method_type: String,
    /// LOINC class.
    pub class: String,
    /// Release version in which the term last changed.
    pub version_last_changed: String,
    /// Narrative definition.
    pub definition_description: String,
    /// Term status.
    pub status: String,
    /// Class type discriminator.
    pub class_type: String,
    /// Short display name.
    pub short_name: String,
    /// Long common name.
    pub long_common_name: String,
    /// Release version in which the term first appeared.
    pub version_first_released: String,
    /// Consumer-facing display name.
    pub display_name: String,
}

impl TableRecord for LoincTermRow {
    const COLUMNS: usize = 42;

    fn from_record(record: &StringRecord) -> Self {
        Self {
            loinc_number: field(record, 1),
            component: field(record, 2),
            property: field(record, 3),
            time_aspect: field(record, 4),
            system: field(record, 5),
            scale_type: field(record, 6),
            method_type: field(record, 7),
            class: field(record, 8),
            version_last_changed: field(record, 9),
            definition_description: field(record, 11),
            status: field(record, 12),
            class_type: field(record, 14),
            short_name: field(record, 21),
            long_common_name: field(record, 26),
            version_first_released: field(record, 39),
            display_name: field(record, 41),
        }
    }
}

/// One row of `AccessoryFiles/PartFile/Part.csv`.
#[derive(Debug, Clone)]
pub struct PartRow {
    /// Part code (`LPNNNNN-N`).
    pub part_number: String,
    /// Axis the part belongs to.
    pub part_type_name: String,
    /// Canonical part name.
    pub part_name: String,
    /// Display variant of the name.
    pub part_display_name: String,
    /// Part status.
    pub status: String,
}

impl TableRecord for PartRow {
    const COLUMNS: usize = 6;

    fn from_record(record: &StringRecord) -> Self {
        Self {
            part_number: field(record, 1),
            part_type_name: field(record, 2),
            part_name: field(record, 3),
            part_display_name: field(record, 4),
            status: field(record, 5),
        }
    }
}

/// One row of either part-link table.
#[derive(Debug, Clone)]
pub struct PartLinkRow {
    /// Term code being linked.
    pub loinc_number: String,
    /// Long common name of the term, repeated from the term table.
    pub long_common_name: String,
    /// Part code being linked.
    pub part_number: String,
    /// Part name, repeated from the part file.
    pub part_name: String,
    /// Code system URI the part code belongs to.
    pub part_code_system: String,
    /// Axis the part belongs to.
    pub part_type_name: String,
    /// Link type label.
    pub link_type_name: String,
    /// Link property, bare or as a `http://loinc.org/property/` URI.
    pub property: String,
}

impl TableRecord for PartLinkRow {
    const COLUMNS: usize = 9;

    fn from_record(record: &StringRecord) -> Self {
        Self {
            loinc_number: field(record, 1),
            long_common_name: field(record, 2),
            part_number: field(record, 3),
            part_name: field(record, 4),
            part_code_system: field(record, 5),
            part_type_name: field(record, 6),
            link_type_name: field(record, 7),
            property: field(record, 8),
        }
    }
}

/// Loader for the main LOINC release files.
///
/// Each `load_*` method is idempotent: a source already present in the
/// graph's loaded-sources registry is skipped and reported as zero rows.
pub struct LoincReleaseLoader<'g> {
    graph: &'g mut OntologyGraph,
    release_path: PathBuf,
}

impl<'g> LoincReleaseLoader<'g> {
    /// Creates a loader rooted at a LOINC release directory.
    pub fn new<P: AsRef<Path>>(graph: &'g mut OntologyGraph, release_path: P) -> Self {
        Self {
            graph,
            release_path: release_path.as_ref().to_path_buf(),
        }
    }

    /// Loads the term table, part file, and both part-link tables.
    ///
    /// # Errors
    /// Fails on missing files, malformed rows, schema rejections, or
    /// part-link properties outside the link vocabulary.
    pub fn load_all(&mut self) -> LoadResult<usize> {
        let mut rows = 0;
        rows += self.load_loinc_table()?;
        rows += self.load_part_table()?;
        rows += self.load_part_link_primary()?;
        rows += self.load_part_link_supplementary()?;
        Ok(rows)
    }

    fn source_path(&self, source: LoincSource) -> PathBuf {
        self.release_path.join(source.relative_path())
    }

    /// Loads `LoincTable/Loinc.csv`.
    pub fn load_loinc_table(&mut self) -> LoadResult<usize> {
        if self.graph.is_source_loaded(LoincSource::Table.key()) {
            return Ok(0);
        }
        let reader = TableReader::from_path(self.source_path(LoincSource::Table))?;
        self.load_loinc_table_rows(reader)
    }

    /// Loads term rows from an in-memory source.
    pub fn load_loinc_table_from<R: Read>(&mut self, reader: R) -> LoadResult<usize> {
        if self.graph.is_source_loaded(LoincSource::Table.key()) {
            return Ok(0);
        }
        self.load_loinc_table_rows(TableReader::from_reader(reader)?)
    }

    fn load_loinc_table_rows<R: Read>(
        &mut self,
        reader: TableReader<R, LoincTermRow>,
    ) -> LoadResult<usize> {
        let mut rows = 0;
        for row in reader {
            let row = row?;
            let id = self.graph.getsert_node(&NodeKey::LoincTerm, &row.loinc_number)?;
            self.graph
                .node_mut(id)
                .set_property(&PropKey::LoincNumber, Some(&row.loinc_number))?
                .set_property(&PropKey::Component, Some(&row.component))?
                .set_property(&PropKey::Property, Some(&row.property))?
                .set_property(&PropKey::TimeAspect, Some(&row.time_aspect))?
                .set_property(&PropKey::System, Some(&row.system))?
                .set_property(&PropKey::ScaleType, Some(&row.scale_type))?
                .set_property(&PropKey::MethodType, Some(&row.method_type))?
                .set_property(&PropKey::Class, Some(&row.class))?
                .set_property(&PropKey::ClassType, Some(&row.class_type))?
                .set_property(&PropKey::DefinitionDescription, Some(&row.definition_description))?
                .set_property(&PropKey::Status, Some(&row.status))?
                .set_property(&PropKey::ShortName, Some(&row.short_name))?
                .set_property(&PropKey::LongCommonName, Some(&row.long_common_name))?
                .set_property(&PropKey::VersionFirstReleased, Some(&row.version_first_released))?
                .set_property(&PropKey::VersionLastChanged, Some(&row.version_last_changed))?
                .set_property(&PropKey::DisplayName, Some(&row.display_name))?;
            rows += 1;
        }
        self.graph.mark_source_loaded(LoincSource::Table.key());
        info!(source = %LoincSource::Table, rows, "source loaded");
        Ok(rows)
    }

    /// Loads `AccessoryFiles/PartFile/Part.csv`.
    pub fn load_part_table(&mut self) -> LoadResult<usize> {
        if self.graph.is_source_loaded(LoincSource::Part.key()) {
            return Ok(0);
        }
        let reader = TableReader::from_path(self.source_path(LoincSource::Part))?;
        self.load_part_table_rows(reader)
    }

    /// Loads part rows from an in-memory source.
    pub fn load_part_table_from<R: Read>(&mut self, reader: R) -> LoadResult<usize> {
        if self.graph.is_source_loaded(LoincSource::Part.key()) {
            return Ok(0);
        }
        self.load_part_table_rows(TableReader::from_reader(reader)?)
    }

    fn load_part_table_rows<R: Read>(
        &mut self,
        reader: TableReader<R, PartRow>,
    ) -> LoadResult<usize> {
        let mut rows = 0;
        for row in reader {
            let row = row?;
            let id = self.graph.getsert_node(&NodeKey::LoincPart, &row.part_number)?;
            self.graph
                .node_mut(id)
                .set_property(&PropKey::PartNumber, Some(&row.part_number))?
                .set_property(&PropKey::PartTypeName, Some(&row.part_type_name))?
                .set_property(&PropKey::PartName, Some(&row.part_name))?
                .set_property(&PropKey::PartDisplayName, Some(&row.part_display_name))?
                .set_property(&PropKey::Status, Some(&row.status))?;
            rows += 1;
        }
        self.graph.mark_source_loaded(LoincSource::Part.key());
        info!(source = %LoincSource::Part, rows, "source loaded");
        Ok(rows)
    }

    /// Loads `AccessoryFiles/PartFile/LoincPartLink_Primary.csv`.
    pub fn load_part_link_primary(&mut self) -> LoadResult<usize> {
        if self.graph.is_source_loaded(LoincSource::PartLinkPrimary.key()) {
            return Ok(0);
        }
        let reader = TableReader::from_path(self.source_path(LoincSource::PartLinkPrimary))?;
        self.load_part_link_rows(reader, LoincSource::PartLinkPrimary, primary_link_edge)
    }

    /// Loads primary part-link rows from an in-memory source.
    pub fn load_part_link_primary_from<R: Read>(&mut self, reader: R) -> LoadResult<usize> {
        if self.graph.is_source_loaded(LoincSource::PartLinkPrimary.key()) {
            return Ok(0);
        }
        self.load_part_link_rows(
            TableReader::from_reader(reader)?,
            LoincSource::PartLinkPrimary,
            primary_link_edge,
        )
    }

    /// Loads `AccessoryFiles/PartFile/LoincPartLink_Supplementary.csv`.
    pub fn load_part_link_supplementary(&mut self) -> LoadResult<usize> {
        if self
            .graph
            .is_source_loaded(LoincSource::PartLinkSupplementary.key())
        {
            return Ok(0);
        }
        let reader =
            TableReader::from_path(self.source_path(LoincSource::PartLinkSupplementary))?;
        self.load_part_link_rows(
            reader,
            LoincSource::PartLinkSupplementary,
            supplementary_link_edge,
        )
    }

    /// Loads supplementary part-link rows from an in-memory source.
    pub fn load_part_link_supplementary_from<R: Read>(&mut self, reader: R) -> LoadResult<usize> {
        if self
            .graph
            .is_source_loaded(LoincSource::PartLinkSupplementary.key())
        {
            return Ok(0);
        }
        self.load_part_link_rows(
            TableReader::from_reader(reader)?,
            LoincSource::PartLinkSupplementary,
            supplementary_link_edge,
        )
    }

    fn load_part_link_rows<R: Read>(
        &mut self,
        reader: TableReader<R, PartLinkRow>,
        source: LoincSource,
        link_edge: fn(&str) -> Option<EdgeKey>,
    ) -> LoadResult<usize> {
        let mut rows = 0;
        for row in reader {
            let row = row?;
            rows += 1;
            let kind = link_edge(&row.property).ok_or_else(|| LoadError::UnknownLinkProperty {
                row: rows,
                value: row.property.clone(),
            })?;
            let term = self.graph.getsert_node(&NodeKey::LoincTerm, &row.loinc_number)?;
            let part = self.graph.getsert_node(&NodeKey::LoincPart, &row.part_number)?;
            let edge = self.graph.node_mut(term).add_edge_single(&kind, part, false)?;
            self.graph.node_mut(term).set_edge_property(
                edge,
                &PropKey::PartCodeSystem,
                Some(&row.part_code_system),
            )?;
        }
        self.graph.mark_source_loaded(source.key());
        info!(source = %source, rows, "source loaded");
        Ok(rows)
    }
}
