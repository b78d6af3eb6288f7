//! Tabular loaders populating the LOINC ontology graph from release files.
//!
//! Four loaders cover the source families:
//!
//! - [`LoincReleaseLoader`]: the main LOINC table, the part file, and both
//!   part-link tables
//! - [`LoincTreeLoader`]: the part hierarchy tree exports
//! - [`LoincSnomedLoader`]: the LOINC-SNOMED Ontology module files
//! - [`SnomedReleaseLoader`]: selected relation kinds from the international
//!   SNOMED relationship file
//!
//! All loaders read columns by position, record their source in the graph's
//! loaded-sources registry, and are safe to re-invoke. The [`Module`] type
//! projects loaded graph content into flat serializable entities.
//!
//! # Usage
//!
//! ```no_run
//! use loinc_graph::{default_schema, OntologyGraph};
//! use loinc_loader::{LoincReleaseLoader, LoincTreeLoader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = OntologyGraph::new(default_schema(true)?);
//! LoincReleaseLoader::new(&mut graph, "Loinc_2.78").load_all()?;
//! LoincTreeLoader::new(&mut graph, "Loinc_2.78_Trees").load_all()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod loinc;
mod module;
mod snomed;
mod sources;
mod table;
mod tree;

pub use error::{LoadError, LoadResult};
pub use loinc::{LoincReleaseLoader, LoincTermRow, PartLinkRow, PartRow};
pub use module::{LoincPartEntity, LoincTermEntity, Module, SnomedConceptEntity};
pub use snomed::{
    DescriptionRow, IdentifierRow, LoincSnomedLoader, RelationshipRow, SnomedReleaseLoader,
};
pub use sources::{
    LoincSource, TreeSource, LOINC_SNOMED_DESCRIPTION_KEY, LOINC_SNOMED_IDENTIFIER_KEY,
    LOINC_SNOMED_RELATIONSHIP_KEY, SNOMED_RELATIONS_KEY,
};
pub use table::{field, TableRecord, TableReader};
pub use tree::{LoincTreeLoader, TreeRow};
