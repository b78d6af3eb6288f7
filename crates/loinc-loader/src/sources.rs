//! Source file layout and loaded-source keys.
//!
//! Each source has a stable key under which the graph records its ingestion.
//! Keys are the release-relative paths of the main LOINC files and short
//! symbolic paths for the SNOMED sources, whose file names carry version
//! stamps that must not leak into the idempotency registry.

use std::fmt;

/// Main LOINC release files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoincSource {
    /// `LoincTable/Loinc.csv`, one row per term.
    Table,
    /// `AccessoryFiles/PartFile/Part.csv`, one row per part.
    Part,
    /// `AccessoryFiles/PartFile/LoincPartLink_Primary.csv`.
    PartLinkPrimary,
    /// `AccessoryFiles/PartFile/LoincPartLink_Supplementary.csv`.
    PartLinkSupplementary,
}

impl LoincSource {
    /// Path of this source relative to the release root; doubles as the
    /// loaded-source key.
    pub fn relative_path(self) -> &'static str {
        match self {
            Self::Table => "LoincTable/Loinc.csv",
            Self::Part => "AccessoryFiles/PartFile/Part.csv",
            Self::PartLinkPrimary => "AccessoryFiles/PartFile/LoincPartLink_Primary.csv",
            Self::PartLinkSupplementary => {
                "AccessoryFiles/PartFile/LoincPartLink_Supplementary.csv"
            }
        }
    }

    /// Loaded-source key for this source.
    pub fn key(self) -> &'static str {
        self.relative_path()
    }
}

impl fmt::Display for LoincSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.relative_path())
    }
}

/// Part hierarchy tree exports, one file per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSource {
    /// `class.csv`.
    Class,
    /// `component.csv`.
    Component,
    /// `component_by_system.csv`.
    ComponentBySystem,
    /// `document.csv`.
    Document,
    /// `method.csv`.
    Method,
    /// `panel.csv`.
    Panel,
    /// `system.csv`.
    System,
}

impl TreeSource {
    /// All tree exports, in load order.
    pub fn all() -> [TreeSource; 7] {
        [
            Self::Class,
            Self::Component,
            Self::ComponentBySystem,
            Self::Document,
            Self::Method,
            Self::Panel,
            Self::System,
        ]
    }

    /// File name of this export inside the trees directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Class => "class.csv",
            Self::Component => "component.csv",
            Self::ComponentBySystem => "component_by_system.csv",
            Self::Document => "document.csv",
            Self::Method => "method.csv",
            Self::Panel => "panel.csv",
            Self::System => "system.csv",
        }
    }

    /// Loaded-source key for this export.
    pub fn key(self) -> String {
        format!("tree/{}", self.file_name())
    }
}

impl fmt::Display for TreeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Loaded-source key for the LOINC-SNOMED description file.
pub const LOINC_SNOMED_DESCRIPTION_KEY: &str = "loinc-snomed/description";

/// Loaded-source key for the LOINC-SNOMED identifier file.
pub const LOINC_SNOMED_IDENTIFIER_KEY: &str = "loinc-snomed/identifier";

/// Loaded-source key for the LOINC-SNOMED relationship file.
pub const LOINC_SNOMED_RELATIONSHIP_KEY: &str = "loinc-snomed/relationship";

/// Loaded-source key for the SNOMED relationship file, marked per relation
/// kind rather than whole-file.
pub const SNOMED_RELATIONS_KEY: &str = "snomed/relations";
