//! # loinc-types
//!
//! Domain key types for the LOINC ontology graph.
//!
//! This crate defines the closed key enums that discriminate node, property,
//! and edge kinds ([`NodeKey`], [`PropKey`], [`EdgeKey`]), the part-link
//! vocabulary tables ([`link`]), and well-known SNOMED relationship type
//! identifiers ([`well_known`]).
//!
//! ## Features
//!
//! - `serde` (default): keys serialize as their canonical code strings.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use loinc_types::{link, EdgeKey, NodeKey, PropKey};
//!
//! assert_eq!(NodeKey::LoincTerm.code(), "loinc_term");
//! assert_eq!(PropKey::parse("loinc_number"), PropKey::LoincNumber);
//! assert_eq!(
//!     link::primary_link_edge("COMPONENT"),
//!     Some(EdgeKey::PrimaryComponent)
//! );
//! ```

#![warn(missing_docs)]

mod keys;
pub mod link;
pub mod well_known;

pub use keys::{EdgeKey, NodeKey, PropKey};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_are_exported() {
        let _node = NodeKey::LoincPart;
        let _prop = PropKey::PartNumber;
        let _edge = EdgeKey::TreeParent;
    }

    #[test]
    fn test_well_known_accessible() {
        assert_eq!(well_known::IS_A, "116680003");
    }
}
