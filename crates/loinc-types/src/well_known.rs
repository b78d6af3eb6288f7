//! Well-known SNOMED CT relationship type identifiers.
//!
//! The LOINC Ontology module expresses term models as SNOMED-style
//! relationships. Relationship rows carry the relationship kind as a type
//! SCTID; these constants name the kinds the graph models. SCTIDs are kept
//! as strings because they feed node identifier formatting verbatim.

use crate::EdgeKey;

/// `116680003 | Is a |`
pub const IS_A: &str = "116680003";
/// `246093002 | Component |`
pub const COMPONENT: &str = "246093002";
/// `704319004 | Inheres in |`
pub const INHERES_IN: &str = "704319004";
/// `704327008 | Direct site |`
pub const DIRECT_SITE: &str = "704327008";
/// `370132008 | Scale type |`
pub const SCALE_TYPE: &str = "370132008";
/// `246501002 | Technique |`
pub const TECHNIQUE: &str = "246501002";
/// `704318007 | Property type |`
pub const PROPERTY_TYPE: &str = "704318007";
/// `370134009 | Time aspect |`
pub const TIME_ASPECT: &str = "370134009";
/// `718497002 | Inherent location |`
pub const INHERENT_LOCATION: &str = "718497002";

/// Maps a relationship type SCTID to its edge kind.
///
/// Returns `None` for relationship kinds the graph does not model; loaders
/// skip those rows rather than failing, since SNOMED releases carry many
/// relationship types that are irrelevant here.
pub fn snomed_relation(type_id: &str) -> Option<EdgeKey> {
    let edge = match type_id {
        IS_A => EdgeKey::SnomedIsA,
        COMPONENT => EdgeKey::SnomedComponent,
        INHERES_IN => EdgeKey::SnomedInheresIn,
        DIRECT_SITE => EdgeKey::SnomedDirectSite,
        SCALE_TYPE => EdgeKey::SnomedScaleType,
        TECHNIQUE => EdgeKey::SnomedTechnique,
        PROPERTY_TYPE => EdgeKey::SnomedPropertyType,
        TIME_ASPECT => EdgeKey::SnomedTimeAspect,
        INHERENT_LOCATION => EdgeKey::SnomedInherentLocation,
        _ => return None,
    };
    Some(edge)
}
