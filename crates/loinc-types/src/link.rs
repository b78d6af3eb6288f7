//! Part-link vocabulary tables.
//!
//! The LoincPartLink files tag each term-to-part row with a `Property` column
//! holding either a bare property name (`COMPONENT`) or a full property URI
//! (`http://loinc.org/property/COMPONENT`). These tables map that value to an
//! [`EdgeKey`], one table per link file. The vocabulary is closed: an
//! unrecognized value in either file is a data error, not a dynamic key.

use crate::EdgeKey;

/// Prefix stripped from property URIs before lookup.
pub const PROPERTY_URI_PREFIX: &str = "http://loinc.org/property/";

fn property_name(value: &str) -> &str {
    value.strip_prefix(PROPERTY_URI_PREFIX).unwrap_or(value)
}

/// Resolves a `Property` value from `LoincPartLink_Primary.csv` to its edge kind.
///
/// Returns `None` for values outside the primary link vocabulary.
pub fn primary_link_edge(property: &str) -> Option<EdgeKey> {
    let edge = match property_name(property) {
        "COMPONENT" => EdgeKey::PrimaryComponent,
        "PROPERTY" => EdgeKey::PrimaryProperty,
        "TIME_ASPCT" | "TIME" => EdgeKey::PrimaryTime,
        "SYSTEM" => EdgeKey::PrimarySystem,
        "SCALE_TYP" | "SCALE" => EdgeKey::PrimaryScale,
        "METHOD_TYP" | "METHOD" => EdgeKey::PrimaryMethod,

        "document-kind" => EdgeKey::DocumentKind,
        "document-role" => EdgeKey::DocumentRole,
        "document-setting" => EdgeKey::DocumentSetting,
        "document-subject-matter-domain" => EdgeKey::DocumentSubjectMatterDomain,
        "document-type-of-service" => EdgeKey::DocumentTypeOfService,

        "rad-anatomic-location-imaging-focus" => EdgeKey::RadAnatomicLocationImagingFocus,
        "rad-anatomic-location-laterality" => EdgeKey::RadAnatomicLocationLaterality,
        "rad-anatomic-location-laterality-presence" => {
            EdgeKey::RadAnatomicLocationLateralityPresence
        }
        "rad-anatomic-location-region-imaged" => EdgeKey::RadAnatomicLocationRegionImaged,
        "rad-guidance-for-action" => EdgeKey::RadGuidanceForAction,
        "rad-guidance-for-approach" => EdgeKey::RadGuidanceForApproach,
        "rad-guidance-for-object" => EdgeKey::RadGuidanceForObject,
        "rad-guidance-for-presence" => EdgeKey::RadGuidanceForPresence,
        "rad-maneuver-maneuver-type" => EdgeKey::RadManeuverManeuverType,
        "rad-modality-subtype" => EdgeKey::RadModalitySubtype,
        "rad-modality-type" => EdgeKey::RadModalityType,
        "rad-pharmaceutical-route" => EdgeKey::RadPharmaceuticalRoute,
        "rad-pharmaceutical-substance-given" => EdgeKey::RadPharmaceuticalSubstanceGiven,
        "rad-reason-for-exam" => EdgeKey::RadReasonForExam,
        "rad-subject" => EdgeKey::RadSubject,
        "rad-timing" => EdgeKey::RadTiming,
        "rad-view-aggregation" => EdgeKey::RadViewAggregation,
        "rad-view-view-type" => EdgeKey::RadViewViewType,

        _ => return None,
    };
    Some(edge)
}

/// Resolves a `Property` value from `LoincPartLink_Supplementary.csv` to its
/// edge kind.
///
/// Returns `None` for values outside the supplementary link vocabulary.
pub fn supplementary_link_edge(property: &str) -> Option<EdgeKey> {
    let edge = match property_name(property) {
        "analyte" => EdgeKey::DetailedComponent,
        "challenge" => EdgeKey::DetailedChallenge,
        "adjustment" => EdgeKey::DetailedAdjustment,
        "count" => EdgeKey::DetailedCount,
        "PROPERTY" => EdgeKey::DetailedProperty,
        "time-core" => EdgeKey::DetailedTimeCore,
        "time-modifier" => EdgeKey::DetailedTimeModifier,
        "system-core" => EdgeKey::DetailedSystemCore,
        "super-system" => EdgeKey::DetailedSuperSystem,
        "SCALE_TYP" => EdgeKey::DetailedScale,
        "METHOD_TYP" => EdgeKey::DetailedMethod,

        "CLASS" => EdgeKey::MetadataClass,
        "category" => EdgeKey::MetadataCategory,
        "search" => EdgeKey::Search,
        "analyte-gene" => EdgeKey::SemanticGene,
        "analyte-core" => EdgeKey::SyntaxAnalyteCore,
        "analyte-divisor" => EdgeKey::SyntaxAnalyteDivisor,
        "analyte-numerator" => EdgeKey::SyntaxAnalyteNumerator,
        "analyte-divisor-suffix" => EdgeKey::SyntaxAnalyteDivisorSuffix,
        "analyte-suffix" => EdgeKey::SyntaxAnalyteSuffix,

        _ => return None,
    };
    Some(edge)
}
