//! Key enums for node, property, and edge kinds.
//!
//! Each key is a closed variant set plus a `Dynamic` escape hatch carrying an
//! arbitrary code string. Known variants round-trip through their canonical
//! snake_case code; unknown codes parse into `Dynamic`, which is what allows
//! non-strict schemas to absorb codes added between vocabulary releases.

macro_rules! coded_key {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $code:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(into = "String", from = "String")
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[doc = concat!("Key `", $code, "`.")]
                $variant,
            )+
            /// Key registered at runtime rather than modeled ahead of a release.
            Dynamic(String),
        }

        impl $name {
            /// Canonical string code for this key.
            pub fn code(&self) -> &str {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Dynamic(code) => code,
                }
            }

            /// Parses a code string, falling back to `Dynamic` for unknown codes.
            pub fn parse(code: &str) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Dynamic(other.to_string()),
                }
            }

            /// All statically-known keys, in declaration order.
            pub fn known() -> Vec<Self> {
                vec![$(Self::$variant),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.code())
            }
        }

        impl From<&str> for $name {
            fn from(code: &str) -> Self {
                Self::parse(code)
            }
        }

        impl From<String> for $name {
            fn from(code: String) -> Self {
                Self::parse(&code)
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> String {
                key.code().to_string()
            }
        }
    };
}

coded_key! {
    /// Categories of graph entity.
    NodeKey {
        /// A LOINC observation code (`NNNNN-N`).
        LoincTerm => "loinc_term",
        /// A LOINC part (`LPNNNNN-N`), one axis value of a term's model.
        LoincPart => "loinc_part",
        /// A SNOMED CT concept.
        SnomedConcept => "snomed_concept",
    }
}

coded_key! {
    /// Scalar attribute slots on nodes and edges.
    PropKey {
        // LoincTable/Loinc.csv columns
        LoincNumber => "loinc_number",
        Component => "component",
        Property => "property",
        TimeAspect => "time_aspect",
        System => "system",
        ScaleType => "scale_type",
        MethodType => "method_type",
        Class => "class",
        ClassType => "class_type",
        DefinitionDescription => "definition_description",
        /// Shared by term and part nodes; registered once as a global type.
        Status => "status",
        ShortName => "short_name",
        LongCommonName => "long_common_name",
        VersionFirstReleased => "version_first_released",
        VersionLastChanged => "version_last_changed",
        DisplayName => "display_name",

        // AccessoryFiles/PartFile/Part.csv columns
        PartNumber => "part_number",
        PartTypeName => "part_type_name",
        PartName => "part_name",
        PartDisplayName => "part_display_name",

        // Tree file attributes
        CodeText => "tree_code_text",

        // SNOMED description attributes
        FullySpecifiedName => "fully_specified_name",

        // Part-link edge attribute
        PartCodeSystem => "part_code_system",
    }
}

coded_key! {
    /// Categories of directed relationship between two nodes.
    EdgeKey {
        /// Part hierarchy edge from the LOINC tree exports.
        TreeParent => "tree_parent",
        /// LOINC term to SNOMED concept equivalence from the identifier file.
        MapsTo => "maps_to",

        // SNOMED relationship kinds, keyed by type SCTID at load time
        SnomedIsA => "snomed_is_a",
        SnomedComponent => "snomed_component",
        SnomedInheresIn => "snomed_inheres_in",
        SnomedDirectSite => "snomed_direct_site",
        SnomedScaleType => "snomed_scale_type",
        SnomedTechnique => "snomed_technique",
        SnomedPropertyType => "snomed_property_type",
        SnomedTimeAspect => "snomed_time_aspect",
        SnomedInherentLocation => "snomed_inherent_location",

        // Primary model (LoincPartLink_Primary.csv)
        PrimaryComponent => "primary_component",
        PrimaryProperty => "primary_property",
        PrimaryTime => "primary_time",
        PrimarySystem => "primary_system",
        PrimaryScale => "primary_scale",
        PrimaryMethod => "primary_method",

        // Document ontology axes (primary link table)
        DocumentKind => "document_kind",
        DocumentRole => "document_role",
        DocumentSetting => "document_setting",
        DocumentSubjectMatterDomain => "document_subject_matter_domain",
        DocumentTypeOfService => "document_type_of_service",

        // Radiology axes (primary link table)
        RadAnatomicLocationImagingFocus => "rad_anatomic_location_imaging_focus",
        RadAnatomicLocationLaterality => "rad_anatomic_location_laterality",
        RadAnatomicLocationLateralityPresence => "rad_anatomic_location_laterality_presence",
        RadAnatomicLocationRegionImaged => "rad_anatomic_location_region_imaged",
        RadGuidanceForAction => "rad_guidance_for_action",
        RadGuidanceForApproach => "rad_guidance_for_approach",
        RadGuidanceForObject => "rad_guidance_for_object",
        RadGuidanceForPresence => "rad_guidance_for_presence",
        RadManeuverManeuverType => "rad_maneuver_maneuver_type",
        RadModalitySubtype => "rad_modality_subtype",
        RadModalityType => "rad_modality_type",
        RadPharmaceuticalRoute => "rad_pharmaceutical_route",
        RadPharmaceuticalSubstanceGiven => "rad_pharmaceutical_substance_given",
        RadReasonForExam => "rad_reason_for_exam",
        RadSubject => "rad_subject",
        RadTiming => "rad_timing",
        RadViewAggregation => "rad_view_aggregation",
        RadViewViewType => "rad_view_view_type",

        // Detailed/supplementary model (LoincPartLink_Supplementary.csv)
        DetailedComponent => "detailed_component",
        DetailedChallenge => "detailed_challenge",
        DetailedAdjustment => "detailed_adjustment",
        DetailedCount => "detailed_count",
        DetailedProperty => "detailed_property",
        DetailedTimeCore => "detailed_time_core",
        DetailedTimeModifier => "detailed_time_modifier",
        DetailedSystemCore => "detailed_system_core",
        DetailedSuperSystem => "detailed_super_system",
        DetailedScale => "detailed_scale",
        DetailedMethod => "detailed_method",

        // Other supplementary groups
        MetadataClass => "metadata_class",
        MetadataCategory => "metadata_category",
        Search => "search",
        SemanticGene => "semantic_analyte_gene",
        SyntaxAnalyteCore => "syntax_analyte_core",
        SyntaxAnalyteDivisor => "syntax_analyte_divisor",
        SyntaxAnalyteNumerator => "syntax_analyte_numerator",
        SyntaxAnalyteDivisorSuffix => "syntax_analyte_divisor_suffix",
        SyntaxAnalyteSuffix => "syntax_analyte_suffix",
    }
}
