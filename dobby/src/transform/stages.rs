//! Pipeline stages.
//!
//! The order of [`Stage::PIPELINE`] is part of the contract: later stages
//! rely on the columns earlier ones create, rename or drop.

use serde::{Deserialize, Serialize};

/// One step of the transformation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    RequireColumns,
    CleanAddresses,
    UppercaseAddresses,
    FormatRuts,
    SplitNames,
    CreateCourseCodes,
    MapCommunes,
    CreateFullAddresses,
    AddMetadata,
    ConvertDates,
    CleanPhones,
    RenameColumns,
    ReorderColumns,
    ValidateEmails,
}

impl Stage {
    /// Every stage, in execution order.
    pub const PIPELINE: [Stage; 14] = [
        Stage::RequireColumns,
        Stage::CleanAddresses,
        Stage::UppercaseAddresses,
        Stage::FormatRuts,
        Stage::SplitNames,
        Stage::CreateCourseCodes,
        Stage::MapCommunes,
        Stage::CreateFullAddresses,
        Stage::AddMetadata,
        Stage::ConvertDates,
        Stage::CleanPhones,
        Stage::RenameColumns,
        Stage::ReorderColumns,
        Stage::ValidateEmails,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::RequireColumns => "require_columns",
            Stage::CleanAddresses => "clean_addresses",
            Stage::UppercaseAddresses => "uppercase_addresses",
            Stage::FormatRuts => "format_ruts",
            Stage::SplitNames => "split_names",
            Stage::CreateCourseCodes => "create_course_codes",
            Stage::MapCommunes => "map_communes",
            Stage::CreateFullAddresses => "create_full_addresses",
            Stage::AddMetadata => "add_metadata",
            Stage::ConvertDates => "convert_dates",
            Stage::CleanPhones => "clean_phones",
            Stage::RenameColumns => "rename_columns",
            Stage::ReorderColumns => "reorder_columns",
            Stage::ValidateEmails => "validate_emails",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Stage::RequireColumns => "Fail if any required source column is absent",
            Stage::CleanAddresses => "Strip locality names, commas and extra spaces from Direccion",
            Stage::UppercaseAddresses => "Uppercase Direccion when still present",
            Stage::FormatRuts => "Join Rut and Digito verificador, validate check digits",
            Stage::SplitNames => "Split student and guardian names on the first space",
            Stage::CreateCourseCodes => "Curso = Grado + Letra",
            Stage::MapCommunes => "Replace commune codes with commune names",
            Stage::CreateFullAddresses => "Direccion Completa = Direccion, Comuna",
            Stage::AddMetadata => "Insert rbd, year, Nivel and local; fill Nivel from Grado",
            Stage::ConvertDates => "Reparse birth and enrollment dates day-first",
            Stage::CleanPhones => "Normalize guardian phones, zero out invalid ones",
            Stage::RenameColumns => "Rename columns to the upload schema",
            Stage::ReorderColumns => "Keep exactly the upload columns, in order",
            Stage::ValidateEmails => "Check student and guardian email formats",
        }
    }
}

/// Human-readable listing of the pipeline, one numbered stage per line.
pub fn stages_description() -> String {
    Stage::PIPELINE
        .iter()
        .enumerate()
        .map(|(i, stage)| format!("{:2}. {:<22} {}", i + 1, stage.name(), stage.description()))
        .collect::<Vec<_>>()
        .join("\n")
}
