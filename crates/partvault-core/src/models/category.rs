use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Top-level partition of the asset store. Each category maps to one storage
/// directory and one component field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Footprint,
    Symbol,
    Model,
    Pspice,
    Pad,
    Archive,
}

impl FileCategory {
    pub const ALL: [FileCategory; 6] = [
        FileCategory::Footprint,
        FileCategory::Symbol,
        FileCategory::Model,
        FileCategory::Pspice,
        FileCategory::Pad,
        FileCategory::Archive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Footprint => "footprint",
            FileCategory::Symbol => "symbol",
            FileCategory::Model => "model",
            FileCategory::Pspice => "pspice",
            FileCategory::Pad => "pad",
            FileCategory::Archive => "archive",
        }
    }

    /// Directory name under the storage root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            FileCategory::Footprint => "footprints",
            FileCategory::Symbol => "symbols",
            FileCategory::Model => "models",
            FileCategory::Pspice => "pspice",
            FileCategory::Pad => "pads",
            FileCategory::Archive => "archives",
        }
    }

    /// The component field files of this category are linked through.
    pub fn field(&self) -> ComponentField {
        match self {
            FileCategory::Footprint => ComponentField::PcbFootprint,
            FileCategory::Symbol => ComponentField::Schematic,
            FileCategory::Model => ComponentField::StepModel,
            FileCategory::Pspice => ComponentField::Pspice,
            FileCategory::Pad => ComponentField::PadFile,
            FileCategory::Archive => ComponentField::LibraryArchive,
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileCategory {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "footprint" => Ok(FileCategory::Footprint),
            "symbol" => Ok(FileCategory::Symbol),
            "model" => Ok(FileCategory::Model),
            "pspice" => Ok(FileCategory::Pspice),
            "pad" => Ok(FileCategory::Pad),
            "archive" => Ok(FileCategory::Archive),
            other => Err(crate::error::AppError::InvalidInput(format!(
                "Unknown file category: {}",
                other
            ))),
        }
    }
}

/// Whether a component field holds at most one file or an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Multi,
}

/// Component field a stored file is linked through. The field determines both
/// the category of the linked file and the cardinality rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ComponentField {
    PcbFootprint,
    Schematic,
    StepModel,
    Pspice,
    PadFile,
    LibraryArchive,
}

impl ComponentField {
    pub const ALL: [ComponentField; 6] = [
        ComponentField::PcbFootprint,
        ComponentField::Schematic,
        ComponentField::StepModel,
        ComponentField::Pspice,
        ComponentField::PadFile,
        ComponentField::LibraryArchive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentField::PcbFootprint => "pcb_footprint",
            ComponentField::Schematic => "schematic",
            ComponentField::StepModel => "step_model",
            ComponentField::Pspice => "pspice",
            ComponentField::PadFile => "pad_file",
            ComponentField::LibraryArchive => "library_archive",
        }
    }

    pub fn category(&self) -> FileCategory {
        match self {
            ComponentField::PcbFootprint => FileCategory::Footprint,
            ComponentField::Schematic => FileCategory::Symbol,
            ComponentField::StepModel => FileCategory::Model,
            ComponentField::Pspice => FileCategory::Pspice,
            ComponentField::PadFile => FileCategory::Pad,
            ComponentField::LibraryArchive => FileCategory::Archive,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            ComponentField::PcbFootprint
            | ComponentField::PadFile
            | ComponentField::LibraryArchive => Cardinality::Multi,
            ComponentField::Schematic | ComponentField::StepModel | ComponentField::Pspice => {
                Cardinality::Single
            }
        }
    }
}

impl fmt::Display for ComponentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
