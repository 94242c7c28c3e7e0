//! Static configuration tables: extension routing and density suffixes.

use crate::models::FileCategory;

/// Extension-to-category routing table used for uploads and archive
/// expansion. Matching is case-insensitive; extensions are listed without
/// the leading dot.
pub const EXTENSION_TABLE: &[(&str, FileCategory)] = &[
    ("kicad_mod", FileCategory::Footprint),
    ("brd", FileCategory::Footprint),
    ("mod", FileCategory::Footprint),
    ("kicad_sym", FileCategory::Symbol),
    ("lib", FileCategory::Symbol),
    ("olb", FileCategory::Symbol),
    ("bxl", FileCategory::Symbol),
    ("schlib", FileCategory::Symbol),
    ("bsm", FileCategory::Symbol),
    ("step", FileCategory::Model),
    ("stp", FileCategory::Model),
    ("iges", FileCategory::Model),
    ("igs", FileCategory::Model),
    ("wrl", FileCategory::Model),
    ("3ds", FileCategory::Model),
    ("x_t", FileCategory::Model),
    ("cir", FileCategory::Pspice),
    ("sub", FileCategory::Pspice),
    ("inc", FileCategory::Pspice),
    ("psm", FileCategory::Pspice),
    ("fsm", FileCategory::Pspice),
    ("pad", FileCategory::Pad),
    ("plb", FileCategory::Pad),
    ("zip", FileCategory::Archive),
];

/// Recognized footprint density variant suffixes (matched case-insensitively
/// at the end of the file stem).
pub const DENSITY_SUFFIXES: [&str; 3] = ["-M", "-N", "-L"];

/// Extension of a filename, lowercased, without the leading dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Route a filename to its category by extension. `None` means the file is
/// not a recognized CAD asset.
pub fn category_for_file(file_name: &str) -> Option<FileCategory> {
    let ext = extension_of(file_name)?;
    EXTENSION_TABLE
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, category)| *category)
}
