//! Naming policy helpers.
//!
//! Pure functions that derive canonical filenames from component attributes
//! (manufacturer part number, package size) while preserving the original
//! extension and any recognized density variant suffix. Advisory only:
//! callers surface the suggestion to the operator and apply it through the
//! normal rename path.

use crate::constants::DENSITY_SUFFIXES;

/// A filename split into stem, recognized density suffix, and extension.
/// `base + suffix + ext` reassembles the original name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub base: String,
    pub suffix: String,
    pub ext: String,
}

/// Split a filename into base, density suffix, and extension. The suffix is
/// only recognized from the fixed set (`-M`, `-N`, `-L`, case-insensitive)
/// and only at the end of the stem; otherwise it is empty.
pub fn split_density_suffix(file_name: &str) -> NameParts {
    let (stem, ext) = match file_name.rfind('.') {
        // A leading dot is part of the stem, not an extension separator.
        Some(idx) if idx > 0 => (&file_name[..idx], &file_name[idx..]),
        _ => (file_name, ""),
    };

    for candidate in DENSITY_SUFFIXES {
        if stem.len() > candidate.len()
            && stem[stem.len() - candidate.len()..].eq_ignore_ascii_case(candidate)
        {
            let split = stem.len() - candidate.len();
            return NameParts {
                base: stem[..split].to_string(),
                suffix: stem[split..].to_string(),
                ext: ext.to_string(),
            };
        }
    }

    NameParts {
        base: stem.to_string(),
        suffix: String::new(),
        ext: ext.to_string(),
    }
}

/// Replace characters that are illegal in filenames (and all whitespace)
/// with underscores.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() || c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Derive a filename from the manufacturer part number, keeping the original
/// file's density suffix and extension. Returning the input unchanged means
/// the name already follows the policy; callers treat that as a no-op.
pub fn apply_mpn_policy(file_name: &str, mpn: &str) -> String {
    let parts = split_density_suffix(file_name);
    format!("{}{}{}", sanitize_name(mpn), parts.suffix, parts.ext)
}

/// Derive a filename from the package/footprint size, keeping only the
/// original extension.
pub fn apply_package_policy(file_name: &str, package_size: &str) -> String {
    let parts = split_density_suffix(file_name);
    format!("{}{}", sanitize_name(package_size), parts.ext)
}
