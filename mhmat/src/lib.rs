//! # MHMAT
//!
//! Reader and writer for MakeHuman `.mhmat` material files.
//!
//! An MHMAT file is a list of `key value` lines describing one material:
//! metadata, colors, texture files, intensities, subsurface scattering,
//! rendering switches and a trailing shader section.
//!
//! ## Features
//!
//! - **Key registry**: every known key with its kind, default and output group
//! - **Forgiving parser**: unknown keys and malformed lines become diagnostics
//! - **Deterministic writer**: grouped output in a fixed order
//! - **Custom I/O**: read and write through any [`io::FileSystem`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mhmat::MhMat;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut material = MhMat::from_file("skins/young_caucasian.mhmat")?;
//!
//! for diagnostic in material.diagnostics() {
//!     println!("{diagnostic}");
//! }
//!
//! material.settings_mut().set_float("roughness", 0.45);
//! material.write_file("skins/young_caucasian_rough.mhmat")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Lower-level API
//!
//! [`parser::MhmatReader`] and [`writer::serialize`] work on plain
//! [`SettingsMap`]s without defaults:
//!
//! ```rust
//! use mhmat::{parser::MhmatReader, writer, ShaderConfig};
//!
//! # fn main() -> mhmat::Result<()> {
//! let parsed = MhmatReader::new().parse_str("name skin\nopacity 0.5\n")?;
//! let text = writer::serialize(&parsed.settings, &ShaderConfig::new(), None)?;
//! assert!(text.contains("opacity 0.5000"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Re-export common types for convenience
pub use crate::{
    error::{Error, Result},
    keys::{mhmat_keys, KeyDefinition, KeyGroup, KeyKind, PathRule, Registry},
    material::{BlendMaterialRef, MaterialBuilder, MaterialSource, MhMat},
    parser::{parse, Diagnostic, DiagnosticKind, MhmatReader, ParsedMaterial},
    settings::{SettingsMap, ShaderConfig, ShaderFeatures},
    types::Color,
    value::Value,
    writer::serialize,
};

// Re-export logging functionality
pub use crate::logging::{LogLevel, LogStream, Logger};

// Re-export presets
pub use crate::presets::{License, Litsphere};

// Public modules
pub mod error;
pub mod io;
pub mod keys;
pub mod logging;
pub mod material;
pub mod parser;
pub mod presets;
pub mod settings;
pub mod types;
pub mod value;
pub mod writer;

/// File extension of material files, without the dot
pub const MHMAT_EXTENSION: &str = "mhmat";

/// Check whether a path has the `.mhmat` extension, ignoring case
pub fn is_mhmat_file<P: AsRef<std::path::Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MHMAT_EXTENSION))
}

/// Version information
pub mod version {
    /// Get the crate version
    pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Number of keys in the standard registry, shader section excluded
    pub fn standard_key_count() -> usize {
        crate::Registry::standard().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!version::CRATE_VERSION.is_empty());
        assert_eq!(version::standard_key_count(), 49);
    }

    #[test]
    fn test_is_mhmat_file() {
        assert!(is_mhmat_file("skins/young.mhmat"));
        assert!(is_mhmat_file("SKIN.MHMAT"));
        assert!(!is_mhmat_file("skin.mhclo"));
        assert!(!is_mhmat_file("mhmat"));
    }
}
