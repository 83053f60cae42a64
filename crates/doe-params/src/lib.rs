//! doe-params: input formats and typed parameter records.
//!
//! Two readers feed the same records:
//! - [`ParameterStore`] for the typed `key:type:value` format
//! - [`LegacyGeometryReader`] for the three fixed positional layouts

pub mod coupling;
pub mod input;
pub mod legacy;
pub mod records;
pub mod store;

use std::path::PathBuf;

pub use coupling::{CouplingScheme, CouplingSettings, RendezvousLeader};
pub use input::{InputFormat, load_geometry, load_mesh_elements, load_mesh_spacing};
pub use legacy::{
    GEOMETRY_LAYOUT, LegacyGeometryReader, MESH_ELEMENT_LAYOUT, MESH_SPACING_LAYOUT, Step,
    geometry_from_str, mesh_elements_from_str, mesh_spacing_from_str, read_geometry,
    read_mesh_elements, read_mesh_spacing,
};
pub use records::{GeometryRecord, MeshCounts, MeshElementRecord, MeshSpacingRecord, ZoneSpacing};
pub use store::{ParamType, ParamValue, ParameterStore};

pub type ParamsResult<T> = Result<T, ParamsError>;

#[derive(thiserror::Error, Debug)]
pub enum ParamsError {
    #[error("Parse error in {origin} at line {line}: {message}")]
    Parse {
        origin: String,
        line: usize,
        message: String,
    },

    #[error("Key not found: {key} (as {expected})")]
    KeyNotFound { key: String, expected: ParamType },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Result not available: {what}")]
    UninitializedResult { what: &'static str },

    #[error("Failed to read input file: {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] doe_core::CoreError),
}

impl ParamsError {
    /// True for failures caused by unreadable or malformed input.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, ParamsError::Parse { .. } | ParamsError::Io { .. })
    }
}

pub(crate) fn read_input(path: &std::path::Path) -> ParamsResult<String> {
    std::fs::read_to_string(path).map_err(|source| ParamsError::Io {
        path: path.to_path_buf(),
        source,
    })
}
