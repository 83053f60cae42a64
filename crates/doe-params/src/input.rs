//! Format-agnostic record loading.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::ParamsResult;
use crate::legacy;
use crate::records::{GeometryRecord, MeshElementRecord, MeshSpacingRecord};
use crate::store::ParameterStore;

/// Which reader a record file is written for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// Fixed positional layout.
    #[default]
    Legacy,
    /// `key:type:value` parameter file.
    Typed,
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "typed" => Ok(Self::Typed),
            other => Err(format!("unknown input format '{other}'")),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Typed => write!(f, "typed"),
        }
    }
}

pub fn load_geometry(path: &Path, format: InputFormat) -> ParamsResult<GeometryRecord> {
    match format {
        InputFormat::Legacy => legacy::read_geometry(path),
        InputFormat::Typed => GeometryRecord::from_store(&ParameterStore::from_file(path)?),
    }
}

pub fn load_mesh_elements(path: &Path, format: InputFormat) -> ParamsResult<MeshElementRecord> {
    match format {
        InputFormat::Legacy => legacy::read_mesh_elements(path),
        InputFormat::Typed => MeshElementRecord::from_store(&ParameterStore::from_file(path)?),
    }
}

pub fn load_mesh_spacing(path: &Path, format: InputFormat) -> ParamsResult<MeshSpacingRecord> {
    match format {
        InputFormat::Legacy => legacy::read_mesh_spacing(path),
        InputFormat::Typed => MeshSpacingRecord::from_store(&ParameterStore::from_file(path)?),
    }
}
