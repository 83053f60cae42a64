//! Stored case data.

use doe_core::ChannelPair;
use doe_params::{MeshCounts, MeshSpacingRecord};
use doe_runner::CaseOutcome;
use serde::{Deserialize, Serialize};

pub type CaseId = String;

/// One completed case: its inputs and the pressures it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: CaseId,
    pub case_name: String,
    pub timestamp: String,
    pub iterations: u32,
    pub mesh: MeshCounts,
    pub spacing: MeshSpacingRecord,
    pub mesh_density: f64,
    pub max_pressures: ChannelPair,
    pub min_pressures: ChannelPair,
    pub pressure_drops: ChannelPair,
}

impl CaseRecord {
    /// Stamp an outcome with its id and the current UTC time.
    pub fn from_outcome(
        case_id: impl Into<CaseId>,
        outcome: &CaseOutcome,
        mesh: MeshCounts,
        spacing: MeshSpacingRecord,
        iterations: u32,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            case_name: outcome.name.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            iterations,
            mesh,
            spacing,
            mesh_density: outcome.mesh_density,
            max_pressures: outcome.max_pressures,
            min_pressures: outcome.min_pressures,
            pressure_drops: outcome.pressure_drops,
        }
    }

    /// Rebuild the runner-side outcome, e.g. for a case served from cache.
    pub fn to_outcome(&self) -> CaseOutcome {
        CaseOutcome {
            name: self.case_name.clone(),
            mesh_density: self.mesh_density,
            max_pressures: self.max_pressures,
            min_pressures: self.min_pressures,
            pressure_drops: self.pressure_drops,
        }
    }
}
