//! Single-case experiment runner.

use doe_core::ChannelPair;
use doe_params::{MeshElementRecord, MeshSpacingRecord};
use tracing::{debug, info};

use crate::error::{RunError, RunResult};
use crate::host::ExperimentHost;

/// Names of the four pressure monitors read back after each case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonitorSet {
    pub max_large: String,
    pub min_large: String,
    pub max_small: String,
    pub min_small: String,
}

impl Default for MonitorSet {
    fn default() -> Self {
        Self {
            max_large: "MaxPressure_LargeCh".to_string(),
            min_large: "MinPressure_LargeCh".to_string(),
            max_small: "MaxPressure_SmallCh".to_string(),
            min_small: "MinPressure_SmallCh".to_string(),
        }
    }
}

impl MonitorSet {
    pub fn names(&self) -> [&str; 4] {
        [
            &self.max_large,
            &self.min_large,
            &self.max_small,
            &self.min_small,
        ]
    }
}

/// Runs cases against a host and records the pressure extrema.
///
/// The runner owns its host, so a host is driven by one runner at a time.
pub struct ExperimentRunner<H> {
    host: H,
    monitors: MonitorSet,
}

impl<H: ExperimentHost> ExperimentRunner<H> {
    /// Bind to the default monitor names.
    pub fn new(host: H) -> RunResult<Self> {
        Self::with_monitors(host, MonitorSet::default())
    }

    /// Bind to custom monitor names; every name must exist in the host.
    pub fn with_monitors(host: H, monitors: MonitorSet) -> RunResult<Self> {
        if let Some(missing) = monitors.names().into_iter().find(|n| !host.has_monitor(n)) {
            return Err(RunError::MonitorNotFound {
                name: missing.to_string(),
            });
        }
        Ok(Self { host, monitors })
    }

    pub fn monitors(&self) -> &MonitorSet {
        &self.monitors
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Clear the solution, iterate, and store the monitor extrema in `mesh`.
    ///
    /// Host failures are returned as-is with no retry. Any extrema already in
    /// `mesh` are dropped before the solve starts, so a failed case leaves
    /// the record without results.
    pub fn run_case(
        &mut self,
        mesh: &mut MeshElementRecord,
        spacing: &MeshSpacingRecord,
        iterations: u32,
    ) -> RunResult<()> {
        let density = mesh.mesh_density();
        info!(mesh_density = density, iterations, "running case");
        debug!(?spacing, "mesh spacing for case");
        self.host
            .print_line(&format!("Running case with fluid mesh density at {density}"));

        mesh.clear_pressures();
        self.host.clear_solution()?;
        self.host.run_iterations(iterations)?;

        let max_large = self.host.read_monitor(&self.monitors.max_large)?;
        let min_large = self.host.read_monitor(&self.monitors.min_large)?;
        let max_small = self.host.read_monitor(&self.monitors.max_small)?;
        let min_small = self.host.read_monitor(&self.monitors.min_small)?;
        let max = ChannelPair::new(max_large, max_small);
        let min = ChannelPair::new(min_large, min_small);

        mesh.set_max_pressures(max.large, max.small);
        mesh.set_min_pressures(min.large, min.small);
        debug!(%max, %min, "recorded pressure extrema");
        Ok(())
    }
}
