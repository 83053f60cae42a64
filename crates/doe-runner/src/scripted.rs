//! A host that replays fixed monitor values.

use std::collections::BTreeMap;

use doe_core::ChannelPair;
use doe_params::ParameterStore;

use crate::error::RunResult;
use crate::host::{ExperimentHost, HostError, HostResult};
use crate::runner::MonitorSet;

/// Host stand-in whose monitors report preset values after every solve.
///
/// Calls are counted so a run can be inspected afterwards.
#[derive(Clone, Debug, Default)]
pub struct ScriptedHost {
    monitors: BTreeMap<String, f64>,
    fail_on_run: bool,
    has_solution: bool,
    clears: usize,
    iterations_run: u64,
    output: Vec<String>,
}

impl ScriptedHost {
    /// Key prefix for monitor values in a parameter file.
    pub const MONITOR_PREFIX: &'static str = "monitor.";
    /// Integer key that makes every solve fail when non-zero.
    pub const FAIL_KEY: &'static str = "fail_on_run";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_monitor(mut self, name: impl Into<String>, value: f64) -> Self {
        self.monitors.insert(name.into(), value);
        self
    }

    /// Report `max` and `min` on the four monitors named in `monitors`.
    pub fn with_channel_extrema(monitors: &MonitorSet, max: ChannelPair, min: ChannelPair) -> Self {
        Self::new()
            .with_monitor(monitors.max_large.clone(), max.large)
            .with_monitor(monitors.max_small.clone(), max.small)
            .with_monitor(monitors.min_large.clone(), min.large)
            .with_monitor(monitors.min_small.clone(), min.small)
    }

    /// Make every `run_iterations` call fail.
    pub fn failing_runs(mut self) -> Self {
        self.fail_on_run = true;
        self
    }

    /// Build from `monitor.<Name>:float:<value>` entries.
    pub fn from_store(store: &ParameterStore) -> RunResult<Self> {
        let mut host = Self::new();
        for (name, value) in store.floats_with_prefix(Self::MONITOR_PREFIX) {
            host.monitors.insert(name.to_string(), value);
        }
        if store.contains(Self::FAIL_KEY) {
            host.fail_on_run = store.get_integer(Self::FAIL_KEY)? != 0;
        }
        Ok(host)
    }

    pub fn set_monitor(&mut self, name: &str, value: f64) {
        self.monitors.insert(name.to_string(), value);
    }

    pub fn monitor_names(&self) -> impl Iterator<Item = &str> {
        self.monitors.keys().map(String::as_str)
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn iterations_run(&self) -> u64 {
        self.iterations_run
    }

    pub fn output_lines(&self) -> &[String] {
        &self.output
    }
}

impl ExperimentHost for ScriptedHost {
    fn has_monitor(&self, name: &str) -> bool {
        self.monitors.contains_key(name)
    }

    fn clear_solution(&mut self) -> HostResult<()> {
        self.has_solution = false;
        self.clears += 1;
        Ok(())
    }

    fn run_iterations(&mut self, iterations: u32) -> HostResult<()> {
        if self.fail_on_run {
            return Err(HostError::new("scripted solver failure"));
        }
        self.iterations_run += u64::from(iterations);
        self.has_solution = true;
        Ok(())
    }

    fn read_monitor(&self, name: &str) -> HostResult<f64> {
        if !self.has_solution {
            return Err(HostError::new(format!("monitor {name} has no data")));
        }
        self.monitors
            .get(name)
            .copied()
            .ok_or_else(|| HostError::new(format!("no monitor named {name}")))
    }

    fn print_line(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_store_reads_prefixed_monitors() {
        let store = ParameterStore::parse_str(
            "monitor.MaxPressure_LargeCh:float:100\nmonitor.Other:float:1.5\nunrelated:float:9\n",
            "script",
        )
        .unwrap();
        let host = ScriptedHost::from_store(&store).unwrap();
        let names: Vec<&str> = host.monitor_names().collect();
        assert_eq!(names, vec!["MaxPressure_LargeCh", "Other"]);
        assert!(!host.has_monitor("unrelated"));
    }

    #[test]
    fn fail_key_must_be_integer() {
        let store = ParameterStore::parse_str("fail_on_run:string:yes", "script").unwrap();
        assert!(ScriptedHost::from_store(&store).is_err());

        let store = ParameterStore::parse_str("fail_on_run:integer:1", "script").unwrap();
        let mut host = ScriptedHost::from_store(&store).unwrap();
        assert!(host.run_iterations(5).is_err());
        assert_eq!(host.iterations_run(), 0);
    }

    #[test]
    fn monitors_have_no_data_until_solved() {
        let mut host = ScriptedHost::new().with_monitor("p", 3.0);
        assert!(host.read_monitor("p").is_err());
        host.run_iterations(1).unwrap();
        assert_eq!(host.read_monitor("p").unwrap(), 3.0);
        host.clear_solution().unwrap();
        assert!(host.read_monitor("p").is_err());
    }
}
