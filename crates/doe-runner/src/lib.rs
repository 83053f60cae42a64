//! Experiment execution for the channel-flow DOE pipeline.
//!
//! Provides:
//! - the [`ExperimentHost`] capability implemented against a live solver host
//! - [`ExperimentRunner`], which runs one case and records pressure extrema
//! - DOE plan execution with progress reporting
//! - [`ScriptedHost`], a host replaying fixed monitor values

pub mod error;
pub mod host;
pub mod plan;
pub mod runner;
pub mod scripted;

pub use error::{RunError, RunResult};
pub use host::{ExperimentHost, HostError, HostResult};
pub use plan::{
    CaseOutcome, CaseSpec, DoePlan, PlanProgressEvent, PlanStage, run_plan,
    run_plan_with_progress,
};
pub use runner::{ExperimentRunner, MonitorSet};
pub use scripted::ScriptedHost;
