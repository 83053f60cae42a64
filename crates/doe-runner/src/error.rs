//! Error types for experiment execution.

use thiserror::Error;

use crate::host::HostError;

/// Errors encountered while binding to or driving the host.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Monitor not found in host: {name}")]
    MonitorNotFound { name: String },

    #[error("External operation failed: {0}")]
    External(#[from] HostError),

    #[error(transparent)]
    Params(#[from] doe_params::ParamsError),
}

pub type RunResult<T> = Result<T, RunError>;
