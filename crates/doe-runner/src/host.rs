//! Capability interface over the live simulation host.

/// Opaque failure raised by the host or its solver.
///
/// The message is whatever the host reported; this layer does not decode it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type HostResult<T> = Result<T, HostError>;

/// The host operations one experiment case needs.
///
/// An implementation wraps the simulation model owned by the host
/// application. Calls are blocking; convergence and solver failure handling
/// belong to the host. Exactly one caller drives a host at a time, which is
/// why every mutating call takes `&mut self`.
pub trait ExperimentHost {
    /// Whether a monitor with this name exists in the host model.
    fn has_monitor(&self, name: &str) -> bool;

    /// Discard the current solution. Irreversible.
    fn clear_solution(&mut self) -> HostResult<()>;

    /// Advance the solve by exactly `iterations` steps.
    fn run_iterations(&mut self, iterations: u32) -> HostResult<()>;

    /// Latest value of a named scalar monitor.
    fn read_monitor(&self, name: &str) -> HostResult<f64>;

    /// Write a line to the host's output window.
    fn print_line(&mut self, _line: &str) {}
}

impl<H: ExperimentHost + ?Sized> ExperimentHost for &mut H {
    fn has_monitor(&self, name: &str) -> bool {
        (**self).has_monitor(name)
    }

    fn clear_solution(&mut self) -> HostResult<()> {
        (**self).clear_solution()
    }

    fn run_iterations(&mut self, iterations: u32) -> HostResult<()> {
        (**self).run_iterations(iterations)
    }

    fn read_monitor(&self, name: &str) -> HostResult<f64> {
        (**self).read_monitor(name)
    }

    fn print_line(&mut self, line: &str) {
        (**self).print_line(line)
    }
}
