//! Error type for the command-line front end.

/// Wraps the library errors so every command can use `?`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Params(#[from] doe_params::ParamsError),

    #[error(transparent)]
    Run(#[from] doe_runner::RunError),

    #[error("Results error: {0}")]
    Results(#[from] doe_results::ResultsError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type CliResult<T> = Result<T, CliError>;
