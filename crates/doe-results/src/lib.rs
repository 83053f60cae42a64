//! doe-results: content-addressed storage of completed DOE cases.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::compute_case_id;
pub use store::CaseStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Case not found: {case_id}")]
    CaseNotFound { case_id: String },
}
