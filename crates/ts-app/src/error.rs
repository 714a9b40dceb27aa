//! Error types for the ts-app service layer.

use std::path::PathBuf;

use ts_catalog::ValueError;

/// Shown next to the run button when inputs are missing.
pub const INCOMPLETE_INPUTS_MESSAGE: &str =
    "Please select values for all inputs before running the simulation.";

/// Application error type wrapping the backend crates' errors for both
/// front ends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Failed to write preferences: {path}")]
    PreferencesWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Run(#[from] RunError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ts-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ts_catalog::CatalogError> for AppError {
    fn from(err: ts_catalog::CatalogError) -> Self {
        AppError::Catalog(err.to_string())
    }
}

/// Why a run request was turned down. None of these leave the
/// orchestrator in a state it cannot leave again.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunError {
    #[error("Simulation not found: {0}")]
    SimulationNotFound(String),

    #[error("{}", INCOMPLETE_INPUTS_MESSAGE)]
    IncompleteInputs,

    #[error("You have reached the maximum number of trials ({max}). Please delete one or more existing trials before running a new simulation.")]
    MaxTrialsReached { max: u32 },

    #[error("A simulation run is already in progress")]
    AlreadyRunning,

    #[error("A trial is still being removed from the table")]
    DeleteInProgress,
}

/// Why an input edit was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("No simulation is active")]
    NoSimulation,

    #[error("Unknown input: {id}")]
    UnknownInput { id: String },

    #[error("Invalid value for {id}: {source}")]
    Rejected { id: String, source: ValueError },

    #[error("Inputs are locked while a simulation is running")]
    Running,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_names_the_limit() {
        let msg = RunError::MaxTrialsReached { max: 6 }.to_string();
        assert!(msg.contains("(6)"));
        assert!(msg.contains("delete"));
    }

    #[test]
    fn catalog_errors_convert() {
        let err: AppError = ts_catalog::CatalogError::UnsupportedFormat("toml".into()).into();
        assert!(matches!(err, AppError::Catalog(msg) if msg.contains("toml")));
    }
}
