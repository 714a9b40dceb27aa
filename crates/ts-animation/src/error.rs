//! Error types for animation engine operations.

use thiserror::Error;

/// Errors reported by an animation engine or the adapter around it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    #[error("No animation resource specified")]
    NoResource,

    #[error("Failed to load animation '{resource}': {message}")]
    LoadFailed { resource: String, message: String },

    #[error("State machine not found: {name}")]
    StateMachineMissing { name: String },

    #[error("Unknown state machine input: {name}")]
    UnknownInput { name: String },

    #[error("Animation not ready")]
    NotReady,

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    #[error("Engine error: {message}")]
    Backend { message: String },
}

pub type AnimationResult<T> = Result<T, AnimationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AnimationError::LoadFailed {
            resource: "plant.riv".to_string(),
            message: "404".to_string(),
        };
        assert!(err.to_string().contains("plant.riv"));
        assert!(err.to_string().contains("404"));
    }
}
