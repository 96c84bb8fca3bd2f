use shared::{
    domain::Severity,
    error::{ErrorCode, FlowFailure},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
}

impl FlowError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Text shown to the user in the notification toast.
    pub fn message(&self) -> &str {
        match self {
            FlowError::Validation(message) | FlowError::Clipboard(message) => message,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FlowError::Validation(_) => Severity::Warning,
            FlowError::Clipboard(_) => Severity::Error,
        }
    }
}

impl From<&FlowError> for FlowFailure {
    fn from(value: &FlowError) -> Self {
        match value {
            FlowError::Validation(message) => FlowFailure::new(ErrorCode::Validation, message),
            FlowError::Clipboard(message) => FlowFailure::new(ErrorCode::Capability, message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{capability} unavailable: {reason}")]
pub struct CapabilityError {
    pub capability: &'static str,
    pub reason: String,
}

impl CapabilityError {
    pub fn new(capability: &'static str, reason: impl Into<String>) -> Self {
        Self {
            capability,
            reason: reason.into(),
        }
    }
}
