use std::io;

use thiserror::Error;

use crate::domain::validation::ValidationError;

/// Library-wide error type for collabflow operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Configuration values failed validation.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Required environment variable is not set.
    #[error("Environment variable '{0}' is not set")]
    EnvironmentVariableMissing(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// User input was rejected before contacting the server.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend rejected a call or could not be reached.
    #[error("{message}")]
    Api { message: String, status: Option<u16> },

    /// A collaboration request arrived without fields the workflow depends on.
    #[error("Collaboration request is incomplete: missing {}", missing.join(", "))]
    DataIntegrity { missing: Vec<String> },

    /// Identifier is empty or otherwise unusable.
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// The requested operation is not available in the workflow's current state.
    #[error("'{action}' is not available while {state}")]
    IllegalAction { action: String, state: String },

    /// The workflow already reported its terminal outcome.
    #[error("Workflow has already finished")]
    WorkflowFinished,

    /// Interactive prompt failed.
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// Parse error.
    #[error("Failed to parse {what}: {details}")]
    ParseError { what: String, details: String },
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn api<S: Into<String>>(message: S, status: Option<u16>) -> Self {
        AppError::Api { message: message.into(), status }
    }

    /// Message suitable for inline display next to the control that triggered it.
    pub fn inline_message(&self) -> String {
        match self {
            AppError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            AppError::Api { .. } => GENERIC_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Provide an `io::ErrorKind`-like view for callers mapping to exit codes.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            AppError::Io(err) => err.kind(),
            AppError::Configuration(_)
            | AppError::InvalidConfig(_)
            | AppError::TomlParseError(_)
            | AppError::Validation(_)
            | AppError::DataIntegrity { .. }
            | AppError::InvalidIdentifier(_)
            | AppError::ParseError { .. } => io::ErrorKind::InvalidInput,
            AppError::EnvironmentVariableMissing(_) => io::ErrorKind::NotFound,
            AppError::Api { status: Some(404), .. } => io::ErrorKind::NotFound,
            AppError::Api { status: Some(401 | 403), .. } => io::ErrorKind::PermissionDenied,
            AppError::Api { status: None, .. } => io::ErrorKind::ConnectionRefused,
            AppError::IllegalAction { .. } | AppError::WorkflowFinished => {
                io::ErrorKind::Unsupported
            }
            AppError::Prompt(_) => io::ErrorKind::Interrupted,
            AppError::Api { .. } => io::ErrorKind::Other,
        }
    }
}

/// Shown when the server gives no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_integrity_lists_every_missing_field() {
        let err = AppError::DataIntegrity { missing: vec!["id".into(), "products".into()] };
        assert_eq!(err.to_string(), "Collaboration request is incomplete: missing id, products");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn inline_message_prefers_server_text() {
        let err = AppError::api("Commission already negotiated", Some(409));
        assert_eq!(err.inline_message(), "Commission already negotiated");
    }

    #[test]
    fn inline_message_falls_back_to_generic_text() {
        let err = AppError::api("  ", Some(500));
        assert_eq!(err.inline_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn transport_failures_map_to_connection_refused() {
        let err = AppError::api("HTTP request failed: connection refused", None);
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
    }
}
