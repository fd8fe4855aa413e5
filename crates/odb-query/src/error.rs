//! Error types for query construction

use thiserror::Error;

/// Query construction error type
#[derive(Error, Debug)]
pub enum QueryError {
    /// No command is registered under the operation identifier
    #[error("command {id} not found in registry")]
    CommandNotFound { id: String },

    /// The active command does not support the requested refinement
    #[error("command '{command}' does not support '{refinement}'")]
    UnsupportedRefinement {
        command: &'static str,
        refinement: &'static str,
    },

    /// A command rejected its constructor or refinement arguments
    #[error("invalid arguments for '{command}': {reason}")]
    InvalidArguments {
        command: &'static str,
        reason: String,
    },

    /// String is not a record identifier
    #[error("'{0}' is not a valid record identifier")]
    InvalidRid(String),

    /// Configuration is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// I/O error while loading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QueryError {
    pub(crate) fn not_found(id: impl Into<String>) -> Self {
        Self::CommandNotFound { id: id.into() }
    }

    pub(crate) fn unsupported(command: &'static str, refinement: &'static str) -> Self {
        Self::UnsupportedRefinement {
            command,
            refinement,
        }
    }

    pub(crate) fn invalid(command: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            command,
            reason: reason.into(),
        }
    }
}

/// Result type for query construction
pub type QueryResult<T> = Result<T, QueryError>;
