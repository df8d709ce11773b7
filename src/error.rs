//! Error types for the command line layer.
//!
//! Library failures arrive as [`crate::bundler::Error`]; this module wraps
//! them together with argument and configuration problems and decides the
//! process exit code.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all CLI operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bundler errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Configuration loading errors
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Process exit code for this error.
    ///
    /// External tool failures propagate the tool's own exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            BundlerError::Bundler(e) => e.exit_code(),
            _ => 1,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error as E;

        let inner = match self {
            BundlerError::Bundler(E::TaskFailed { source, .. }) => source.as_ref(),
            BundlerError::Bundler(e) => e,
            _ => return vec!["Check the error message above for specific details".to_string()],
        };

        match inner {
            E::StaleBundle(_) | E::UnexpectedContents(_) => {
                vec!["Run `cleanall` and try again".to_string()]
            }
            E::EmptyBundle(_) => vec!["Run `langchain` to populate the bundle".to_string()],
            E::MissingArchive(_) => vec!["Run `zip` to create the archive".to_string()],
            E::ToolNotFound { tool, .. } => vec![format!(
                "Install `{tool}` or point [tools] in snowpoc.toml at it"
            )],
            E::ToolFailed { .. } => vec![
                "Check the tool output above".to_string(),
                "A partially populated bundle stays on disk; run `cleanall` before retrying"
                    .to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
