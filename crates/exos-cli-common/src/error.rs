//! Error types for switch CLI operations.
//!
//! All errors implement `std::error::Error` via `thiserror`.

use std::io;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur while issuing commands or parsing their output.
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to spawn the shell running a CLI command.
    #[error("Failed to execute CLI command '{command}': {source}")]
    ShellExec {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// CLI command returned non-zero exit code.
    #[error("CLI command failed: '{command}' (exit code {exit_code}): {output}")]
    CommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// No canned output registered for a command.
    #[error("No output registered for command '{command}'")]
    UnknownCommand {
        /// The command that was requested.
        command: String,
    },

    /// Reply could not be interpreted in the expected format.
    #[error("Invalid reply to '{command}': {message}")]
    InvalidReply {
        /// The command whose reply was rejected.
        command: String,
        /// Error message.
        message: String,
    },

    /// A required field was missing from a reply row.
    #[error("Reply to '{command}' is missing field '{field}'")]
    MissingField {
        /// The command whose reply was incomplete.
        command: String,
        /// The missing field name.
        field: String,
    },

    /// The reply's data array held no rows.
    #[error("Reply to '{command}' contained no data rows")]
    EmptyReply {
        /// The command that returned nothing.
        command: String,
    },

    /// Malformed XML inside a `<reply>` block.
    #[error("Malformed XML reply: {message}")]
    Xml {
        /// Parser error message.
        message: String,
    },

    /// Platform type variable held an unrecognized value.
    #[error("Unknown platform type: {}", .value.as_deref().unwrap_or("None"))]
    UnknownPlatform {
        /// The raw platform type value, if set.
        value: Option<String>,
    },

    /// Interactive prompt input ended before an answer was given.
    #[error("Prompt input closed before an answer was given")]
    PromptClosed,

    /// Interactive prompt received too many invalid answers.
    #[error("No valid answer after {attempts} attempts")]
    PromptExhausted {
        /// Number of attempts made.
        attempts: usize,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Creates an invalid reply error.
    pub fn invalid_reply(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidReply {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(command: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            command: command.into(),
            field: field.into(),
        }
    }

    /// Creates an empty reply error.
    pub fn empty_reply(command: impl Into<String>) -> Self {
        Self::EmptyReply {
            command: command.into(),
        }
    }

    /// Creates an XML error.
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }

    /// Returns true if the error came from the switch rejecting or failing
    /// to run a command, as opposed to a problem parsing its output.
    pub fn is_command_failure(&self) -> bool {
        matches!(
            self,
            CliError::ShellExec { .. }
                | CliError::CommandFailed { .. }
                | CliError::UnknownCommand { .. }
        )
    }
}
