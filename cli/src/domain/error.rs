//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Automation errors ─────────────────────────────────────────────────────────

/// Errors raised while driving git, gh, or jeprof.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("`{command}` exited with code {exit_code}{}", format_output(output))]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("Invalid branch name '{0}': use letters, digits, '.', '_', '-' and '/'")]
    InvalidBranch(String),

    #[error("Invalid {field} value '{value}'")]
    InvalidField { field: String, value: String },

    #[error("Could not find a run of workflow '{workflow}' on branch '{branch}'")]
    MissingRun { workflow: String, branch: String },
}

fn format_output(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(". Output:\n{output}")
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
