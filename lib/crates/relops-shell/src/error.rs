//! Error types for shell execution and the spy harness.

use std::time::Duration;

use thiserror::Error;

/// Divergence between the scripted expectations of a spy shell and the
/// commands actually issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    #[error("unexpected command\n  expected: {expected}\n  actual:   {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("no expected commands left, but got: {actual}")]
    Exhausted { actual: String },

    #[error("{} expected command(s) never ran:\n  {}", remaining.len(), remaining.join("\n  "))]
    Unconsumed { remaining: Vec<String> },
}

/// Errors surfaced by [`crate::Shell`] implementations.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Harness(#[from] HarnessError),

    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for `{command}`")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {}s", timeout.as_secs())]
    Timeout { command: String, timeout: Duration },
}
