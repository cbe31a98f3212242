//! Shell execution port shared by relops automation.
//!
//! Automation code issues whole command strings through [`Shell`]. The CLI
//! provides the process-spawning implementation; tests substitute
//! [`spy::SpyShell`] (feature `spy`), which replays canned results and fails
//! on any unexpected invocation.

pub mod error;
pub mod result;
#[cfg(any(test, feature = "spy"))]
pub mod spy;

pub use error::{HarnessError, ShellError};
pub use result::RunResult;
#[cfg(any(test, feature = "spy"))]
pub use spy::{FakeCommand, SpyShell};

/// Executes a command string and reports its exit code and combined output.
#[allow(async_fn_in_trait)]
pub trait Shell {
    /// Run `command` to completion.
    ///
    /// A non-zero exit code is not an error at this layer: callers decide
    /// what a failing command means.
    async fn execute(&self, command: &str) -> Result<RunResult, ShellError>;
}
