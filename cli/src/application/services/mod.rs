//! Application services — use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports` — never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod experiment;
pub mod profiler;

use anyhow::{Context, Result};
use relops_shell::RunResult;

use crate::application::ports::Shell;
use crate::domain::AutomationError;

/// Run `command`, whatever its exit code.
pub async fn run(shell: &impl Shell, command: &str) -> Result<RunResult> {
    shell
        .execute(command)
        .await
        .with_context(|| format!("running `{command}`"))
}

/// Run `command` and treat a non-zero exit code as
/// [`AutomationError::CommandFailed`].
pub async fn run_checked(shell: &impl Shell, command: &str) -> Result<RunResult> {
    let result = run(shell, command).await?;
    if !result.success() {
        return Err(AutomationError::CommandFailed {
            command: command.to_string(),
            exit_code: result.exit_code,
            output: result.stdout_lossy(),
        }
        .into());
    }
    Ok(result)
}
