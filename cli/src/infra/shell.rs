//! Infrastructure implementation of the `Shell` port.
//!
//! `TokioShell` is the production implementation: it runs each command string
//! through `sh -c` with a guaranteed timeout and kill.

use std::process::Stdio;
use std::time::Duration;

use relops_shell::{RunResult, Shell, ShellError};
use tokio::io::AsyncReadExt;

/// Default per-command timeout.
pub const DEFAULT_SHELL_TIMEOUT: Duration = Duration::from_secs(600);

/// Production `Shell` — spawns `sh -c <command>` and captures stdout followed
/// by stderr.
///
/// The child is killed explicitly when the timeout fires, since dropping the
/// future alone does not terminate the OS process on every platform.
pub struct TokioShell {
    timeout: Duration,
}

impl TokioShell {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioShell {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL_TIMEOUT)
    }
}

impl Shell for TokioShell {
    async fn execute(&self, command: &str) -> Result<RunResult, ShellError> {
        let mut child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ShellError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                let status = status.map_err(|source| ShellError::Wait {
                    command: command.to_string(),
                    source,
                })?;
                let mut output = stdout;
                output.extend_from_slice(&stderr);
                Ok::<_, ShellError>(RunResult {
                    exit_code: status.code().unwrap_or(-1),
                    output,
                })
            } => result,
            () = tokio::time::sleep(self.timeout) => {
                let _ = child.kill().await;
                Err(ShellError::Timeout {
                    command: command.to_string(),
                    timeout: self.timeout,
                })
            }
        }
    }
}
