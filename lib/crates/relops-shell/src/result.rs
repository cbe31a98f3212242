//! Outcome of a real or faked command execution.

/// Exit code plus the captured output bytes (stdout followed by stderr).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunResult {
    /// Process exit code. `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    /// Combined stdout and stderr.
    pub output: Vec<u8>,
}

impl RunResult {
    #[must_use]
    pub fn new(exit_code: i32, output: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    /// Exit code 0 with the given output.
    #[must_use]
    pub fn ok(output: impl Into<Vec<u8>>) -> Self {
        Self::new(0, output)
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Output decoded as UTF-8 (lossy) with surrounding whitespace removed.
    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).trim().to_string()
    }
}
