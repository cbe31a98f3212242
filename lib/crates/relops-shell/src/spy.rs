//! Scripted stand-in for real command execution.
//!
//! A [`SpyShell`] is created per test with the exact sequence of commands the
//! code under test must issue and the result each one returns. Commands are
//! matched strictly in order by string equality; the first divergence is an
//! error. Finish the test with [`SpyShell::assert_all_consumed`].

use std::cell::Cell;

use crate::{HarnessError, RunResult, Shell, ShellError};

/// One expected command string and the canned result it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCommand {
    command: String,
    result: RunResult,
}

impl FakeCommand {
    #[must_use]
    pub fn new(command: impl Into<String>, result: RunResult) -> Self {
        Self {
            command: command.into(),
            result,
        }
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    #[must_use]
    pub fn result(&self) -> &RunResult {
        &self.result
    }
}

/// FIFO harness of [`FakeCommand`]s. Never spawns a process.
#[derive(Debug)]
pub struct SpyShell {
    expected: Vec<FakeCommand>,
    cursor: Cell<usize>,
}

impl SpyShell {
    /// Script the commands the code under test is expected to run, in order.
    #[must_use]
    pub fn expect(commands: Vec<FakeCommand>) -> Self {
        Self {
            expected: commands,
            cursor: Cell::new(0),
        }
    }

    /// Match `command` against the next expectation and return its result.
    ///
    /// The cursor only advances on a match.
    pub fn invoke(&self, command: &str) -> Result<RunResult, HarnessError> {
        let index = self.cursor.get();
        let Some(next) = self.expected.get(index) else {
            return Err(HarnessError::Exhausted {
                actual: command.to_string(),
            });
        };
        if next.command != command {
            return Err(HarnessError::Mismatch {
                expected: next.command.clone(),
                actual: command.to_string(),
            });
        }
        self.cursor.set(index + 1);
        Ok(next.result.clone())
    }

    /// Fail with the leftover commands if any expectation never ran.
    pub fn assert_all_consumed(&self) -> Result<(), HarnessError> {
        let remaining = self.remaining();
        if remaining.is_empty() {
            return Ok(());
        }
        Err(HarnessError::Unconsumed {
            remaining: remaining.iter().map(|c| c.command.clone()).collect(),
        })
    }

    /// Expectations not yet matched, in the order they are still expected.
    #[must_use]
    pub fn remaining(&self) -> &[FakeCommand] {
        &self.expected[self.cursor.get()..]
    }

    /// Number of commands matched so far.
    #[must_use]
    pub fn invocations(&self) -> usize {
        self.cursor.get()
    }
}

impl Shell for SpyShell {
    async fn execute(&self, command: &str) -> Result<RunResult, ShellError> {
        Ok(self.invoke(command)?)
    }
}
