//! Git porcelain routed through the [`Shell`] port.
//!
//! Every method issues exactly one command built by `domain::command`.

use anyhow::Result;

use crate::application::ports::Shell;
use crate::application::services::{run, run_checked};
use crate::domain::command;

/// Git helper bound to a shell and the remote experiment branches go to.
pub struct Git<'a, S: Shell> {
    shell: &'a S,
    remote: String,
}

impl<'a, S: Shell> Git<'a, S> {
    pub fn new(shell: &'a S, remote: impl Into<String>) -> Self {
        Self {
            shell,
            remote: remote.into(),
        }
    }

    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    #[must_use]
    pub fn shell(&self) -> &'a S {
        self.shell
    }

    /// Whether `branch` resolves. Any non-zero exit means it does not.
    pub async fn branch_exists(&self, branch: &str) -> Result<bool> {
        let result = run(self.shell, &command::git_verify_ref(branch)).await?;
        Ok(result.success())
    }

    pub async fn delete_branch(&self, branch: &str) -> Result<()> {
        run_checked(self.shell, &command::git_delete_branch(branch)).await?;
        Ok(())
    }

    pub async fn checkout(&self, branch: &str) -> Result<()> {
        run_checked(self.shell, &command::git_checkout(branch)).await?;
        Ok(())
    }

    pub async fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        run_checked(self.shell, &command::git_checkout_new_branch(branch)).await?;
        Ok(())
    }

    pub async fn force_push(&self, branch: &str) -> Result<()> {
        run_checked(self.shell, &command::git_force_push(&self.remote, branch)).await?;
        Ok(())
    }

    /// Name of the checked-out branch (`HEAD` when detached).
    pub async fn current_branch(&self) -> Result<String> {
        let result = run_checked(self.shell, command::GIT_CURRENT_BRANCH).await?;
        Ok(result.stdout_lossy())
    }

    pub async fn head_sha(&self) -> Result<String> {
        let result = run_checked(self.shell, command::GIT_HEAD_SHA).await?;
        Ok(result.stdout_lossy())
    }
}
