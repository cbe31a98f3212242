//! Application service — experiment branches and CI docker builds.
//!
//! Imports only from `crate::domain` and `crate::application`.
//! All commands go through the injected [`Shell`].

use std::time::Duration;

use anyhow::Result;

use crate::application::git::Git;
use crate::application::ports::{ProgressReporter, Shell};
use crate::application::services::{run, run_checked};
use crate::domain::command::{self, DockerBuildRequest, validate_branch_name};
use crate::domain::AutomationError;

/// Force-push `exp_branch` from the current `HEAD` and return to `base`.
///
/// An existing local `exp_branch` is deleted and recreated first. If the
/// push fails after the branch was created, `base` is still checked out
/// before the error is returned.
///
/// # Errors
///
/// Returns an error if either name is invalid or any git command fails.
pub async fn try_push_new_branch<S: Shell>(
    git: &Git<'_, S>,
    base: &str,
    exp_branch: &str,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    validate_branch_name(base)?;
    validate_branch_name(exp_branch)?;

    if git.branch_exists(exp_branch).await? {
        reporter.warn(&format!("{exp_branch} already exists, recreating it"));
        git.delete_branch(exp_branch).await?;
    }
    git.checkout_new_branch(exp_branch).await?;

    reporter.step(&format!("Pushing {exp_branch} to {}...", git.remote()));
    let pushed = git.force_push(exp_branch).await;
    let restored = git.checkout(base).await;
    pushed?;
    restored?;

    reporter.success(&format!("Pushed {exp_branch}"));
    Ok(())
}

/// How long to look for the dispatched run before giving up.
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_secs(3),
        }
    }
}

/// Dispatch behaviour switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    /// Report the command instead of running it.
    pub dry_run: bool,
    /// Block until the dispatched run finishes.
    pub wait: Option<WaitPolicy>,
}

/// Result of [`workflow_dispatch_docker_build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing was executed.
    DryRun { command: String },
    /// The workflow was dispatched and not waited on.
    Dispatched { command: String },
    /// The workflow was dispatched and run `run_id` completed successfully.
    Completed { command: String, run_id: String },
}

impl DispatchOutcome {
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::DryRun { command }
            | Self::Dispatched { command }
            | Self::Completed { command, .. } => command,
        }
    }
}

/// Dispatch `workflow` to build docker images for `request`.
///
/// # Errors
///
/// Returns an error if the request is invalid, `gh` fails, or when waiting,
/// no run shows up or the run fails.
pub async fn workflow_dispatch_docker_build(
    shell: &impl Shell,
    workflow: &str,
    request: &DockerBuildRequest,
    options: DispatchOptions,
    reporter: &impl ProgressReporter,
) -> Result<DispatchOutcome> {
    request.validate()?;
    let dispatch = command::gh_workflow_dispatch(workflow, request);

    if options.dry_run {
        reporter.command(&dispatch);
        return Ok(DispatchOutcome::DryRun { command: dispatch });
    }

    let list = command::gh_latest_run_id(workflow, &request.branch, &request.git_sha);
    // Force-pushed experiment branches keep earlier runs of the same commit.
    let previous = match options.wait {
        Some(_) => latest_run_id(shell, &list).await?,
        None => None,
    };

    run_checked(shell, &dispatch).await?;
    reporter.success(&format!("Dispatched {workflow} on {}", request.branch));

    let Some(policy) = options.wait else {
        return Ok(DispatchOutcome::Dispatched { command: dispatch });
    };

    let run_id = find_new_run(shell, &list, previous.as_deref(), policy, reporter)
        .await?
        .ok_or_else(|| AutomationError::MissingRun {
            workflow: workflow.to_string(),
            branch: request.branch.clone(),
        })?;
    reporter.step(&format!("Waiting for run {run_id}..."));
    run_checked(shell, &command::gh_run_watch(&run_id)).await?;
    reporter.success(&format!("Run {run_id} succeeded"));

    Ok(DispatchOutcome::Completed {
        command: dispatch,
        run_id,
    })
}

/// Newest listed run id, `None` when nothing is listed yet.
async fn latest_run_id(shell: &impl Shell, list: &str) -> Result<Option<String>> {
    let result = run(shell, list).await?;
    let id = result.stdout_lossy();
    if !result.success() || id.is_empty() || id == "null" {
        return Ok(None);
    }
    Ok(Some(id))
}

/// Poll `list` until it shows a run other than `previous`.
async fn find_new_run(
    shell: &impl Shell,
    list: &str,
    previous: Option<&str>,
    policy: WaitPolicy,
    reporter: &impl ProgressReporter,
) -> Result<Option<String>> {
    for attempt in 0..policy.attempts {
        if attempt > 0 {
            tokio::time::sleep(policy.interval).await;
        }
        match latest_run_id(shell, list).await? {
            Some(id) if previous != Some(id.as_str()) => return Ok(Some(id)),
            _ => reporter.step(&format!(
                "Dispatched run not listed yet ({}/{})",
                attempt + 1,
                policy.attempts
            )),
        }
    }
    Ok(None)
}

/// Inputs of [`run_experiment`]. Unset values are derived from git.
#[derive(Debug, Clone, Default)]
pub struct ExperimentOptions {
    /// Experiment branch; defaults to `exp/<base>`.
    pub name: Option<String>,
    /// Branch to return to; defaults to the checked-out branch.
    pub base: Option<String>,
    /// Commit to build; defaults to `HEAD`.
    pub git_sha: Option<String>,
    pub features: String,
    pub profile: String,
    pub dispatch: DispatchOptions,
}

/// What [`run_experiment`] pushed and dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentOutcome {
    pub branch: String,
    pub git_sha: String,
    pub dispatch: DispatchOutcome,
}

/// Push an experiment branch from `HEAD` and dispatch its docker build.
///
/// With `dry_run` nothing is pushed or dispatched; git is only queried for
/// values that were not provided.
///
/// # Errors
///
/// Returns an error if `HEAD` is detached and no base was given, or if any
/// push or dispatch step fails.
pub async fn run_experiment<S: Shell>(
    git: &Git<'_, S>,
    workflow: &str,
    options: ExperimentOptions,
    reporter: &impl ProgressReporter,
) -> Result<ExperimentOutcome> {
    let base = match options.base {
        Some(base) => base,
        None => git.current_branch().await?,
    };
    if base == "HEAD" {
        anyhow::bail!("HEAD is detached; pass --base to name the branch to return to");
    }
    let branch = options
        .name
        .unwrap_or_else(|| command::exp_branch_for(&base));
    let git_sha = match options.git_sha {
        Some(sha) => sha,
        None => git.head_sha().await?,
    };

    if options.dispatch.dry_run {
        reporter.step(&format!("Dry run: not pushing {branch}"));
    } else {
        try_push_new_branch(git, &base, &branch, reporter).await?;
    }

    let request = DockerBuildRequest {
        branch: branch.clone(),
        git_sha: git_sha.clone(),
        features: options.features,
        profile: options.profile,
    };
    let dispatch =
        workflow_dispatch_docker_build(git.shell(), workflow, &request, options.dispatch, reporter)
            .await?;

    Ok(ExperimentOutcome {
        branch,
        git_sha,
        dispatch,
    })
}
