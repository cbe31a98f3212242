//! Command strings issued by relops automation.
//!
//! Pure functions only. Every command the automation runs is built here so
//! that tests can assert the exact strings.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::domain::error::AutomationError;

/// GitHub Actions workflow that builds the Rust docker images.
pub const DOCKER_RUST_BUILD_WORKFLOW_NAME: &str = "docker-build-test.yaml";

/// Prefix for experiment branches derived from a base branch.
pub const EXP_BRANCH_PREFIX: &str = "exp/";

static BRANCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9._/-]+$").expect("valid regex")
});

/// Reject branch names that could be misread by git or the shell.
///
/// # Errors
///
/// Returns [`AutomationError::InvalidBranch`] for empty names, names with
/// characters outside `[A-Za-z0-9._/-]`, a leading `-`, or a `..` sequence.
pub fn validate_branch_name(name: &str) -> Result<()> {
    if !BRANCH_RE.is_match(name) || name.starts_with('-') || name.contains("..") {
        return Err(AutomationError::InvalidBranch(name.to_string()).into());
    }
    Ok(())
}

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9._,-]*$").expect("valid regex")
});

static SHELL_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9._/*+:@-]+$").expect("valid regex")
});

/// Whether `value` can be interpolated into a command as a single unquoted
/// word. `*` is allowed so globs expand.
#[must_use]
pub fn is_shell_word(value: &str) -> bool {
    SHELL_WORD_RE.is_match(value) && !value.starts_with('-')
}

/// `exp/<base>` for a base branch.
#[must_use]
pub fn exp_branch_for(base: &str) -> String {
    format!("{EXP_BRANCH_PREFIX}{base}")
}

// ── git ──────────────────────────────────────────────────────────────────────

#[must_use]
pub fn git_verify_ref(reference: &str) -> String {
    format!("git rev-parse --verify {reference}")
}

#[must_use]
pub fn git_delete_branch(branch: &str) -> String {
    format!("git branch -D {branch}")
}

#[must_use]
pub fn git_checkout(branch: &str) -> String {
    format!("git checkout {branch}")
}

#[must_use]
pub fn git_checkout_new_branch(branch: &str) -> String {
    format!("git checkout -b {branch}")
}

#[must_use]
pub fn git_force_push(remote: &str, branch: &str) -> String {
    format!("git push -f {remote} {branch}")
}

pub const GIT_CURRENT_BRANCH: &str = "git rev-parse --abbrev-ref HEAD";
pub const GIT_HEAD_SHA: &str = "git rev-parse HEAD";

// ── gh ───────────────────────────────────────────────────────────────────────

/// Inputs of a docker build workflow dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerBuildRequest {
    /// Ref the workflow runs on.
    pub branch: String,
    /// Commit the images are built from.
    pub git_sha: String,
    /// Comma-separated cargo features.
    pub features: String,
    /// Cargo build profile, e.g. `release` or `performance`.
    pub profile: String,
}

impl DockerBuildRequest {
    /// Check every field before it is interpolated into a `gh` command.
    ///
    /// # Errors
    ///
    /// Returns an error if the branch is not a valid branch name, the sha is
    /// empty, or any field contains characters outside `[A-Za-z0-9._,-]`.
    pub fn validate(&self) -> Result<()> {
        validate_branch_name(&self.branch)?;
        if self.git_sha.is_empty() || !FIELD_RE.is_match(&self.git_sha) {
            return Err(invalid_field("GIT_SHA", &self.git_sha));
        }
        for (field, value) in [("FEATURES", &self.features), ("PROFILE", &self.profile)] {
            if !FIELD_RE.is_match(value) {
                return Err(invalid_field(field, value));
            }
        }
        Ok(())
    }
}

fn invalid_field(field: &str, value: &str) -> anyhow::Error {
    AutomationError::InvalidField {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

#[must_use]
pub fn gh_workflow_dispatch(workflow: &str, request: &DockerBuildRequest) -> String {
    format!(
        "gh workflow run {workflow} --ref {branch} --field GIT_SHA={sha} --field FEATURES={features} --field PROFILE={profile} --field BUILD_ADDL_TESTING_IMAGES=true",
        branch = request.branch,
        sha = request.git_sha,
        features = request.features,
        profile = request.profile,
    )
}

/// Most recent run id of `workflow` on `branch` for commit `sha`.
#[must_use]
pub fn gh_latest_run_id(workflow: &str, branch: &str, sha: &str) -> String {
    format!(
        "gh run list --workflow {workflow} --branch {branch} --commit {sha} --limit 1 --json databaseId --jq .[0].databaseId"
    )
}

#[must_use]
pub fn gh_run_watch(run_id: &str) -> String {
    format!("gh run watch {run_id} --exit-status")
}

// ── jeprof ───────────────────────────────────────────────────────────────────

/// Output format of a jeprof report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Svg,
    Text,
}

impl ReportFormat {
    #[must_use]
    pub fn flag(self) -> &'static str {
        match self {
            Self::Svg => "--svg",
            Self::Text => "--text",
        }
    }
}

#[must_use]
pub fn jeprof_report(binary: &str, heap_glob: &str, format: ReportFormat, dest: &str) -> String {
    format!(
        "jeprof --show_bytes {binary} {heap_glob} {} > {dest}",
        format.flag()
    )
}

#[must_use]
pub fn remove_heap_dumps(heap_glob: &str) -> String {
    format!("rm {heap_glob}")
}
