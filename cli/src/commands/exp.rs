//! `relops exp` — experiment branches and CI docker builds.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::application::Git;
use crate::application::services::experiment::{
    self, DispatchOptions, DispatchOutcome, ExperimentOptions, WaitPolicy,
};
use crate::domain::DockerBuildRequest;
use crate::output::json;

/// Experiment subcommands.
#[derive(Subcommand)]
pub enum ExpCommand {
    /// Force-push an experiment branch from HEAD
    Push {
        /// Experiment branch to create, e.g. exp/my-change
        exp_branch: String,
        /// Branch to check out afterwards (defaults to the current branch)
        #[arg(long)]
        base: Option<String>,
    },
    /// Dispatch the docker build workflow for a branch
    Dispatch {
        /// Ref the workflow runs on
        #[arg(long)]
        branch: String,
        /// Commit to build (defaults to HEAD)
        #[arg(long)]
        git_sha: Option<String>,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Push exp/<current branch> and dispatch its docker build
    Run {
        /// Experiment branch name (defaults to exp/<base>)
        #[arg(long)]
        name: Option<String>,
        /// Branch to check out afterwards (defaults to the current branch)
        #[arg(long)]
        base: Option<String>,
        /// Commit to build (defaults to HEAD)
        #[arg(long)]
        git_sha: Option<String>,
        #[command(flatten)]
        build: BuildArgs,
    },
}

/// Docker build options shared by `dispatch` and `run`.
#[derive(Args)]
pub struct BuildArgs {
    /// Comma-separated cargo features
    #[arg(long, default_value = "")]
    pub features: String,
    /// Cargo build profile
    #[arg(long, default_value = "release")]
    pub profile: String,
    /// Print the commands without running them
    #[arg(long)]
    pub dry_run: bool,
    /// Wait for the workflow run to finish
    #[arg(long)]
    pub wait: bool,
}

impl BuildArgs {
    fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            dry_run: self.dry_run,
            wait: self.wait.then(WaitPolicy::default),
        }
    }
}

/// Run the exp command.
pub async fn run(app: &AppContext, cmd: ExpCommand) -> Result<()> {
    let config = app.config()?;
    let shell = app.shell(&config);
    let git = Git::new(&shell, config.git.remote.clone());
    let reporter = app.reporter();
    let workflow = config.workflow.docker_build.as_str();

    match cmd {
        ExpCommand::Push { exp_branch, base } => {
            let base = match base {
                Some(base) => base,
                None => git.current_branch().await?,
            };
            experiment::try_push_new_branch(&git, &base, &exp_branch, &reporter).await?;
            if app.json {
                println!(
                    "{}",
                    json::to_pretty(&serde_json::json!({ "branch": exp_branch, "base": base }))?
                );
            }
        }
        ExpCommand::Dispatch {
            branch,
            git_sha,
            build,
        } => {
            let git_sha = match git_sha {
                Some(sha) => sha,
                None => git.head_sha().await?,
            };
            let options = build.dispatch_options();
            let request = DockerBuildRequest {
                branch,
                git_sha,
                features: build.features,
                profile: build.profile,
            };
            let outcome = experiment::workflow_dispatch_docker_build(
                &shell, workflow, &request, options, &reporter,
            )
            .await?;
            print_dispatch(app, &outcome)?;
        }
        ExpCommand::Run {
            name,
            base,
            git_sha,
            build,
        } => {
            let options = ExperimentOptions {
                name,
                base,
                git_sha,
                dispatch: build.dispatch_options(),
                features: build.features,
                profile: build.profile,
            };
            let outcome = experiment::run_experiment(&git, workflow, options, &reporter).await?;
            if app.json {
                println!(
                    "{}",
                    json::to_pretty(&serde_json::json!({
                        "branch": outcome.branch,
                        "git_sha": outcome.git_sha,
                        "dispatch": dispatch_json(&outcome.dispatch),
                    }))?
                );
            } else {
                print_dispatch(app, &outcome.dispatch)?;
            }
        }
    }
    Ok(())
}

fn print_dispatch(app: &AppContext, outcome: &DispatchOutcome) -> Result<()> {
    if app.json {
        println!("{}", json::to_pretty(&dispatch_json(outcome))?);
        return Ok(());
    }
    // Dry runs must show the command even with --quiet.
    if let DispatchOutcome::DryRun { command } = outcome {
        if app.output.quiet {
            println!("{command}");
        }
    }
    Ok(())
}

fn dispatch_json(outcome: &DispatchOutcome) -> serde_json::Value {
    let (status, run_id) = match outcome {
        DispatchOutcome::DryRun { .. } => ("dry_run", None),
        DispatchOutcome::Dispatched { .. } => ("dispatched", None),
        DispatchOutcome::Completed { run_id, .. } => ("completed", Some(run_id.as_str())),
    };
    serde_json::json!({
        "status": status,
        "command": outcome.command(),
        "run_id": run_id,
    })
}
