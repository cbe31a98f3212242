//! `relops profile` — heap profile reports.

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::services::profiler::{self, ReportPaths};

/// Profile subcommands.
#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Render jeprof SVG and text reports, then delete the heap dumps
    Render {
        /// Where to write the text report
        text: String,
        /// Where to write the SVG report
        svg: String,
    },
}

/// Run the profile command.
pub async fn run(app: &AppContext, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Render { text, svg } => {
            let config = app.config()?;
            let shell = app.shell(&config);
            let paths = ReportPaths {
                text: &text,
                svg: &svg,
            };
            profiler::render_heap_reports(&shell, &config.profiler, paths, &app.reporter()).await
        }
    }
}
