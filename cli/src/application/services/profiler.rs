//! Application service — render jemalloc heap profiles with `jeprof`.

use anyhow::Result;

use crate::application::ports::{ProgressReporter, Shell};
use crate::application::services::run_checked;
use crate::domain::command::{self, ReportFormat, is_shell_word};
use crate::domain::config::ProfilerConfig;
use crate::domain::AutomationError;

/// Destination files of the rendered reports.
#[derive(Debug, Clone, Copy)]
pub struct ReportPaths<'a> {
    pub text: &'a str,
    pub svg: &'a str,
}

/// Render SVG then text reports from the heap dumps, then delete the dumps.
///
/// The dumps are removed even if rendering failed; the first failure is
/// returned afterwards.
///
/// # Errors
///
/// Returns an error if a path is not a plain shell word or any command
/// exits non-zero.
pub async fn render_heap_reports(
    shell: &impl Shell,
    config: &ProfilerConfig,
    paths: ReportPaths<'_>,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    for (field, value) in [
        ("text report path", paths.text),
        ("svg report path", paths.svg),
        ("profiler.binary", config.binary.as_str()),
        ("profiler.heap_glob", config.heap_glob.as_str()),
    ] {
        if !is_shell_word(value) {
            return Err(AutomationError::InvalidField {
                field: field.to_string(),
                value: value.to_string(),
            }
            .into());
        }
    }

    let mut failure = None;
    for (format, dest) in [(ReportFormat::Svg, paths.svg), (ReportFormat::Text, paths.text)] {
        let cmd = command::jeprof_report(&config.binary, &config.heap_glob, format, dest);
        reporter.command(&cmd);
        match run_checked(shell, &cmd).await {
            Ok(_) => reporter.success(&format!("Wrote {dest}")),
            Err(e) => {
                reporter.warn(&format!("Could not render {dest}"));
                if failure.is_none() {
                    failure = Some(e);
                }
            }
        }
    }

    let cleanup = command::remove_heap_dumps(&config.heap_glob);
    reporter.command(&cleanup);
    let removed = run_checked(shell, &cleanup).await;

    if let Some(e) = failure {
        return Err(e);
    }
    removed?;
    Ok(())
}
