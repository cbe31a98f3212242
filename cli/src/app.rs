//! Application context — unified state passed to every command handler.
//!
//! Adding a cross-cutting concern requires only one field change here —
//! zero command signatures change.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::RelopsConfig;
use crate::infra::{TokioShell, YamlConfigStore};
use crate::output::{OutputContext, TerminalReporter};

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Whether results are printed as JSON.
    pub json: bool,
    /// Configuration file access.
    pub config_store: YamlConfigStore,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        // JSON output must stay machine-readable.
        let quiet = flags.quiet || flags.json;
        Self {
            output: OutputContext::new(flags.no_color, quiet),
            json: flags.json,
            config_store: YamlConfigStore::default(),
        }
    }

    /// Load the stored configuration (defaults when absent).
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn config(&self) -> Result<RelopsConfig> {
        self.config_store.load()
    }

    /// Production shell honouring `shell.timeout_secs`.
    #[must_use]
    pub fn shell(&self, config: &RelopsConfig) -> TokioShell {
        TokioShell::new(Duration::from_secs(config.shell.timeout_secs))
    }

    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }
}
