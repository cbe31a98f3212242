//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `relops_shell`.

use std::path::PathBuf;

use anyhow::Result;

use crate::domain::RelopsConfig;

// ── Shell Port ────────────────────────────────────────────────────────────────

/// Command-string execution. `infra::shell::TokioShell` spawns `sh -c`;
/// tests inject `relops_shell::SpyShell`.
pub use relops_shell::Shell;

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Echo a command about to be executed.
    fn command(&self, command: &str);
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when none is stored.
    fn load(&self) -> Result<RelopsConfig>;
    /// Persist the configuration.
    fn save(&self, config: &RelopsConfig) -> Result<()>;
    /// Location of the backing file.
    fn path(&self) -> Result<PathBuf>;
}
