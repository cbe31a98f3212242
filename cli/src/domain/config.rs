//! Domain types and validators for relops configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::command::{DOCKER_RUST_BUILD_WORKFLOW_NAME, is_shell_word};
use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "git.remote",
    "workflow.docker_build",
    "profiler.binary",
    "profiler.heap_glob",
    "shell.timeout_secs",
];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.relops/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RelopsConfig {
    pub git: GitConfig,
    pub workflow: WorkflowConfig,
    pub profiler: ProfilerConfig,
    pub shell: ShellConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote experiment branches are force-pushed to.
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Workflow file dispatched to build docker images.
    pub docker_build: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            docker_build: DOCKER_RUST_BUILD_WORKFLOW_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Binary the heap dumps were taken from.
    pub binary: String,
    /// Glob matching the heap dump files.
    pub heap_glob: String,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            binary: "./target/release/aptos-node".to_string(),
            heap_glob: "./*.heap".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Per-command timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self { timeout_secs: 600 }
    }
}

impl RelopsConfig {
    /// Current value of a whitelisted key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not in the allowed list.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "git.remote" => self.git.remote.clone(),
            "workflow.docker_build" => self.workflow.docker_build.clone(),
            "profiler.binary" => self.profiler.binary.clone(),
            "profiler.heap_glob" => self.profiler.heap_glob.clone(),
            "shell.timeout_secs" => self.shell.timeout_secs.to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Validate and apply `value` to `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid for it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "git.remote" => self.git.remote = value.to_string(),
            "workflow.docker_build" => self.workflow.docker_build = value.to_string(),
            "profiler.binary" => self.profiler.binary = value.to_string(),
            "profiler.heap_glob" => self.profiler.heap_glob = value.to_string(),
            "shell.timeout_secs" => self.shell.timeout_secs = parse_timeout(key, value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Check every stored value as [`RelopsConfig::set`] would.
    ///
    /// # Errors
    ///
    /// Returns the first value that [`validate_config_value`] rejects.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.entries() {
            validate_config_value(key, &value)?;
        }
        Ok(())
    }

    /// All `(key, value)` pairs in whitelist order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        VALID_CONFIG_KEYS
            .iter()
            .filter_map(|key| self.get(key).ok().map(|value| (*key, value)))
            .collect()
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(unknown_key(key));
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    if key == "shell.timeout_secs" {
        parse_timeout(key, value)?;
        return Ok(());
    }
    // Values end up inside shell command strings.
    if !is_shell_word(value) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "Use letters, digits and . _ / * + : @ - (no spaces, no leading '-')."
                .to_string(),
        }
        .into());
    }
    Ok(())
}

fn parse_timeout(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "Expected a positive number of seconds.".to_string(),
        }
        .into()),
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    ConfigError::UnknownKey {
        key: key.to_string(),
        valid: VALID_CONFIG_KEYS.join(", "),
    }
    .into()
}

// ── Unit tests ───────────────────────────────────────────────────────────────
