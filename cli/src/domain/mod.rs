//! Domain layer — command construction, configuration schema, validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod config;
pub mod error;

pub use command::{DOCKER_RUST_BUILD_WORKFLOW_NAME, DockerBuildRequest, validate_branch_name};
pub use config::{ProfilerConfig, RelopsConfig};
pub use error::{AutomationError, ConfigError};
