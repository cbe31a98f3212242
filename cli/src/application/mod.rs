//! Application layer — port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` and the `relops_shell` port —
//! never on `crate::infra`, `crate::commands`, or `crate::output`.

pub mod git;
pub mod ports;
pub mod services;

pub use git::Git;
pub use ports::{ConfigStore, ProgressReporter, Shell};
