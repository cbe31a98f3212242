//! Command implementations

pub mod config;
pub mod exp;
pub mod profile;
pub mod version;
