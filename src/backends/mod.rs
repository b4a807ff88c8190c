//! Backends module - External tool integrations
//!
//! Provides:
//! - runner: Command runner capability (real, dry-run)
//! - refresh: The four-step desktop cache refresh
//! - doctor: Tool availability checking

pub mod doctor;
pub mod refresh;
pub mod runner;
