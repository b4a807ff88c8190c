//! Core module - Configuration, errors and path derivation
//!
//! This module provides:
//! - Install configuration built once from the process environment
//! - Typed configuration errors
//! - Target directory derivation under the install prefix

pub mod config;
pub mod error;
pub mod paths;
