//! Core module - shared infrastructure for cobrowse
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the application.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{CobrowseError, Result};
pub use types::*;
