//! # revfuse Common Library
//!
//! Shared code for the revfuse workspace:
//! - Error and result types
//! - TOML configuration loading and config path resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
