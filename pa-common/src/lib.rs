//! # PA Common Library
//!
//! Shared code for the PA recommender services:
//! - Common error type
//! - Bootstrap configuration (TOML file, environment, compiled defaults)
//! - Artifact folder and file resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
