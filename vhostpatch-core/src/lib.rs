//! vhostpatch Core Library
//!
//! This crate provides the pieces shared by every vhostpatch command:
//! the site settings model, the settings loader and the error type.

pub mod config;
pub mod error;

pub use config::{ConfigLoader, SiteConfig};
pub use error::{Error, Result};
