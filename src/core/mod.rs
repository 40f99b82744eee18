// File: core/mod.rs
// Shared plumbing: errors, configuration, HTTP and JSON helpers.

pub mod config;
pub mod error;
pub mod http;
pub mod json;

pub use config::{ClientConfig, SessionCookie};
pub use error::{CoreError, Result};
