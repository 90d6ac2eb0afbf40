//! Shared domain types, hard limits, error taxonomy and configuration for the
//! express incident pipeline.

pub mod config;
pub mod error;
pub mod limits;
pub mod types;

pub use config::ExpresConfig;
pub use error::{ExpresError, Result};
pub use types::*;
