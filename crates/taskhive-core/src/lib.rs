//! # taskhive-core
//!
//! Shared foundation for the TaskHive sync client crates:
//!
//! - Configuration schemas loaded from TOML files and environment variables
//! - The unified [`error::AppError`] type and [`result::AppResult`] alias
//! - Identifier newtypes used across the realtime protocol

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
