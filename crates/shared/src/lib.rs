//! Shared errors and configuration for Intake.
//!
//! This crate provides the pieces every other crate agrees on:
//! - Application-wide error type with HTTP status mapping
//! - Configuration management (config files + environment)

pub mod config;
pub mod error;

pub use config::{AppConfig, LogFormat, LoggingConfig, NamingStrategy, ServerConfig, StorageSettings};
pub use error::{AppError, AppResult};
