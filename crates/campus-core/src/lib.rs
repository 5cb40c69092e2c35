//! Campus Core Library
//!
//! This crate provides the domain models, error types, configuration and
//! display helpers shared by the portal client crates (API client, media
//! processing, upload engine and CLI).

pub mod config;
pub mod constants;
pub mod duration;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{ffprobe_path_from_env, ClientConfig, Config};
pub use duration::{format_duration, DurationText};
pub use error::{AppError, ErrorMetadata, LogLevel};
