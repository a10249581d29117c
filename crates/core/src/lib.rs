//! reel core library
//!
//! Foundational utilities shared by every reel crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{failure_message, AppError, AppResult};
pub use logging::LogFormat;
