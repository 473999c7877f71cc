//! Castline Core Library
//!
//! Domain models, error taxonomy, configuration and token encryption shared by
//! every Castline crate.

pub mod config;
pub mod encryption;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, PipelineConfig, PlatformClientConfig};
pub use encryption::EncryptionService;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
