// src/lib.rs

pub mod types;
pub mod config;
pub mod prompt;
pub mod providers;
pub mod api;
pub mod cache;
pub mod server;

// Re-export commonly used types
pub use types::*;
pub use config::{Config, ConfigError};
pub use prompt::build_prompt;
pub use providers::{InferenceProvider, ProviderError};
pub use api::{analyze, ApiError};
pub use server::{create_router, AppState};
