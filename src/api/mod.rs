// src/api/mod.rs

pub mod analyze;
pub mod error;

pub use analyze::{analyze, extract_generated_text};
pub use error::ApiError;
