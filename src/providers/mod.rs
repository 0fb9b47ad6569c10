// src/providers/mod.rs

use async_trait::async_trait;
use thiserror::Error;
use crate::types::GenerationResult;

/// Failure talking to the inference provider. Every variant displays as its
/// bare message, which is what callers see in the `detail` field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Transport failure or timeout.
    #[error("{0}")]
    Unavailable(String),
    /// Token exchange failed or the provider rejected the token.
    #[error("{0}")]
    Authentication(String),
    /// Non-success status, undecodable body, or unexpected shape.
    #[error("{0}")]
    BadResponse(String),
}

impl ProviderError {
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Unavailable(_) => "provider_unavailable",
            ProviderError::Authentication(_) => "provider_authentication",
            ProviderError::BadResponse(_) => "provider_bad_response",
        }
    }
}

#[async_trait]
pub trait InferenceProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<GenerationResult, ProviderError>;
}

// Module declarations
pub mod mocks;
pub mod watsonx;

// Re-export for testing
pub use mocks::MockProvider;
pub use watsonx::WatsonxProvider;
