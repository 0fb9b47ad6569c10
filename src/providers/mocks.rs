use async_trait::async_trait;
use crate::types::GenerationResult;
use super::{InferenceProvider, ProviderError};
use std::sync::Mutex;

/// In-memory provider that returns a canned result or error and records every
/// prompt it receives.
pub struct MockProvider {
    pub name: String,
    result: Result<GenerationResult, ProviderError>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            result: Ok(GenerationResult::default()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_result(GenerationResult::from_text(text))
    }

    pub fn with_result(mut self, result: GenerationResult) -> Self {
        self.result = Ok(result);
        self
    }

    pub fn with_error(mut self, error: ProviderError) -> Self {
        self.result = Err(error);
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl InferenceProvider for MockProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<GenerationResult, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        self.result.clone()
    }
}
