// src/types.rs

use serde::{Deserialize, Serialize};

/// Hosted model invoked when `WATSONX_MODEL_ID` is not set.
pub const DEFAULT_MODEL_ID: &str = "meta-llama/llama-3-2-1b-instruct";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(rename = "documentText")]
    pub document_text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResponse {
    pub analysis: String,
}

/// Body of every non-2xx response.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub detail: String,
}

/// Generation controls sent with every inference request.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct DecodingParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
}

impl DecodingParameters {
    pub const FIXED: DecodingParameters = DecodingParameters {
        max_new_tokens: 1024,
        temperature: 0.1,
    };
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub url: String,
    pub api_key: String,
    pub project_id: String,
}

/// Text generation response as returned by the provider. Only the fields the
/// service reads are modelled; everything else is ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<GeneratedText>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GeneratedText {
    #[serde(default)]
    pub generated_text: Option<String>,
    #[serde(default)]
    pub generated_token_count: Option<u64>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl GenerationResult {
    /// Convenience constructor for a single generated text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            model_id: None,
            results: Some(vec![GeneratedText {
                generated_text: Some(text.into()),
                ..GeneratedText::default()
            }]),
        }
    }
}
