use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{InferenceProvider, ProviderError};
use crate::cache::TokenCache;
use crate::config::ProviderConfig;
use crate::types::{DecodingParameters, GenerationResult};

const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Client for the watsonx.ai text generation API.
///
/// Holds one pooled HTTP client and the current IAM bearer token; build it
/// once at startup and share it behind an `Arc`.
pub struct WatsonxProvider {
    client: reqwest::Client,
    config: ProviderConfig,
    parameters: DecodingParameters,
    tokens: Mutex<TokenCache>,
}

impl WatsonxProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            config,
            parameters: DecodingParameters::FIXED,
            tokens: Mutex::new(TokenCache::new()),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }

    fn generation_url(&self) -> String {
        format!(
            "{}/ml/v1/text/generation?version={}",
            self.config.credentials.url, self.config.api_version
        )
    }

    async fn access_token(&self) -> Result<String, ProviderError> {
        // Held across the exchange so concurrent requests share one refresh.
        let mut cache = self.tokens.lock().await;
        if let Some(token) = cache.get() {
            return Ok(token);
        }

        let token = self.request_token().await?;
        cache.set(
            token.access_token.clone(),
            token.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        );
        tracing::debug!("Obtained new IAM token");

        Ok(token.access_token)
    }

    async fn request_token(&self) -> Result<IamTokenResponse, ProviderError> {
        let url = format!("{}/identity/token", self.config.iam_url);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", IAM_GRANT_TYPE),
                ("apikey", self.config.credentials.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(%status, "IAM token exchange rejected");
            return Err(ProviderError::Authentication(format!(
                "Failed to authenticate with watsonx.ai: {}",
                error_message(status, &text)
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            ProviderError::Authentication(format!("Invalid IAM token response: {}", e))
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model_id: &'a str,
    input: &'a str,
    parameters: DecodingParameters,
    project_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
    #[serde(default, rename = "errorMessage")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Best-effort human-readable message for a failed provider call.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(body) {
        let messages: Vec<String> = parsed
            .errors
            .iter()
            .map(|e| match &e.code {
                Some(code) => format!("{}: {}", code, e.message),
                None => e.message.clone(),
            })
            .collect();
        if !messages.is_empty() {
            return format!("{} ({})", messages.join("; "), status);
        }
        if let Some(message) = parsed.error_message {
            return format!("{} ({})", message, status);
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    }
}

#[async_trait]
impl InferenceProvider for WatsonxProvider {
    fn provider_name(&self) -> &str {
        "watsonx"
    }

    async fn generate(&self, prompt: &str) -> Result<GenerationResult, ProviderError> {
        let token = self.access_token().await?;

        let request_body = GenerationRequest {
            model_id: &self.config.model_id,
            input: prompt,
            parameters: self.parameters,
            project_id: &self.config.credentials.project_id,
        };

        let response = self
            .client
            .post(self.generation_url())
            .bearer_auth(&token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Generation request failed");
                ProviderError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            // Force a fresh exchange on the next call.
            self.tokens.lock().await.clear_if(&token);
            return Err(ProviderError::Authentication(error_message(status, &text)));
        }

        if !status.is_success() {
            tracing::warn!(%status, "Generation request returned an error status");
            return Err(ProviderError::BadResponse(error_message(status, &text)));
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(error = %e, "Could not decode generation response");
            ProviderError::BadResponse(format!("Invalid response from watsonx.ai: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_error_message_prefers_provider_errors() {
        let body = r#"{
            "errors": [{"code": "authentication_token_expired", "message": "Token expired"}],
            "trace": "abc",
            "status_code": 401
        }"#;

        let message = error_message(StatusCode::UNAUTHORIZED, body);
        assert_eq!(
            message,
            "authentication_token_expired: Token expired (401 Unauthorized)"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_raw_body() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "502 Bad Gateway: upstream down"
        );
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "503 Service Unavailable"
        );
    }

    #[test]
    fn test_error_message_reads_iam_shape() {
        let body = r#"{"errorCode": "BXNIM0415E", "errorMessage": "Provided API key could not be found."}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "Provided API key could not be found. (400 Bad Request)"
        );
    }

    #[test]
    fn test_generation_request_body_shape() {
        let body = GenerationRequest {
            model_id: "meta-llama/llama-3-2-1b-instruct",
            input: "prompt text",
            parameters: DecodingParameters::FIXED,
            project_id: "project-123",
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model_id"], "meta-llama/llama-3-2-1b-instruct");
        assert_eq!(value["input"], "prompt text");
        assert_eq!(value["project_id"], "project-123");
        assert_eq!(value["parameters"]["max_new_tokens"], 1024);
    }

    #[tokio::test]
    #[ignore]
    async fn test_generate_against_live_watsonx() {
        let config = Config::from_env()
            .expect("WATSONX_URL, WATSONX_API_KEY and WATSONX_PROJECT_ID must be set");

        let provider = WatsonxProvider::new(config.provider).unwrap();
        let result = provider
            .generate("Summarize: The Tenant shall pay rent on the first day of each month.")
            .await
            .unwrap();

        println!("\n=== watsonx.ai response ===");
        println!("{:#?}", result);
        assert!(result.results.map(|r| !r.is_empty()).unwrap_or(false));
    }
}
