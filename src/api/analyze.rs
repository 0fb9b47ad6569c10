use crate::prompt::build_prompt;
use crate::providers::{InferenceProvider, ProviderError};
use crate::types::{AnalysisRequest, AnalysisResponse, GenerationResult};

const EMPTY_RESULT_MESSAGE: &str = "Failed to get a valid response from WatsonX";

/// Main API operation: format the prompt, call the provider, unwrap the text.
pub async fn analyze<P: InferenceProvider + ?Sized>(
    request: AnalysisRequest,
    provider: &P,
) -> Result<AnalysisResponse, ProviderError> {
    let prompt = build_prompt(&request.document_text);

    let result = provider.generate(&prompt).await?;
    let analysis = extract_generated_text(result)?;

    Ok(AnalysisResponse { analysis })
}

/// Takes `results[0].generated_text`. Anything else is a bad response.
pub fn extract_generated_text(result: GenerationResult) -> Result<String, ProviderError> {
    result
        .results
        .and_then(|results| results.into_iter().next())
        .and_then(|first| first.generated_text)
        .ok_or_else(|| ProviderError::BadResponse(EMPTY_RESULT_MESSAGE.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mocks::MockProvider;
    use crate::types::GeneratedText;

    fn request(text: &str) -> AnalysisRequest {
        AnalysisRequest {
            document_text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_analyze_returns_generated_text() {
        let provider = MockProvider::new("test").with_text("1. Termination clause ...");

        let response = analyze(request("This Lease Agreement ..."), &provider)
            .await
            .unwrap();

        assert_eq!(response.analysis, "1. Termination clause ...");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_sends_formatted_prompt() {
        let provider = MockProvider::new("test").with_text("ok");
        let text = "Party A shall indemnify Party B.";

        analyze(request(text), &provider).await.unwrap();

        let prompts = provider.prompts();
        assert_eq!(prompts, vec![build_prompt(text)]);
        assert!(prompts[0].contains(text));
    }

    #[tokio::test]
    async fn test_analyze_propagates_provider_error() {
        let provider = MockProvider::new("test")
            .with_error(ProviderError::Unavailable("operation timed out".to_string()));

        let err = analyze(request("text"), &provider).await.unwrap_err();

        assert_eq!(err.to_string(), "operation timed out");
    }

    #[test]
    fn test_extract_rejects_missing_or_empty_results() {
        let missing = GenerationResult::default();
        let empty = GenerationResult {
            model_id: None,
            results: Some(vec![]),
        };
        let no_text = GenerationResult {
            model_id: None,
            results: Some(vec![GeneratedText::default()]),
        };

        for result in [missing, empty, no_text] {
            let err = extract_generated_text(result).unwrap_err();
            assert!(matches!(err, ProviderError::BadResponse(_)));
            assert_eq!(err.to_string(), EMPTY_RESULT_MESSAGE);
        }
    }

    #[test]
    fn test_extract_uses_first_result_only() {
        let result = GenerationResult {
            model_id: None,
            results: Some(vec![
                GeneratedText {
                    generated_text: Some("first".to_string()),
                    ..GeneratedText::default()
                },
                GeneratedText {
                    generated_text: Some("second".to_string()),
                    ..GeneratedText::default()
                },
            ]),
        };

        assert_eq!(extract_generated_text(result).unwrap(), "first");
    }
}
