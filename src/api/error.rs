use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::providers::ProviderError;
use crate::types::ErrorBody;

/// Errors returned by the HTTP layer. Both kinds render as
/// `{"detail": <message>}`; only the status code differs.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body missing, malformed, or of the wrong shape.
    #[error("{0}")]
    ClientInput(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ClientInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::ClientInput(_) => "client_input",
            ApiError::Provider(err) => err.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            detail: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::ClientInput("missing field".to_string()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        for err in [
            ProviderError::Unavailable("connection refused".to_string()),
            ProviderError::Authentication("bad key".to_string()),
            ProviderError::BadResponse("no results".to_string()),
        ] {
            let api_err = ApiError::from(err);
            assert_eq!(api_err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_provider_message_passes_through() {
        let err = ApiError::from(ProviderError::Authentication("Invalid API key".to_string()));

        assert_eq!(err.to_string(), "Invalid API key");
        assert_eq!(err.kind(), "provider_authentication");
    }
}
