use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coinrate_common::RegistryError;
use coinrate_fx::FxError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Business code for a conversion between currencies that cannot be priced.
pub const CURRENCY_NOT_ALLOWED_FOR_CONVERT: u16 = 1;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Not Found")]
    NotFound,
    /// A well-formed request the domain refuses.
    #[error("Bad Request")]
    Business(u16),
    #[error("Internal Server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    text: String,
    #[serde(rename = "businessCode", skip_serializing_if = "Option::is_none")]
    business_code: Option<u16>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, business_code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::NotFound => (StatusCode::NOT_FOUND, None),
            ApiError::Business(code) => (StatusCode::BAD_REQUEST, Some(*code)),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            text: self.to_string(),
            business_code,
        });
        (status, body).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        let code = err.error_code();
        match err {
            RegistryError::NotFound(_) => ApiError::NotFound,
            RegistryError::AlreadyExists(_) => {
                ApiError::BadRequest("currency already exists".to_string())
            }
            RegistryError::InvalidKind(kind) => {
                ApiError::BadRequest(format!("invalid currency type: {kind}"))
            }
            RegistryError::Storage(message) => {
                error!(code, error = %message, "Currency registry failure");
                ApiError::Internal
            }
        }
    }
}

impl From<FxError> for ApiError {
    fn from(err: FxError) -> Self {
        match err {
            FxError::NotAvailable { .. } | FxError::Overflow { .. } => {
                ApiError::Business(CURRENCY_NOT_ALLOWED_FOR_CONVERT)
            }
            FxError::Registry(e) => e.into(),
            other => {
                error!(error = %other, "Conversion failure");
                ApiError::Internal
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use coinrate_common::{CurrencyId, DirectedPair};
    use serde_json::{json, Value};

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_business_error_body() {
        let err: ApiError = FxError::NotAvailable {
            pair: DirectedPair::new("USD", "ETH"),
        }
        .into();

        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"code": 400, "text": "Bad Request", "businessCode": 1}));
    }

    #[tokio::test]
    async fn test_registry_error_mapping() {
        let (status, body) = render(RegistryError::NotFound(CurrencyId::new()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"code": 404, "text": "Not Found"}));

        let (status, body) = render(RegistryError::AlreadyExists("BTC".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["text"], "currency already exists");

        let (status, body) = render(RegistryError::Storage("pool closed".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"code": 500, "text": "Internal Server error"}));
    }
}
