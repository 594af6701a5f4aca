//! HTTP error envelope and mapping from domain errors.
//!
//! Keep the domain free of transport concerns by translating
//! [`Error`] into Actix responses here. The wire shape is
//! `{"error":{"code","message"}}`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use tracing::error;

use crate::domain::{Error, ErrorCode};

/// Inner payload of the error envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

/// Standard error envelope returned by every endpoint.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

/// Transport wrapper around the domain error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ApiError(Error);

/// Convenience alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        self.0.code()
    }
}

impl From<Error> for ApiError {
    fn from(domain_error: Error) -> Self {
        if matches!(
            domain_error.code(),
            ErrorCode::Internal | ErrorCode::ServiceUnavailable
        ) {
            error!(code = ?domain_error.code(), message = %domain_error.message(), "request failed");
        }
        Self(domain_error)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0.code() {
            ErrorCode::InvalidRequest | ErrorCode::InvalidValidation => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal details stay in the logs; clients get a generic line.
        let message = if self.0.code() == ErrorCode::Internal {
            "internal server error".to_owned()
        } else {
            self.0.message().to_owned()
        };
        HttpResponse::build(self.status_code()).json(ErrorEnvelope {
            error: ErrorBody {
                code: self.0.code(),
                message,
            },
        })
    }
}

/// Map body deserialisation failures onto the envelope.
pub fn json_error_handler(
    payload_error: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    ApiError::from(Error::invalid_request(format!(
        "invalid json payload: {payload_error}"
    )))
    .into()
}

/// Map query string parse failures onto the envelope.
pub fn query_error_handler(
    query_error: actix_web::error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    ApiError::from(Error::invalid_request(format!(
        "invalid query parameters: {query_error}"
    )))
    .into()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::invalid_request(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case::invalid_validation(Error::invalid_validation("bad"), StatusCode::BAD_REQUEST)]
    #[case::unauthorized(Error::unauthorized("no key"), StatusCode::UNAUTHORIZED)]
    #[case::not_found(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case::already_exists(Error::already_exists("dup"), StatusCode::CONFLICT)]
    #[case::unavailable(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case::internal(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn domain_codes_map_to_statuses(#[case] domain_error: Error, #[case] expected: StatusCode) {
        assert_eq!(ApiError::from(domain_error).status_code(), expected);
    }

    #[actix_web::test]
    async fn internal_messages_are_redacted() {
        let response = ApiError::from(Error::internal("secret detail")).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = actix_web::body::to_bytes(response.into_body())
            .await
            .expect("body bytes");
        let decoded: serde_json::Value = serde_json::from_slice(&body).expect("envelope json");
        assert_eq!(decoded["error"]["code"], "SERVER_ERROR");
        assert_eq!(decoded["error"]["message"], "internal server error");
    }
}
