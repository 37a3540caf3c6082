/*
 * Responsibility
 * - アプリ共通の AppError 定義 (失敗の種類 → HTTP status の唯一の対応表)
 * - IntoResponse 実装 (status + `{message, data}` 封筒)
 * - RepoError / ObjectStoreError / VerifyError / axum の rejection を統一的に変換
 */
use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use thiserror::Error;

use crate::api::response::ApiResponse;
use crate::repos::error::RepoError;
use crate::services::identity::VerifyError;
use crate::services::storage::ObjectStoreError;

/// Message returned for every failure nobody classified.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    /// Structured validation failure: field name -> message.
    #[error("validation error")]
    Validation(BTreeMap<String, String>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("token expired: {0}")]
    TokenExpired(String),
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("access denied")]
    AccessDenied,
    /// The payload is a fixed context string; driver errors never reach the client.
    #[error("upstream data store error: {0}")]
    UpstreamStore(&'static str),
    #[error("media type not supported")]
    UnsupportedMediaType,
    #[error("media type not acceptable")]
    NotAcceptable,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("async request timeout")]
    AsyncTimeout,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Status, client-facing message and optional data payload.
    pub fn into_parts(self) -> (StatusCode, String, Option<Value>) {
        match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            AppError::Validation(fields) => {
                let data = fields
                    .into_iter()
                    .map(|(field, message)| (field, Value::String(message)))
                    .collect::<serde_json::Map<_, _>>();
                (
                    StatusCode::BAD_REQUEST,
                    "Validation error".into(),
                    Some(Value::Object(data)),
                )
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
            AppError::Conflict(message) => (StatusCode::CONFLICT, message, None),
            AppError::TokenExpired(message) => (
                StatusCode::UNAUTHORIZED,
                format!("Token expired: {message}"),
                None,
            ),
            AppError::InvalidToken(message) => (
                StatusCode::UNAUTHORIZED,
                format!("Invalid token: {message}"),
                None,
            ),
            AppError::AccessDenied => (
                StatusCode::FORBIDDEN,
                "Access denied from Security config".into(),
                None,
            ),
            AppError::UpstreamStore(context) => (
                StatusCode::BAD_GATEWAY,
                format!("Upstream data store error: {context}"),
                None,
            ),
            AppError::UnsupportedMediaType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Media type not supported".into(),
                None,
            ),
            AppError::NotAcceptable => (
                StatusCode::NOT_ACCEPTABLE,
                "Media type not acceptable".into(),
                None,
            ),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".into(),
                None,
            ),
            AppError::AsyncTimeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Async request timeout".into(),
                None,
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_ERROR_MESSAGE.into(),
                None,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, data) = self.into_parts();

        if status.is_server_error() {
            tracing::warn!(%status, %message, "request failed");
        } else {
            tracing::debug!(%status, %message, "request rejected");
        }

        let body = ApiResponse::<Value> { message, data };
        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::conflict("Resource already exists"),
            RepoError::Db(err) => {
                tracing::error!(error = %err, "document store request failed");
                AppError::UpstreamStore("document store request failed")
            }
        }
    }
}

impl From<ObjectStoreError> for AppError {
    fn from(e: ObjectStoreError) -> Self {
        match e {
            ObjectStoreError::NotFound(name) => AppError::not_found(format!("File {name} not found")),
            ObjectStoreError::InvalidName(name) => {
                AppError::bad_request(format!("Invalid object name '{name}'"))
            }
            ObjectStoreError::Io(err) => {
                tracing::error!(error = %err, "object store request failed");
                AppError::UpstreamStore("object store request failed")
            }
            ObjectStoreError::Metadata(err) => {
                tracing::error!(error = %err, "object metadata unreadable");
                AppError::UpstreamStore("object store request failed")
            }
        }
    }
}

impl From<VerifyError> for AppError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::Expired => AppError::TokenExpired("ID token has expired".into()),
            VerifyError::Invalid(reason) => AppError::InvalidToken(reason),
            // Provider detail stays in the logs.
            VerifyError::Provider(_) => {
                AppError::InvalidToken("identity provider unavailable".into())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => AppError::UnsupportedMediaType,
            other => {
                tracing::debug!(error = %other.body_text(), "unreadable json body");
                AppError::bad_request("Malformed request body")
            }
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        match rejection {
            MultipartRejection::InvalidBoundary(_) => AppError::UnsupportedMediaType,
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        tracing::debug!(error = %e, "unreadable multipart body");
        AppError::bad_request("Malformed multipart body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn every_kind_maps_to_one_fixed_status() {
        let table = [
            (AppError::bad_request("x"), StatusCode::BAD_REQUEST),
            (AppError::Validation(BTreeMap::new()), StatusCode::BAD_REQUEST),
            (AppError::not_found("x"), StatusCode::NOT_FOUND),
            (AppError::conflict("x"), StatusCode::CONFLICT),
            (AppError::TokenExpired("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::InvalidToken("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::AccessDenied, StatusCode::FORBIDDEN),
            (AppError::UpstreamStore("x"), StatusCode::BAD_GATEWAY),
            (AppError::UnsupportedMediaType, StatusCode::UNSUPPORTED_MEDIA_TYPE),
            (AppError::NotAcceptable, StatusCode::NOT_ACCEPTABLE),
            (AppError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (AppError::AsyncTimeout, StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in table {
            let (status, message, _) = err.into_parts();
            assert_eq!(status, expected);
            assert!(!message.is_empty());
        }
    }

    #[tokio::test]
    async fn not_found_keeps_its_message() {
        let (status, body) = body_of(AppError::not_found("Customer x not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            serde_json::json!({"message": "Customer x not found", "data": null})
        );
    }

    #[tokio::test]
    async fn internal_never_leaks_detail() {
        let (status, body) = body_of(AppError::Internal).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], GENERIC_ERROR_MESSAGE);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn validation_carries_field_map() {
        let mut fields = BTreeMap::new();
        fields.insert("email".to_string(), "email must be valid".to_string());
        let (status, body) = body_of(AppError::Validation(fields)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation error");
        assert_eq!(body["data"]["email"], "email must be valid");
    }

    #[tokio::test]
    async fn repo_failure_is_redacted() {
        let err: AppError = RepoError::Db(sqlx::Error::PoolTimedOut).into();
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("Upstream data store error: "));
        assert!(!message.contains("pool"));
    }

    #[test]
    fn verify_errors_reach_the_token_kinds() {
        let (status, message, _) = AppError::from(VerifyError::Expired).into_parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(message.starts_with("Token expired: "));

        let (status, message, _) =
            AppError::from(VerifyError::Invalid("bad signature".into())).into_parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Invalid token: bad signature");

        let (_, message, _) =
            AppError::from(VerifyError::Provider("connect refused".into())).into_parts();
        assert!(!message.contains("connect refused"));
    }
}
