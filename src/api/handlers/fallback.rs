use axum::http::{Method, Uri};

use crate::error::AppError;

pub async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::not_found(format!("No handler found for {method} {}", uri.path()))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
