/*
 * Responsibility
 * - 全エンドポイント共通のレスポンス封筒 `{ message, data }`
 * - 成功時も失敗時も同じ形を返す (失敗時の data は null か field error map)
 */
use serde::Serialize;

/// Uniform response envelope.
///
/// `data` serializes as `null` when absent, it is never omitted.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn ok(data: T) -> Self {
        Self::new("ok", data)
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}
