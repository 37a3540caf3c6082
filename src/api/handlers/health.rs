/*
 * Responsibility
 * - GET /public/health, GET /actuator/health (疎通用)
 * - gate の bypass 対象: 認証情報に関係なく必ず応答する
 */
use axum::Json;
use serde_json::{Value, json};

use crate::api::response::ApiResponse;

pub async fn health() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::ok(json!({"status": "UP"})))
}
