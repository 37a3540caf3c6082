/*
 * Responsibility
 * - URL 構造を定義
 * - public (bypass) と protected を分け、protected には access-control を route_layer で適用
 * - 404 / 405 も AppError の封筒で返す
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    customers::{create_customer, get_customer, list_customers},
    fallback::{method_not_allowed, not_found},
    files::{download_file, upload_file},
    health::health,
    me::me,
};
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let public = Router::new()
        .route("/public/health", get(health))
        .route("/actuator/health", get(health));

    let protected = Router::new()
        .route("/me", get(me))
        .route("/api/customers", get(list_customers).post(create_customer))
        .route("/api/customers/{id}", get(get_customer))
        .route("/api/files", post(upload_file))
        .route("/api/files/{*object}", get(download_file));

    public
        .merge(access::apply(protected))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
}
