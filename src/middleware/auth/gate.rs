//! Bearer ID token の検証 → AuthCtx を extensions に入れる
//!
//! 1. bypass 対象 path (public / health / docs) は検証せずにそのまま通す
//! 2. `Authorization: Bearer <token>` が無い (または Bearer でない) 場合も、identity 無しで通す
//!    拒否するかどうかは後段の access-control (`access.rs`) が決める
//! 3. 検証成功 → `AuthCtx` を request extensions に格納して次へ
//! 4. 検証失敗 → その場で 401 `Invalid ID token` を返し、handler には到達させない

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::extractors::AuthCtx;
use crate::api::response::ApiResponse;
use crate::services::identity::IdentityVerifier;

pub const INVALID_ID_TOKEN: &str = "Invalid ID token";

const BEARER_PREFIX: &str = "Bearer ";

/// Paths that never go through verification.
#[derive(Debug, Clone, Copy)]
pub struct BypassList {
    exact: &'static [&'static str],
    prefixes: &'static [&'static str],
}

pub const PUBLIC_PATHS: BypassList = BypassList {
    exact: &["/actuator/health"],
    prefixes: &["/public/", "/v3/api-docs", "/swagger-ui"],
};

impl BypassList {
    pub fn matches(&self, path: &str) -> bool {
        self.exact.contains(&path) || self.prefixes.iter().any(|p| path.starts_with(p))
    }
}

/// Runs the gate once per request, before any handler.
///
/// The verifier is the only shared state and it is immutable.
pub fn apply<S>(router: Router<S>, verifier: Arc<dyn IdentityVerifier>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(verifier, authenticate))
}

async fn authenticate(
    State(verifier): State<Arc<dyn IdentityVerifier>>,
    mut req: Request,
    next: Next,
) -> Response {
    // Bypass is decided before the header is even looked at.
    if PUBLIC_PATHS.matches(req.uri().path()) {
        return next.run(req).await;
    }

    let Some(credential) = bearer_credential(req.headers()) else {
        return next.run(req).await;
    };

    match verifier.verify(&credential).await {
        Some(identity) => {
            let ctx = AuthCtx::from_identity(identity);
            tracing::debug!(principal = %ctx.principal, "request authenticated");

            // gate → extractor への受け渡し
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        None => {
            tracing::warn!(path = %req.uri().path(), "id token verification failed");
            unauthorized()
        }
    }
}

fn bearer_credential(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::to_owned)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::message_only(INVALID_ID_TOKEN)),
    )
        .into_response()
}
