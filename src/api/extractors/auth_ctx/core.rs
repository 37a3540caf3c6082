use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

use super::AuthCtx;

/// Handler で、 AuthCtx を受け取るための extractor
/// gate middleware が AuthCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は InvalidToken (401) を返す
pub struct CurrentUser(pub AuthCtx);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::InvalidToken("missing bearer credential".into()))
    }
}
