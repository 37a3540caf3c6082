//! Access control for protected routes.
//!
//! The gate lets unauthenticated requests through; this stage, applied with
//! `route_layer` to protected routes only, is where they are turned away.

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::{AuthCtx, Authority};
use crate::error::AppError;

/// Requires a verified caller holding `Authority::User` on every route of `router`.
///
/// ```ignore
/// let protected = Router::new().route("/me", get(me));
/// let app = public.merge(access::apply(protected));
/// ```
pub fn apply<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn(require_user))
}

async fn require_user(req: Request, next: Next) -> Result<Response, AppError> {
    let ctx = req
        .extensions()
        .get::<AuthCtx>()
        .ok_or_else(|| AppError::InvalidToken("missing bearer credential".into()))?;

    if !ctx.has_authority(Authority::User) {
        tracing::warn!(
            principal = %ctx.principal,
            required = Authority::User.as_str(),
            "caller lacks required authority"
        );
        return Err(AppError::AccessDenied);
    }

    Ok(next.run(req).await)
}
