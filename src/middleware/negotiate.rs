//! Content negotiation for envelope endpoints.
//!
//! Every response except a file download is a JSON envelope, so a request
//! whose `Accept` header rules out JSON is answered with 406 up front.

use axum::{
    Router,
    extract::Request,
    http::{HeaderMap, Method, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;

const RAW_DOWNLOAD_PREFIX: &str = "/api/files/";

pub fn apply(router: Router) -> Router {
    router.layer(middleware::from_fn(require_json_accept))
}

async fn require_json_accept(req: Request, next: Next) -> Result<Response, AppError> {
    let raw_download =
        req.method() == Method::GET && req.uri().path().starts_with(RAW_DOWNLOAD_PREFIX);

    if !raw_download && !accepts_json(req.headers()) {
        return Err(AppError::NotAcceptable);
    }
    Ok(next.run(req).await)
}

/// No `Accept` header (or an unreadable one) means anything goes.
fn accepts_json(headers: &HeaderMap) -> bool {
    let values: Vec<&str> = headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if values.iter().all(|v| v.trim().is_empty()) {
        return true;
    }

    values
        .iter()
        .flat_map(|v| v.split(','))
        .any(|range| {
            let mut parts = range.split(';').map(str::trim);
            let media = parts.next().unwrap_or_default().to_ascii_lowercase();
            let refused = parts.any(|p| {
                p.strip_prefix("q=")
                    .and_then(|q| q.parse::<f32>().ok())
                    .is_some_and(|q| q == 0.0)
            });
            !refused && matches!(media.as_str(), "application/json" | "application/*" | "*/*")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        apply(
            Router::new()
                .route("/me", get(|| async { "{}" }))
                .route("/api/files/{*object}", get(|| async { "bytes" })),
        )
    }

    async fn call(path: &str, accept: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = axum::http::Request::builder().uri(path);
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        let resp = app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn json_compatible_accept_passes() {
        for accept in [
            None,
            Some(""),
            Some("application/json"),
            Some("*/*"),
            Some("text/html, application/*;q=0.5"),
            Some("Application/JSON; charset=utf-8"),
        ] {
            let (status, _) = call("/me", accept).await;
            assert_eq!(status, StatusCode::OK, "{accept:?}");
        }
    }

    #[tokio::test]
    async fn accept_excluding_json_is_406() {
        for accept in ["text/html", "image/png, text/plain", "application/json;q=0"] {
            let (status, body) = call("/me", Some(accept)).await;
            assert_eq!(status, StatusCode::NOT_ACCEPTABLE, "{accept}");

            let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(body["message"], "Media type not acceptable");
            assert!(body["data"].is_null());
        }
    }

    #[tokio::test]
    async fn downloads_are_not_negotiated() {
        let (status, body) = call("/api/files/uploads/a.png", Some("image/png")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"bytes");
    }
}
