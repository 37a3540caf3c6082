/*
 * Responsibility
 * - POST /api/files (multipart `file`) と GET /api/files/{*object}
 * - object 名は `uploads/<uuid>-<sanitized name>`
 * - download は封筒ではなく生のバイト列 + Content-Disposition
 */
use axum::{
    Json,
    extract::{
        Multipart, Path, State,
        multipart::MultipartRejection,
        rejection::PathRejection,
    },
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    api::{dto::files::UploadResponse, response::ApiResponse},
    error::AppError,
    state::AppState,
};

const FILE_FIELD: &str = "file";
const DEFAULT_FILE_NAME: &str = "file.bin";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<UploadResponse>>, AppError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let object = object_name_for(field.file_name());
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await?;

        state
            .objects
            .put(&object, content_type.as_deref(), &bytes)
            .await?;

        tracing::info!(
            backend = state.objects.backend_name(),
            bucket = state.objects.bucket(),
            %object,
            size = bytes.len(),
            "file uploaded"
        );

        return Ok(Json(ApiResponse::new(
            "uploaded",
            UploadResponse {
                bucket: state.objects.bucket().to_string(),
                object,
            },
        )));
    }

    Err(AppError::bad_request("Required part 'file' is not present."))
}

pub async fn download_file(
    State(state): State<AppState>,
    object: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(object) = object?;
    let stored = state.objects.get(&object).await?;

    let content_type = stored
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let file_name = stored.name.rsplit('/').next().unwrap_or(&stored.name);
    let disposition = HeaderValue::from_str(&content_disposition(file_name))
        .map_err(|_| AppError::Internal)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((StatusCode::OK, headers, stored.bytes).into_response())
}

fn object_name_for(original: Option<&str>) -> String {
    format!("uploads/{}-{}", Uuid::new_v4(), sanitize_file_name(original))
}

/// Replaces characters that would break headers or object paths.
fn sanitize_file_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name
            .chars()
            .map(|c| match c {
                '\r' | '\n' | '\\' | '"' | '/' => '_',
                other => other,
            })
            .collect(),
        _ => DEFAULT_FILE_NAME.to_string(),
    }
}

// RFC 5987 ext-value: only attr-chars stay literal.
fn content_disposition(file_name: &str) -> String {
    let mut encoded = String::with_capacity(file_name.len());
    for byte in file_name.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => encoded.push(byte as char),
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    format!("attachment; filename*=UTF-8''{encoded}")
}
