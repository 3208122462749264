//! File handlers for the web API.

use std::io;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use futures::TryStreamExt;
use uuid::Uuid;

use crate::web::dto::{FileCreated, FileInfo};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::DepotError;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are stripped (header injection), quotes and
/// backslashes replaced in the ASCII fallback, and non-ASCII names carried
/// in an RFC 5987 `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// POST /files/ - Upload a file.
///
/// Request body: multipart/form-data with a "file" field. The field's
/// byte stream is handed to the service as-is, so the size ceiling is
/// enforced while the body is still arriving.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<FileCreated>), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::bad_request("No filename provided"))?;

        let stream = field.map_err(|e| io::Error::new(io::ErrorKind::Other, e));

        let record = state
            .file_service()
            .upload(state.user_id, &filename, stream)
            .await?;

        return Ok((StatusCode::CREATED, Json(FileCreated::from_record(&record))));
    }

    Err(ApiError::bad_request("No file provided"))
}

/// GET /files/ - List all files on the user space.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FileInfo>>, ApiError> {
    let files = state.file_service().list(state.user_id).await?;

    Ok(Json(files.into_iter().map(FileInfo::from).collect()))
}

/// GET /files/:uri - Download the file with the given identifier.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(uri): Path<Uuid>,
) -> Result<Response<Body>, ApiError> {
    let uri = uri.to_string();

    let (path, record) = state
        .file_service()
        .download(state.user_id, Some(&uri))
        .await?;

    let content = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::from(DepotError::Io(e)))?;

    let content_type = mime_guess::from_path(&record.name)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&record.name),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("failed to build download response: {}", e);
            ApiError::bad_request("Failed to build response")
        })?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_simple_ascii() {
        let result = content_disposition_header("document.txt");
        assert_eq!(result, "attachment; filename=\"document.txt\"");
    }

    #[test]
    fn test_content_disposition_non_ascii() {
        let result = content_disposition_header("résumé.pdf");
        assert!(result.starts_with("attachment; filename=\""));
        assert!(result.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_content_disposition_strips_header_injection() {
        let result = content_disposition_header("bad\r\nX-Injected: yes.txt");
        assert!(!result.contains('\r'));
        assert!(!result.contains('\n'));
        assert!(result.starts_with("attachment; filename="));
    }

    #[test]
    fn test_content_disposition_escapes_quotes() {
        let result = content_disposition_header("has\"quote.txt");
        assert!(result.contains("filename=\"has_quote.txt\""));
        assert!(result.contains("%22"));
    }
}
