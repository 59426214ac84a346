//! Request handlers for the upload endpoint.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use sheetcheck::IssueReport;

use super::error::ServerError;
use super::state::AppState;

/// Response body for a validation request.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    /// True when the report holds no findings.
    pub passed: bool,
    /// The grouped issue report, keyed by category label.
    pub issues: IssueReport,
}

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /validate`: receive a samplesheet as the multipart field
/// `samplesheet`, stage it under the upload directory and validate it.
///
/// Filename sanitization happens here, before staging; the engine only ever
/// sees the staged path.
pub async fn validate_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ValidateResponse>, ServerError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("samplesheet") {
            continue;
        }

        let filename = sanitize_filename(field.file_name().unwrap_or_default())?;
        if !filename.to_lowercase().ends_with(".csv") {
            return Err(ServerError::BadRequest(
                "Allowed file types are CSV.".to_string(),
            ));
        }

        let contents = field.bytes().await?;
        let staged = state.upload_dir.join(&filename);
        tokio::fs::write(&staged, &contents).await?;
        info!(file = %staged.display(), bytes = contents.len(), "samplesheet staged");

        // The engine is synchronous (blocking LIMS lookups included).
        let validator = Arc::clone(&state.validator);
        let report = tokio::task::spawn_blocking(move || validator.validate_file(&staged)).await?;

        return Ok(Json(ValidateResponse {
            passed: report.is_clean(),
            issues: report,
        }));
    }

    Err(ServerError::BadRequest(
        "No file part 'samplesheet' in the request.".to_string(),
    ))
}

/// Reduce an uploaded file name to a safe basename: path separators are
/// stripped, anything outside `[A-Za-z0-9._-]` becomes `_`, leading dots are
/// dropped.
fn sanitize_filename(name: &str) -> Result<String, ServerError> {
    let basename = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        return Err(ServerError::BadRequest(
            "No file selected for uploading.".to_string(),
        ));
    }
    Ok(cleaned)
}
