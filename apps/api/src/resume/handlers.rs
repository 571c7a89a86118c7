//! Axum route handlers for the Resume API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::resume::analysis::analyze_resume;
use crate::resume::pdf::extract_text;
use crate::resume::profile::{categorize_skills, extract_candidate_profile, profile_summary};
use crate::resume::session::{FileInfo, SessionRecord};
use crate::resume::upload::{
    content_hash, format_file_size, sanitize_filename, validate_upload, UploadError,
};
use crate::state::AppState;

struct UploadForm {
    file_name: String,
    file: Bytes,
    job_description: Option<String>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut file = None;
    let mut job_description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, data));
            }
            Some("job_description") => {
                let text = field.text().await.map_err(multipart_error)?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    let (file_name, file) = file.ok_or(UploadError::Missing)?;
    Ok(UploadForm {
        file_name,
        file,
        job_description,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/analyze
///
/// Multipart upload: `file` (PDF) and an optional `job_description`.
/// Runs the AI review and profile extraction, stores the result and returns it.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SessionRecord>, AppError> {
    let form = read_form(multipart).await?;
    validate_upload(&form.file_name, &form.file, state.config.file_size_limit_bytes())?;

    let file = FileInfo {
        name: sanitize_filename(&form.file_name),
        size_bytes: form.file.len() as u64,
        size_display: format_file_size(form.file.len() as u64),
        content_hash: content_hash(&form.file),
    };
    info!("Analyzing {} ({})", file.name, file.size_display);

    let text = extract_text(form.file).await?;

    let (analysis, profile) = tokio::join!(
        analyze_resume(&text, form.job_description.as_deref(), &state.llm),
        extract_candidate_profile(&text, &state.llm),
    );
    let analysis = analysis?;

    let record = SessionRecord {
        analysis_id: Uuid::new_v4(),
        file,
        analysis,
        profile_summary: profile_summary(&profile),
        skill_categories: categorize_skills(&profile.skills),
        profile,
        created_at: Utc::now(),
    };
    state.sessions.insert(record.clone()).await;
    info!("Stored analysis {}", record.analysis_id);

    Ok(Json(record))
}

/// GET /api/v1/resume/analyses/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionRecord>, AppError> {
    state
        .sessions
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found or expired")))
}
