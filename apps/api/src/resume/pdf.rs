//! PDF text extraction.

use bytes::Bytes;
use tracing::{info, warn};

use crate::errors::AppError;

/// Extracts and normalizes the text layer of a PDF.
/// Parsing runs on the blocking pool; scanned (image-only) documents are rejected.
pub async fn extract_text(pdf: Bytes) -> Result<String, AppError> {
    let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| {
            // pdf-extract panics on some malformed documents
            if e.is_panic() {
                warn!("PDF parser panicked on malformed input");
                AppError::UnprocessableEntity("Error processing PDF file: malformed document".to_string())
            } else {
                AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}"))
            }
        })?
        .map_err(|e| {
            warn!("PDF text extraction failed: {e}");
            AppError::UnprocessableEntity(format!("Error processing PDF file: {e}"))
        })?;

    let text = clean_text(&raw);
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No extractable text found in PDF. Scanned documents are not supported.".to_string(),
        ));
    }

    info!("Successfully extracted {} characters from PDF", text.len());
    Ok(text)
}

/// Collapses runs of whitespace and drops non-ASCII characters.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.chars().filter(char::is_ascii).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
