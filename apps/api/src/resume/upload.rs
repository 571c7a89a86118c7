//! Upload validation for résumé files.

use sha2::{Digest, Sha256};
use thiserror::Error;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];
const PDF_SIGNATURE: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    Missing,

    #[error("File size exceeds {limit_mb}MB limit")]
    TooLarge { limit_mb: u64 },

    #[error("File type '{extension}' not allowed. Allowed types: {allowed}")]
    DisallowedType { extension: String, allowed: String },

    #[error("Invalid PDF file format")]
    InvalidPdf,
}

/// Checks presence, size, extension and PDF signature of an uploaded file.
pub fn validate_upload(file_name: &str, bytes: &[u8], max_bytes: usize) -> Result<(), UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Missing);
    }

    if bytes.len() > max_bytes {
        return Err(UploadError::TooLarge {
            limit_mb: (max_bytes / (1024 * 1024)) as u64,
        });
    }

    // With no dot the whole name stands in for the extension, so the error names the file.
    let extension = file_name
        .rsplit('.')
        .next()
        .unwrap_or(file_name)
        .trim()
        .to_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UploadError::DisallowedType {
            extension,
            allowed: ALLOWED_EXTENSIONS.join(", "),
        });
    }

    if extension == "pdf" && !bytes.starts_with(PDF_SIGNATURE) {
        return Err(UploadError::InvalidPdf);
    }

    tracing::info!("File validation passed for: {file_name}");
    Ok(())
}

/// Strips any directory component and replaces characters unsafe in file names.
pub fn sanitize_filename(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    base.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

/// Hex SHA-256 of the file contents.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = size_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}
