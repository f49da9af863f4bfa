//! Credential corpus loading
//!
//! Credentials are the user's own documents (CV, transcripts, notes). Each
//! readable file in the credentials directory contributes one labelled block.

use crate::extraction::ExtractionError;
use crate::HarvestError;
use std::path::Path;

/// Extracts plain text from a PDF document
pub fn extract_pdf_text(path: &Path) -> Result<String, ExtractionError> {
    pdf_extract::extract_text(path).map_err(|e| ExtractionError::Pdf {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Loads every `.pdf`, `.txt` and `.md` file in `dir` into one corpus
///
/// # Arguments
///
/// * `dir` - Directory holding the credential documents
///
/// # Returns
///
/// * `Ok(Some(corpus))` - At least one document had readable text
/// * `Ok(None)` - The directory is missing or has no usable documents
/// * `Err(HarvestError)` - The directory could not be listed
pub fn load_credentials(dir: &Path) -> Result<Option<String>, HarvestError> {
    if !dir.is_dir() {
        tracing::warn!("Credentials directory {} does not exist", dir.display());
        return Ok(None);
    }

    let mut files: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut corpus = String::new();
    for path in files {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let text = match extension.as_deref() {
            Some("pdf") => match extract_pdf_text(&path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Skipping credential file: {}", e);
                    continue;
                }
            },
            Some("txt") | Some("md") => match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Skipping credential file {}: {}", path.display(), e);
                    continue;
                }
            },
            _ => continue,
        };

        if text.trim().is_empty() {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::debug!("Loaded credentials from {}", file_name);
        corpus.push_str(&format!("\n--- Content from {} ---\n", file_name));
        corpus.push_str(text.trim());
        corpus.push('\n');
    }

    if corpus.is_empty() {
        Ok(None)
    } else {
        Ok(Some(corpus))
    }
}
