//! Admission rules for task attachments.
//!
//! Runs entirely client-side, before any request is issued: a rejected
//! candidate set never costs a round-trip. Only covers files being staged
//! for a *new* task — documents already committed to an existing record
//! are immutable and never pass through here again.

use taskhub_api::task::{DOCUMENT_CONTENT_TYPE, MAX_TASK_DOCUMENTS};

/// A file the user wants to attach, before it has been sent anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    /// Filename as picked by the user.
    pub file_name: String,
    /// Declared media type of the file.
    pub content_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Convenience constructor for a PDF upload.
    pub fn pdf(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: DOCUMENT_CONTENT_TYPE.to_string(),
            bytes,
        }
    }
}

/// Reasons a candidate set is refused admission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    /// Staging the candidates would exceed the per-task document limit.
    #[error("a task can carry at most {MAX_TASK_DOCUMENTS} documents ({attempted} staged)")]
    TooMany {
        /// Total count the staging attempt would have produced.
        attempted: usize,
    },

    /// A candidate declared a media type other than PDF.
    #[error("only PDF documents are accepted ({file_name} is {content_type})")]
    NotPdf {
        /// Name of the offending file.
        file_name: String,
        /// The declared type that was refused.
        content_type: String,
    },
}

/// Admits `candidates` into the staged list, or rejects the whole batch.
///
/// The count rule runs first: `staged.len() + candidates.len()` may not
/// exceed [`MAX_TASK_DOCUMENTS`]. Then every candidate must declare the
/// PDF media type. On success the merged list is returned; on rejection
/// the staged list is untouched (the caller keeps its original).
///
/// # Errors
///
/// Returns [`AttachmentError::TooMany`] or [`AttachmentError::NotPdf`].
pub fn stage_documents(
    staged: &[DocumentUpload],
    candidates: Vec<DocumentUpload>,
) -> Result<Vec<DocumentUpload>, AttachmentError> {
    let attempted = staged.len() + candidates.len();
    if attempted > MAX_TASK_DOCUMENTS {
        return Err(AttachmentError::TooMany { attempted });
    }

    if let Some(bad) = candidates
        .iter()
        .find(|c| c.content_type != DOCUMENT_CONTENT_TYPE)
    {
        return Err(AttachmentError::NotPdf {
            file_name: bad.file_name.clone(),
            content_type: bad.content_type.clone(),
        });
    }

    let mut merged = staged.to_vec();
    merged.extend(candidates);
    Ok(merged)
}
