//! Resume document intake: turns an uploaded file into a transferable
//! base64 payload tagged with its media type.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

pub const MEDIA_PDF: &str = "application/pdf";
pub const MEDIA_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MEDIA_TEXT: &str = "text/plain";

pub const ACCEPTED_MEDIA_TYPES: &[&str] = &[MEDIA_PDF, MEDIA_DOCX, MEDIA_TEXT];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Unsupported document type '{0}'. Upload a PDF, DOCX or plain text resume")]
    UnsupportedMediaType(String),

    #[error("Uploaded document is empty")]
    Empty,

    #[error("Uploaded document is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
}

/// An uploaded resume, encoded for the extraction service.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentPayload {
    pub file_name: String,
    pub media_type: String,
    /// Standard base64 of the raw file bytes.
    pub data: String,
}

impl DocumentPayload {
    /// Validates and encodes an uploaded file.
    ///
    /// Media type parameters (`text/plain; charset=utf-8`) are ignored when
    /// matching against the accepted list.
    pub fn encode(
        file_name: impl Into<String>,
        media_type: &str,
        contents: Bytes,
        max_bytes: usize,
    ) -> Result<Self, IntakeError> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !ACCEPTED_MEDIA_TYPES.contains(&essence.as_str()) {
            return Err(IntakeError::UnsupportedMediaType(media_type.to_string()));
        }
        if contents.is_empty() {
            return Err(IntakeError::Empty);
        }
        if contents.len() > max_bytes {
            return Err(IntakeError::TooLarge {
                size: contents.len(),
                limit: max_bytes,
            });
        }

        Ok(Self {
            file_name: file_name.into(),
            media_type: essence,
            data: STANDARD.encode(&contents),
        })
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data)
    }
}
