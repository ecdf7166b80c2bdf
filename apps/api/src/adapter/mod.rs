//! External AI service adapter: extraction, question generation, answer
//! scoring and summarization behind one capability trait.
//!
//! `LlmInterviewer` is the real backend, `OfflineInterviewer` is used when no
//! API key is configured. The interview engine never talks to either directly;
//! it goes through `ResilientAdapter`, which adds retries and local fallbacks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intake::document::DocumentPayload;
use crate::llm_client::LlmError;
use crate::models::session::{AnswerScore, CandidateProfile, InterviewSummary, Question};

pub mod fallback;
pub mod llm;
pub mod prompts;
pub mod resilient;

pub use resilient::ResilientAdapter;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Malformed service response: {0}")]
    Malformed(String),

    #[error("Unsupported document media type: {0}")]
    UnsupportedMedia(String),

    #[error("AI service is not configured")]
    NotConfigured,
}

impl AdapterError {
    pub fn is_transient(&self) -> bool {
        match self {
            AdapterError::Llm(e) => e.is_transient(),
            AdapterError::Malformed(_) => true,
            AdapterError::UnsupportedMedia(_) | AdapterError::NotConfigured => false,
        }
    }
}

/// One generated question. Difficulty and time budget come from the fixed
/// plan, matched by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub text: String,
}

/// Capability interface for the AI service. Implementations make a single
/// attempt per call; retry policy and fallbacks belong to `ResilientAdapter`.
#[async_trait]
pub trait InterviewAdapter: Send + Sync {
    async fn extract_profile(
        &self,
        document: &DocumentPayload,
    ) -> Result<CandidateProfile, AdapterError>;

    async fn generate_question_set(&self) -> Result<Vec<GeneratedQuestion>, AdapterError>;

    async fn score_answer(
        &self,
        question: &Question,
        answer: &str,
    ) -> Result<AnswerScore, AdapterError>;

    async fn summarize(&self, questions: &[Question]) -> Result<InterviewSummary, AdapterError>;
}

/// Backend used when no AI service is configured. Every call fails without
/// retrying, so the local fallbacks take over immediately.
pub struct OfflineInterviewer;

#[async_trait]
impl InterviewAdapter for OfflineInterviewer {
    async fn extract_profile(
        &self,
        _document: &DocumentPayload,
    ) -> Result<CandidateProfile, AdapterError> {
        Err(AdapterError::NotConfigured)
    }

    async fn generate_question_set(&self) -> Result<Vec<GeneratedQuestion>, AdapterError> {
        Err(AdapterError::NotConfigured)
    }

    async fn score_answer(
        &self,
        _question: &Question,
        _answer: &str,
    ) -> Result<AnswerScore, AdapterError> {
        Err(AdapterError::NotConfigured)
    }

    async fn summarize(&self, _questions: &[Question]) -> Result<InterviewSummary, AdapterError> {
        Err(AdapterError::NotConfigured)
    }
}

/// Converts a raw service score into an integer in [0, 100].
pub fn normalize_score(raw: f64) -> u32 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u32
}
