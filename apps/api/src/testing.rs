//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::adapter::{AdapterError, GeneratedQuestion, InterviewAdapter, ResilientAdapter};
use crate::config::Config;
use crate::intake::document::{DocumentPayload, MEDIA_PDF};
use crate::interview::Interviewer;
use crate::models::session::{
    AnswerScore, CandidateProfile, InterviewSummary, Question, QUESTION_COUNT,
};
use crate::retry::RetryPolicy;
use crate::store::blob::{BlobError, BlobStore};
use crate::store::SessionStore;

pub const SCRIPTED_SCORE: u32 = 80;
pub const SCRIPTED_FINAL_SCORE: u32 = 85;

/// Deterministic adapter with switchable failures and call counters.
pub struct ScriptedAdapter {
    profile: CandidateProfile,
    question_count: usize,
    extraction_error: Option<fn() -> AdapterError>,
    fail_generation: bool,
    fail_scoring: bool,
    fail_summary: bool,
    score_delay: Option<Duration>,
    pub extract_calls: AtomicU32,
    pub generate_calls: AtomicU32,
    pub score_calls: AtomicU32,
    pub summary_calls: AtomicU32,
    pub scored_answers: Mutex<Vec<String>>,
}

impl Default for ScriptedAdapter {
    fn default() -> Self {
        Self {
            profile: CandidateProfile {
                name: "Jane Doe".to_string(),
                email: "jane@x.com".to_string(),
                phone: "555-1234567".to_string(),
            },
            question_count: QUESTION_COUNT,
            extraction_error: None,
            fail_generation: false,
            fail_scoring: false,
            fail_summary: false,
            score_delay: None,
            extract_calls: AtomicU32::new(0),
            generate_calls: AtomicU32::new(0),
            score_calls: AtomicU32::new(0),
            summary_calls: AtomicU32::new(0),
            scored_answers: Mutex::new(Vec::new()),
        }
    }
}

fn transient_failure() -> AdapterError {
    AdapterError::Malformed("scripted failure".to_string())
}

fn offline_failure() -> AdapterError {
    AdapterError::NotConfigured
}

impl ScriptedAdapter {
    pub fn with_profile(mut self, name: &str, email: &str, phone: &str) -> Self {
        self.profile = CandidateProfile {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        };
        self
    }

    pub fn with_question_count(mut self, count: usize) -> Self {
        self.question_count = count;
        self
    }

    pub fn with_score_delay(mut self, delay: Duration) -> Self {
        self.score_delay = Some(delay);
        self
    }

    pub fn failing_extraction(mut self) -> Self {
        self.extraction_error = Some(transient_failure);
        self
    }

    pub fn offline_extraction(mut self) -> Self {
        self.extraction_error = Some(offline_failure);
        self
    }

    pub fn failing_generation(mut self) -> Self {
        self.fail_generation = true;
        self
    }

    pub fn failing_scoring(mut self) -> Self {
        self.fail_scoring = true;
        self
    }

    pub fn failing_summary(mut self) -> Self {
        self.fail_summary = true;
        self
    }
}

#[async_trait]
impl InterviewAdapter for ScriptedAdapter {
    async fn extract_profile(
        &self,
        _document: &DocumentPayload,
    ) -> Result<CandidateProfile, AdapterError> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        match self.extraction_error {
            Some(make_error) => Err(make_error()),
            None => Ok(self.profile.clone()),
        }
    }

    async fn generate_question_set(&self) -> Result<Vec<GeneratedQuestion>, AdapterError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_generation {
            return Err(transient_failure());
        }
        Ok((1..=self.question_count)
            .map(|n| GeneratedQuestion {
                text: format!("Generated question {n}"),
            })
            .collect())
    }

    async fn score_answer(
        &self,
        _question: &Question,
        answer: &str,
    ) -> Result<AnswerScore, AdapterError> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.score_delay {
            tokio::time::sleep(delay).await;
        }
        self.scored_answers.lock().unwrap().push(answer.to_string());
        if self.fail_scoring {
            return Err(transient_failure());
        }
        Ok(AnswerScore {
            score: SCRIPTED_SCORE,
            feedback: "Solid answer".to_string(),
        })
    }

    async fn summarize(&self, _questions: &[Question]) -> Result<InterviewSummary, AdapterError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_summary {
            return Err(transient_failure());
        }
        Ok(InterviewSummary {
            final_score: SCRIPTED_FINAL_SCORE,
            final_summary: "Strong candidate. Hire.".to_string(),
        })
    }
}

/// Blob store kept in a map.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>, BlobError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), BlobError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn pdf_document() -> DocumentPayload {
    DocumentPayload::encode(
        "jane_doe.pdf",
        MEDIA_PDF,
        Bytes::from_static(b"%PDF-1.7 resume"),
        1024,
    )
    .unwrap()
}

/// Offline configuration with a small upload limit.
pub fn test_config() -> Config {
    Config {
        anthropic_api_key: None,
        redis_url: None,
        state_dir: "./data".into(),
        interview_role: "Rust Developer".to_string(),
        llm_max_attempts: 2,
        llm_retry_base_ms: 0,
        llm_retry_jitter_ms: 0,
        max_upload_bytes: 64 * 1024,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

pub async fn memory_store() -> (SessionStore, Arc<MemoryBlobStore>) {
    let blobs = Arc::new(MemoryBlobStore::default());
    let store = SessionStore::load(blobs.clone()).await;
    (store, blobs)
}

/// Interviewer over an in-memory store, retrying without delays.
pub async fn interviewer(adapter: Arc<ScriptedAdapter>) -> Interviewer {
    let (store, _) = memory_store().await;
    Interviewer::new(store, ResilientAdapter::new(adapter, RetryPolicy::immediate(2)))
}
