//! Retry-then-fallback wrapper around any `InterviewAdapter`.
//!
//! Every operation is infallible from the caller's point of view: transient
//! failures are retried under the configured `RetryPolicy`, and whatever is
//! left afterwards is replaced by the local substitute from `fallback`.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::{fallback, AdapterError, GeneratedQuestion, InterviewAdapter};
use crate::intake::document::DocumentPayload;
use crate::models::session::{
    AnswerScore, CandidateProfile, InterviewSummary, Question, QUESTION_COUNT,
};
use crate::retry::{with_backoff_when, RetryPolicy};

#[derive(Clone)]
pub struct ResilientAdapter {
    inner: Arc<dyn InterviewAdapter>,
    policy: RetryPolicy,
}

impl ResilientAdapter {
    pub fn new(inner: Arc<dyn InterviewAdapter>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub async fn extract_profile(&self, document: &DocumentPayload) -> CandidateProfile {
        let result = with_backoff_when(
            &self.policy,
            "Profile extraction",
            AdapterError::is_transient,
            move || self.inner.extract_profile(document),
        )
        .await;

        match result {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Profile extraction failed, using placeholder profile: {e}");
                fallback::placeholder_profile()
            }
        }
    }

    /// Always returns six questions in plan order.
    pub async fn generate_question_set(&self) -> Vec<Question> {
        let result = with_backoff_when(
            &self.policy,
            "Question generation",
            AdapterError::is_transient,
            move || async move {
                let generated = self.inner.generate_question_set().await?;
                questions_from_generated(generated)
            },
        )
        .await;

        match result {
            Ok(questions) => questions,
            Err(e) => {
                warn!("Question generation failed, using placeholder questions: {e}");
                fallback::placeholder_questions()
            }
        }
    }

    pub async fn score_answer(&self, question: &Question, answer: &str) -> AnswerScore {
        let result = with_backoff_when(
            &self.policy,
            "Answer scoring",
            AdapterError::is_transient,
            move || self.inner.score_answer(question, answer),
        )
        .await;

        match result {
            Ok(scored) => scored,
            Err(e) => {
                warn!("Scoring {} failed, synthesizing a score: {e}", question.id);
                fallback::synthesized_score(answer)
            }
        }
    }

    pub async fn summarize(&self, questions: &[Question]) -> InterviewSummary {
        let result = with_backoff_when(
            &self.policy,
            "Interview summary",
            AdapterError::is_transient,
            move || self.inner.summarize(questions),
        )
        .await;

        match result {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Summary failed, averaging question scores: {e}");
                let summary = fallback::synthesized_summary(questions);
                info!("Fallback final score: {}/100", summary.final_score);
                summary
            }
        }
    }
}

/// Maps generated questions onto the fixed plan by position.
fn questions_from_generated(
    generated: Vec<GeneratedQuestion>,
) -> Result<Vec<Question>, AdapterError> {
    if generated.len() != QUESTION_COUNT {
        return Err(AdapterError::Malformed(format!(
            "expected {QUESTION_COUNT} questions, got {}",
            generated.len()
        )));
    }
    generated
        .into_iter()
        .enumerate()
        .map(|(i, g)| {
            Question::from_plan(i, g.text)
                .ok_or_else(|| AdapterError::Malformed(format!("no plan slot for question {i}")))
        })
        .collect()
}
