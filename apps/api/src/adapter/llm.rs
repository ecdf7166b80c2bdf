//! `InterviewAdapter` backed by the Claude Messages API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::adapter::prompts::{
    EXTRACT_PROMPT, EXTRACT_SYSTEM, GENERATE_PROMPT_TEMPLATE, GENERATE_SYSTEM,
    SCORE_PROMPT_TEMPLATE, SCORE_SYSTEM_TEMPLATE, SUMMARY_PROMPT_TEMPLATE,
    SUMMARY_SYSTEM_TEMPLATE,
};
use crate::adapter::{normalize_score, AdapterError, GeneratedQuestion, InterviewAdapter};
use crate::intake::document::{DocumentPayload, MEDIA_PDF, MEDIA_TEXT};
use crate::llm_client::prompts::json_system;
use crate::llm_client::{InputBlock, LlmClient};
use crate::models::session::{
    AnswerScore, CandidateProfile, InterviewSummary, Question, QUESTION_COUNT,
};

#[derive(Debug, Deserialize)]
struct ExtractedProfile {
    name: String,
    email: String,
    phone: String,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawScore {
    score: f64,
    feedback: String,
}

#[derive(Debug, Deserialize)]
struct RawSummary {
    final_score: f64,
    final_summary: String,
}

pub struct LlmInterviewer {
    llm: LlmClient,
    role: String,
}

impl LlmInterviewer {
    pub fn new(llm: LlmClient, role: impl Into<String>) -> Self {
        Self {
            llm,
            role: role.into(),
        }
    }

    fn system(&self, template: &str) -> String {
        json_system(&template.replace("{role}", &self.role))
    }
}

#[async_trait]
impl InterviewAdapter for LlmInterviewer {
    async fn extract_profile(
        &self,
        document: &DocumentPayload,
    ) -> Result<CandidateProfile, AdapterError> {
        info!(
            "Extracting profile from {} ({})",
            document.file_name, document.media_type
        );
        let system = json_system(EXTRACT_SYSTEM);

        let extracted: ExtractedProfile = match document.media_type.as_str() {
            MEDIA_PDF => {
                let blocks = [
                    InputBlock::text(EXTRACT_PROMPT),
                    InputBlock::base64_document(&document.media_type, &document.data),
                ];
                self.llm.call_json(&blocks, &system).await?
            }
            MEDIA_TEXT => {
                let bytes = document
                    .decode()
                    .map_err(|e| AdapterError::Malformed(format!("document payload: {e}")))?;
                let text = String::from_utf8_lossy(&bytes);
                let blocks = [InputBlock::text(EXTRACT_PROMPT), InputBlock::text(&text)];
                self.llm.call_json(&blocks, &system).await?
            }
            other => return Err(AdapterError::UnsupportedMedia(other.to_string())),
        };

        Ok(CandidateProfile {
            name: extracted.name.trim().to_string(),
            email: extracted.email.trim().to_string(),
            phone: extracted.phone.trim().to_string(),
        })
    }

    async fn generate_question_set(&self) -> Result<Vec<GeneratedQuestion>, AdapterError> {
        let prompt = GENERATE_PROMPT_TEMPLATE.replace("{role}", &self.role);
        let raw: Vec<RawQuestion> = self
            .llm
            .call_json(&[InputBlock::text(&prompt)], &json_system(GENERATE_SYSTEM))
            .await?;

        if raw.len() != QUESTION_COUNT {
            return Err(AdapterError::Malformed(format!(
                "expected {QUESTION_COUNT} questions, got {}",
                raw.len()
            )));
        }
        if raw.iter().any(|q| q.text.trim().is_empty()) {
            return Err(AdapterError::Malformed("empty question text".to_string()));
        }

        Ok(raw
            .into_iter()
            .map(|q| GeneratedQuestion {
                text: q.text.trim().to_string(),
            })
            .collect())
    }

    async fn score_answer(
        &self,
        question: &Question,
        answer: &str,
    ) -> Result<AnswerScore, AdapterError> {
        let prompt = SCORE_PROMPT_TEMPLATE
            .replace("{difficulty}", &question.difficulty.to_string())
            .replace("{question}", &question.text)
            .replace("{answer}", answer);

        let raw: RawScore = self
            .llm
            .call_json(&[InputBlock::text(&prompt)], &self.system(SCORE_SYSTEM_TEMPLATE))
            .await?;

        Ok(AnswerScore {
            score: normalize_score(raw.score),
            feedback: raw.feedback,
        })
    }

    async fn summarize(&self, questions: &[Question]) -> Result<InterviewSummary, AdapterError> {
        let prompt = SUMMARY_PROMPT_TEMPLATE.replace("{transcript}", &render_transcript(questions));

        let raw: RawSummary = self
            .llm
            .call_json(&[InputBlock::text(&prompt)], &self.system(SUMMARY_SYSTEM_TEMPLATE))
            .await?;

        Ok(InterviewSummary {
            final_score: normalize_score(raw.final_score),
            final_summary: raw.final_summary,
        })
    }
}

/// Renders answered questions for the summary prompt.
fn render_transcript(questions: &[Question]) -> String {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let score = q
                .ai_score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unscored".to_string());
            format!(
                "QUESTION {} [{}] - Score: {}/100\nQ: {}\nA: {}\nFeedback: {}",
                i + 1,
                q.difficulty,
                score,
                q.text,
                q.candidate_answer.as_deref().unwrap_or(""),
                q.ai_feedback.as_deref().unwrap_or(""),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}
