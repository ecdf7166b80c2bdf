//! Candidate session records, the unit that is mutated by the interview
//! state machine and persisted by the session store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of questions in every interview.
pub const QUESTION_COUNT: usize = 6;

/// Value used by the extraction service (and its fallback) for a field it could not find.
pub const MISSING_VALUE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(label)
    }
}

/// Difficulty and time budget for one position in the interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionSlot {
    pub difficulty: Difficulty,
    pub timer_budget_seconds: u32,
}

/// The fixed question plan: two easy, two medium, two hard.
pub const QUESTION_PLAN: [QuestionSlot; QUESTION_COUNT] = [
    QuestionSlot { difficulty: Difficulty::Easy, timer_budget_seconds: 20 },
    QuestionSlot { difficulty: Difficulty::Easy, timer_budget_seconds: 20 },
    QuestionSlot { difficulty: Difficulty::Medium, timer_budget_seconds: 60 },
    QuestionSlot { difficulty: Difficulty::Medium, timer_budget_seconds: 60 },
    QuestionSlot { difficulty: Difficulty::Hard, timer_budget_seconds: 120 },
    QuestionSlot { difficulty: Difficulty::Hard, timer_budget_seconds: 120 },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub difficulty: Difficulty,
    pub text: String,
    pub timer_budget_seconds: u32,
    pub candidate_answer: Option<String>,
    pub ai_score: Option<u32>,
    pub ai_feedback: Option<String>,
}

impl Question {
    /// Builds an unanswered question for plan position `index`.
    ///
    /// Returns `None` when `index` is outside the plan.
    pub fn from_plan(index: usize, text: impl Into<String>) -> Option<Self> {
        let slot = QUESTION_PLAN.get(index)?;
        Some(Self {
            id: format!("q{}", index + 1),
            difficulty: slot.difficulty,
            text: text.into(),
            timer_budget_seconds: slot.timer_budget_seconds,
            candidate_answer: None,
            ai_score: None,
            ai_feedback: None,
        })
    }

    pub fn is_answered(&self) -> bool {
        self.ai_score.is_some()
    }
}

/// Checks that `questions` follows `QUESTION_PLAN` exactly.
pub fn matches_plan(questions: &[Question]) -> bool {
    questions.len() == QUESTION_COUNT
        && questions.iter().zip(QUESTION_PLAN.iter()).all(|(q, slot)| {
            q.difficulty == slot.difficulty && q.timer_budget_seconds == slot.timer_budget_seconds
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    PendingResume,
    CollectingInfo,
    StartingInterview,
    InProgress,
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStatus::PendingResume => "Pending Resume",
            SessionStatus::CollectingInfo => "Collecting Info",
            SessionStatus::StartingInterview => "Starting Interview",
            SessionStatus::InProgress => "In Progress",
            SessionStatus::Completed => "Completed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    System,
    AiQuestion,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewProgress {
    pub current_question_index: usize,
    pub current_timer_seconds: u32,
    pub is_paused: bool,
    pub questions: Vec<Question>,
}

/// The three contact attributes collected before the interview starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl CandidateProfile {
    /// Profile with every field set to the missing-value placeholder.
    pub fn placeholder() -> Self {
        Self {
            name: MISSING_VALUE.to_string(),
            email: MISSING_VALUE.to_string(),
            phone: MISSING_VALUE.to_string(),
        }
    }
}

/// Result of scoring a single answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerScore {
    pub score: u32,
    pub feedback: String,
}

/// Result of the final aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewSummary {
    pub final_score: u32,
    pub final_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSession {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: SessionStatus,
    pub final_score: Option<u32>,
    pub final_summary: Option<String>,
    pub chat_history: Vec<ChatMessage>,
    pub interview_progress: InterviewProgress,
}

impl CandidateSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            status: SessionStatus::PendingResume,
            final_score: None,
            final_summary: None,
            chat_history: Vec::new(),
            interview_progress: InterviewProgress::default(),
        }
    }

    pub fn profile(&self) -> CandidateProfile {
        CandidateProfile {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }

    pub fn set_profile(&mut self, profile: CandidateProfile) {
        self.name = profile.name;
        self.email = profile.email;
        self.phone = profile.phone;
    }

    /// The question currently awaiting an answer, if any.
    pub fn current_question(&self) -> Option<&Question> {
        let progress = &self.interview_progress;
        progress.questions.get(progress.current_question_index)
    }

    pub fn answered_count(&self) -> usize {
        self.interview_progress
            .questions
            .iter()
            .filter(|q| q.is_answered())
            .count()
    }

    pub fn push_message(&mut self, kind: MessageKind, content: impl Into<String>, at: DateTime<Utc>) {
        self.chat_history.push(ChatMessage {
            kind,
            content: content.into(),
            timestamp: at,
        });
    }
}

impl Default for CandidateSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Interviewee,
    Interviewer,
}

/// Everything persisted under the state key: the session list and the tab selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSnapshot {
    pub active_tab: Tab,
    pub sessions: Vec<CandidateSession>,
}

impl AppSnapshot {
    /// The active session is always the last one.
    pub fn active(&self) -> Option<&CandidateSession> {
        self.sessions.last()
    }
}

impl Default for AppSnapshot {
    fn default() -> Self {
        Self {
            active_tab: Tab::default(),
            sessions: vec![CandidateSession::new()],
        }
    }
}
