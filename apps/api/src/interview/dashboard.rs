//! Interviewer dashboard listing.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::session::{CandidateSession, SessionStatus, QUESTION_COUNT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    FinalScore,
    Name,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: SessionStatus,
    pub status_label: String,
    pub final_score: Option<u32>,
    pub questions_answered: usize,
    pub question_count: usize,
}

impl From<&CandidateSession> for CandidateSummary {
    fn from(session: &CandidateSession) -> Self {
        Self {
            id: session.id,
            name: session.name.clone(),
            email: session.email.clone(),
            phone: session.phone.clone(),
            status: session.status,
            status_label: status_label(session.status),
            final_score: session.final_score,
            questions_answered: session.answered_count(),
            question_count: QUESTION_COUNT,
        }
    }
}

/// Sessions that got past resume upload, filtered by a case-insensitive
/// substring of name or email, then sorted. A missing final score sorts as -1.
pub fn list_candidates(sessions: &[CandidateSession], query: &CandidateQuery) -> Vec<CandidateSummary> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut matches: Vec<&CandidateSession> = sessions
        .iter()
        .filter(|s| s.status != SessionStatus::PendingResume)
        .filter(|s| match &needle {
            Some(needle) => {
                s.name.to_lowercase().contains(needle) || s.email.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect();

    matches.sort_by(|a, b| {
        let ordering = match query.sort {
            SortField::FinalScore => score_key(a).cmp(&score_key(b)),
            SortField::Name => compare_names(&a.name, &b.name),
        };
        match query.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    matches.into_iter().map(CandidateSummary::from).collect()
}

/// Dashboard rows show a session still waiting for its questions as running.
fn status_label(status: SessionStatus) -> String {
    match status {
        SessionStatus::StartingInterview => SessionStatus::InProgress.to_string(),
        other => other.to_string(),
    }
}

fn score_key(session: &CandidateSession) -> i64 {
    session.final_score.map_or(-1, i64::from)
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
