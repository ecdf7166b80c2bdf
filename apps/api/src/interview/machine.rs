//! Interview state machine as a pure reducer over `CandidateSession`.
//!
//! `apply(session, event, now)` never mutates its input: it returns the next
//! session and, when the transition needs asynchronous work, an `Effect` for
//! the engine to run. Events that make no sense for the current status are
//! rejected with `TransitionError::InvalidTransition`.
//!
//! Status flow:
//!
//! ```text
//! PendingResume ──ResumeProcessed──► CollectingInfo ◄──GenerationFailed──┐
//!       │                               │ InfoSubmitted (loop)           │
//!       └──────(profile complete)───────┴──────────► StartingInterview ──┘
//!                                                       │ QuestionsReady
//!                                                       ▼
//!                       Tick / TogglePause / AnswerSubmitted / AnswerScored
//!                                                   InProgress
//!                                                       │ Summarized
//!                                                       ▼
//!                                                   Completed
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::intake::validation::{next_missing_field, validate_field, ProfileField};
use crate::models::session::{
    matches_plan, AnswerScore, CandidateProfile, CandidateSession, InterviewProgress,
    InterviewSummary, MessageKind, Question, SessionStatus, QUESTION_COUNT,
};

const WELCOME: &str = "Welcome! Please upload your resume (PDF/DOCX) to begin.";
const DETAILS_CONFIRMED: &str = "All details confirmed. Starting interview...";
const INTERVIEW_STARTING: &str = "Interview starting! You will answer 6 questions. Good luck!";
const START_FAILED: &str = "Failed to start interview. Please try again.";
const NO_ANSWER: &str = "No answer";
const TIMEOUT_NOTICE: &str = "Time's up! Auto-submitting: ";

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Extraction finished (successfully or with the placeholder profile).
    ResumeProcessed {
        file_name: String,
        profile: CandidateProfile,
    },
    /// Free text typed while profile fields are being collected.
    InfoSubmitted { text: String },
    QuestionsReady { questions: Vec<Question> },
    GenerationFailed,
    /// Manual submission, or the forced one when the countdown expires.
    AnswerSubmitted { answer: String, timed_out: bool },
    AnswerScored {
        index: usize,
        answer: String,
        score: AnswerScore,
    },
    Summarized { summary: InterviewSummary },
    Tick,
    TogglePause,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::ResumeProcessed { .. } => "ResumeProcessed",
            Event::InfoSubmitted { .. } => "InfoSubmitted",
            Event::QuestionsReady { .. } => "QuestionsReady",
            Event::GenerationFailed => "GenerationFailed",
            Event::AnswerSubmitted { .. } => "AnswerSubmitted",
            Event::AnswerScored { .. } => "AnswerScored",
            Event::Summarized { .. } => "Summarized",
            Event::Tick => "Tick",
            Event::TogglePause => "TogglePause",
        }
    }
}

/// Work requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    GenerateQuestions,
    ScoreAnswer {
        index: usize,
        question: Question,
        answer: String,
    },
    Summarize { questions: Vec<Question> },
    /// The countdown reached zero; the current draft must be submitted now.
    ForceSubmit,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub session: CandidateSession,
    pub effect: Option<Effect>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("{event} is not valid while the session is '{status}'")]
    InvalidTransition {
        status: SessionStatus,
        event: &'static str,
    },

    #[error("Question set does not follow the interview plan ({0} questions)")]
    MalformedQuestionSet(usize),

    #[error("Input cannot be empty")]
    EmptyInput,

    #[error("Interview is paused")]
    Paused,

    #[error("Question {0} has already been answered")]
    AlreadyAnswered(usize),

    #[error("Result for question {actual} does not match current question {expected}")]
    QuestionMismatch { expected: usize, actual: usize },
}

fn invalid(status: SessionStatus, event: &Event) -> TransitionError {
    TransitionError::InvalidTransition {
        status,
        event: event.name(),
    }
}

/// Applies `event` to `session`, returning the next session and any requested work.
pub fn apply(
    session: &CandidateSession,
    event: Event,
    now: DateTime<Utc>,
) -> Result<Step, TransitionError> {
    let mut next = session.clone();
    let effect = match session.status {
        SessionStatus::PendingResume => on_pending_resume(&mut next, event, now)?,
        SessionStatus::CollectingInfo => on_collecting_info(&mut next, event, now)?,
        SessionStatus::StartingInterview => on_starting_interview(&mut next, event, now)?,
        SessionStatus::InProgress => on_in_progress(&mut next, event, now)?,
        SessionStatus::Completed => return Err(invalid(session.status, &event)),
    };
    Ok(Step {
        session: next,
        effect,
    })
}

/// Work a session was waiting on when the process stopped, rebuilt from the
/// persisted session alone.
///
/// A timer at zero with the current question unanswered means a forced
/// submission was being scored; its answer is read back from the timeout
/// notice because drafts are not persisted.
pub fn pending_work(s: &CandidateSession) -> Option<Effect> {
    match s.status {
        SessionStatus::StartingInterview => Some(Effect::GenerateQuestions),
        SessionStatus::InProgress => {
            let progress = &s.interview_progress;
            let index = progress.current_question_index;
            if index >= QUESTION_COUNT {
                return Some(Effect::Summarize {
                    questions: progress.questions.clone(),
                });
            }
            if progress.current_timer_seconds > 0 {
                return None;
            }
            let question = s.current_question().filter(|q| !q.is_answered())?;
            Some(Effect::ScoreAnswer {
                index,
                question: question.clone(),
                answer: timed_out_answer(s).unwrap_or_default(),
            })
        }
        _ => None,
    }
}

fn timed_out_answer(s: &CandidateSession) -> Option<String> {
    let last = s.chat_history.last()?;
    if last.kind != MessageKind::System {
        return None;
    }
    let quoted = last
        .content
        .strip_prefix(TIMEOUT_NOTICE)?
        .strip_prefix('"')?
        .strip_suffix('"')?;
    if quoted == NO_ANSWER {
        return Some(String::new());
    }
    Some(quoted.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Profile intake
// ────────────────────────────────────────────────────────────────────────────

fn on_pending_resume(
    s: &mut CandidateSession,
    event: Event,
    now: DateTime<Utc>,
) -> Result<Option<Effect>, TransitionError> {
    let Event::ResumeProcessed { file_name, profile } = event else {
        return Err(invalid(s.status, &event));
    };

    s.push_message(MessageKind::System, WELCOME, now);
    s.push_message(MessageKind::System, format!("Resume uploaded: {file_name}"), now);
    s.push_message(
        MessageKind::System,
        format!(
            "**Extracted Data**\n• Name: {}\n• Email: {}\n• Phone: {}",
            profile.name, profile.email, profile.phone
        ),
        now,
    );
    s.set_profile(profile);

    match next_missing_field(&s.profile()) {
        Some(field) => {
            s.status = SessionStatus::CollectingInfo;
            s.push_message(
                MessageKind::AiQuestion,
                format!("Hello! I need your **{field}**. Please provide it below."),
                now,
            );
            Ok(None)
        }
        None => {
            s.status = SessionStatus::StartingInterview;
            s.push_message(MessageKind::System, DETAILS_CONFIRMED, now);
            Ok(Some(Effect::GenerateQuestions))
        }
    }
}

fn on_collecting_info(
    s: &mut CandidateSession,
    event: Event,
    now: DateTime<Utc>,
) -> Result<Option<Effect>, TransitionError> {
    let Event::InfoSubmitted { text } = event else {
        return Err(invalid(s.status, &event));
    };
    let input = text.trim();
    if input.is_empty() {
        return Err(TransitionError::EmptyInput);
    }
    s.push_message(MessageKind::User, input, now);

    // A complete profile here means the previous start attempt failed;
    // any input retries it.
    let Some(field) = next_missing_field(&s.profile()) else {
        s.status = SessionStatus::StartingInterview;
        s.push_message(MessageKind::System, DETAILS_CONFIRMED, now);
        return Ok(Some(Effect::GenerateQuestions));
    };

    if !validate_field(field, input) {
        s.push_message(
            MessageKind::System,
            format!("Invalid {field}. Please try again."),
            now,
        );
        return Ok(None);
    }

    let confirmation = match field {
        ProfileField::Name => {
            s.name = input.to_string();
            format!("Thanks, {input}!")
        }
        ProfileField::Email => {
            s.email = input.to_string();
            format!("Email confirmed: {input}")
        }
        ProfileField::Phone => {
            s.phone = input.to_string();
            format!("Phone confirmed: {input}")
        }
    };

    match next_missing_field(&s.profile()) {
        Some(next_field) => {
            s.push_message(
                MessageKind::AiQuestion,
                format!("{confirmation} Now, please provide your **{next_field}**."),
                now,
            );
            Ok(None)
        }
        None => {
            s.status = SessionStatus::StartingInterview;
            s.push_message(
                MessageKind::System,
                format!("{confirmation} {DETAILS_CONFIRMED}"),
                now,
            );
            Ok(Some(Effect::GenerateQuestions))
        }
    }
}

fn on_starting_interview(
    s: &mut CandidateSession,
    event: Event,
    now: DateTime<Utc>,
) -> Result<Option<Effect>, TransitionError> {
    match event {
        Event::QuestionsReady { questions } => {
            if !matches_plan(&questions) || questions.iter().any(Question::is_answered) {
                return Err(TransitionError::MalformedQuestionSet(questions.len()));
            }
            let first_budget = questions[0].timer_budget_seconds;
            let first_text = questions[0].text.clone();

            s.status = SessionStatus::InProgress;
            s.interview_progress = InterviewProgress {
                current_question_index: 0,
                current_timer_seconds: first_budget,
                is_paused: false,
                questions,
            };
            s.push_message(MessageKind::System, INTERVIEW_STARTING, now);
            s.push_message(MessageKind::AiQuestion, first_text, now);
            Ok(None)
        }
        Event::GenerationFailed => {
            s.status = SessionStatus::CollectingInfo;
            s.interview_progress = InterviewProgress::default();
            s.push_message(MessageKind::System, START_FAILED, now);
            Ok(None)
        }
        other => Err(invalid(s.status, &other)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Timed questions
// ────────────────────────────────────────────────────────────────────────────

fn on_in_progress(
    s: &mut CandidateSession,
    event: Event,
    now: DateTime<Utc>,
) -> Result<Option<Effect>, TransitionError> {
    let index = s.interview_progress.current_question_index;

    match event {
        Event::Tick => {
            let progress = &mut s.interview_progress;
            if progress.is_paused {
                return Err(TransitionError::Paused);
            }
            if index >= QUESTION_COUNT || progress.current_timer_seconds == 0 {
                return Err(invalid(s.status, &Event::Tick));
            }
            progress.current_timer_seconds -= 1;
            if progress.current_timer_seconds == 0 {
                return Ok(Some(Effect::ForceSubmit));
            }
            Ok(None)
        }

        Event::TogglePause => {
            if index >= QUESTION_COUNT {
                return Err(invalid(s.status, &Event::TogglePause));
            }
            s.interview_progress.is_paused = !s.interview_progress.is_paused;
            Ok(None)
        }

        Event::AnswerSubmitted { answer, timed_out } => {
            let Some(question) = s.current_question().cloned() else {
                return Err(invalid(s.status, &Event::AnswerSubmitted { answer, timed_out }));
            };
            if question.is_answered() {
                return Err(TransitionError::AlreadyAnswered(index));
            }
            if s.interview_progress.is_paused {
                return Err(TransitionError::Paused);
            }

            let answer = if timed_out {
                let quoted = if answer.trim().is_empty() {
                    NO_ANSWER
                } else {
                    answer.as_str()
                };
                s.push_message(
                    MessageKind::System,
                    format!("{TIMEOUT_NOTICE}\"{quoted}\""),
                    now,
                );
                answer
            } else {
                let trimmed = answer.trim();
                if trimmed.is_empty() {
                    return Err(TransitionError::EmptyInput);
                }
                s.push_message(MessageKind::User, trimmed, now);
                trimmed.to_string()
            };

            Ok(Some(Effect::ScoreAnswer {
                index,
                question,
                answer,
            }))
        }

        Event::AnswerScored {
            index: scored_index,
            answer,
            score,
        } => {
            if scored_index != index {
                return Err(TransitionError::QuestionMismatch {
                    expected: index,
                    actual: scored_index,
                });
            }
            let progress = &mut s.interview_progress;
            let Some(question) = progress.questions.get_mut(index) else {
                return Err(TransitionError::QuestionMismatch {
                    expected: index,
                    actual: scored_index,
                });
            };
            if question.is_answered() {
                return Err(TransitionError::AlreadyAnswered(index));
            }
            question.candidate_answer = Some(answer);
            question.ai_score = Some(score.score);
            question.ai_feedback = Some(score.feedback);

            let next_index = index + 1;
            progress.current_question_index = next_index;
            progress.is_paused = false;

            let next = progress.questions.get(next_index).cloned();
            match &next {
                Some(q) => progress.current_timer_seconds = q.timer_budget_seconds,
                None => progress.current_timer_seconds = 0,
            }

            s.push_message(
                MessageKind::System,
                format!("Question {} scored: {}/100", index + 1, score.score),
                now,
            );

            match next {
                Some(q) => {
                    s.push_message(MessageKind::AiQuestion, q.text, now);
                    Ok(None)
                }
                None => Ok(Some(Effect::Summarize {
                    questions: s.interview_progress.questions.clone(),
                })),
            }
        }

        Event::Summarized { summary } => {
            if index != QUESTION_COUNT {
                return Err(invalid(s.status, &Event::Summarized { summary }));
            }
            s.status = SessionStatus::Completed;
            s.final_score = Some(summary.final_score);
            s.final_summary = Some(summary.final_summary);
            s.push_message(
                MessageKind::System,
                format!("Interview complete! Final score: {}/100", summary.final_score),
                now,
            );
            Ok(None)
        }

        other => Err(invalid(s.status, &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::adapter::fallback::placeholder_questions;
    use crate::models::session::Difficulty;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn step(session: &CandidateSession, event: Event) -> Step {
        apply(session, event, now()).unwrap()
    }

    fn profile(name: &str, email: &str, phone: &str) -> CandidateProfile {
        CandidateProfile {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    fn uploaded(p: CandidateProfile) -> Step {
        step(
            &CandidateSession::new(),
            Event::ResumeProcessed {
                file_name: "cv.pdf".to_string(),
                profile: p,
            },
        )
    }

    fn in_progress() -> CandidateSession {
        let started = uploaded(profile("Jane Doe", "jane@x.com", "555-1234567")).session;
        step(
            &started,
            Event::QuestionsReady {
                questions: placeholder_questions(),
            },
        )
        .session
    }

    fn score(value: u32) -> AnswerScore {
        AnswerScore {
            score: value,
            feedback: format!("scored {value}"),
        }
    }

    fn answer_current(session: &CandidateSession, answer: &str) -> Step {
        let submitted = step(
            session,
            Event::AnswerSubmitted {
                answer: answer.to_string(),
                timed_out: false,
            },
        );
        let Some(Effect::ScoreAnswer { index, answer, .. }) = submitted.effect else {
            panic!("expected a scoring effect");
        };
        step(
            &submitted.session,
            Event::AnswerScored {
                index,
                answer,
                score: score(70 + index as u32),
            },
        )
    }

    fn last_message(session: &CandidateSession) -> &str {
        &session.chat_history.last().unwrap().content
    }

    #[test]
    fn test_complete_profile_skips_collection() {
        let result = uploaded(profile("Jane Doe", "jane@x.com", "555-1234567"));
        assert_eq!(result.session.status, SessionStatus::StartingInterview);
        assert_eq!(result.effect, Some(Effect::GenerateQuestions));
        assert_eq!(result.session.chat_history.len(), 4);
        assert!(result.session.chat_history[2].content.contains("Name: Jane Doe"));
    }

    #[test]
    fn test_missing_email_enters_collection() {
        let result = uploaded(profile("Jane Doe", "N/A", "555-1234567"));
        assert_eq!(result.session.status, SessionStatus::CollectingInfo);
        assert!(result.effect.is_none());
        let prompt = result.session.chat_history.last().unwrap();
        assert_eq!(prompt.kind, MessageKind::AiQuestion);
        assert!(prompt.content.contains("**Email**"));
    }

    #[test]
    fn test_collection_rejects_invalid_email() {
        let collecting = uploaded(profile("Jane Doe", "N/A", "555-1234567")).session;
        let result = step(
            &collecting,
            Event::InfoSubmitted {
                text: "not-an-email".to_string(),
            },
        );
        assert_eq!(result.session.status, SessionStatus::CollectingInfo);
        assert_eq!(result.session.email, "N/A");
        assert_eq!(last_message(&result.session), "Invalid Email. Please try again.");
        let echo = &result.session.chat_history[result.session.chat_history.len() - 2];
        assert_eq!(echo.kind, MessageKind::User);
        assert_eq!(echo.content, "not-an-email");
    }

    #[test]
    fn test_collection_walks_fields_in_order() {
        let collecting = uploaded(CandidateProfile::placeholder()).session;
        let after_name = step(
            &collecting,
            Event::InfoSubmitted {
                text: "  Jane Doe ".to_string(),
            },
        );
        assert_eq!(after_name.session.name, "Jane Doe");
        assert!(last_message(&after_name.session).contains("Thanks, Jane Doe!"));
        assert!(last_message(&after_name.session).contains("**Email**"));

        let after_email = step(
            &after_name.session,
            Event::InfoSubmitted {
                text: "jane@x.com".to_string(),
            },
        );
        assert!(last_message(&after_email.session).contains("**Phone**"));

        let done = step(
            &after_email.session,
            Event::InfoSubmitted {
                text: "+1 (555) 123-4567".to_string(),
            },
        );
        assert_eq!(done.session.status, SessionStatus::StartingInterview);
        assert_eq!(done.effect, Some(Effect::GenerateQuestions));
        assert!(last_message(&done.session).ends_with(DETAILS_CONFIRMED));
    }

    #[test]
    fn test_empty_info_rejected() {
        let collecting = uploaded(CandidateProfile::placeholder()).session;
        let err = apply(
            &collecting,
            Event::InfoSubmitted {
                text: "   ".to_string(),
            },
            now(),
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::EmptyInput);
    }

    #[test]
    fn test_questions_ready_starts_first_question() {
        let session = in_progress();
        let progress = &session.interview_progress;
        assert_eq!(session.status, SessionStatus::InProgress);
        assert_eq!(progress.current_question_index, 0);
        assert_eq!(progress.current_timer_seconds, 20);
        assert_eq!(progress.questions.len(), QUESTION_COUNT);
        assert_eq!(progress.questions[0].difficulty, Difficulty::Easy);
        let last = session.chat_history.last().unwrap();
        assert_eq!(last.kind, MessageKind::AiQuestion);
        assert_eq!(last.content, progress.questions[0].text);
    }

    #[test]
    fn test_malformed_question_set_rejected() {
        let starting = uploaded(profile("Jane Doe", "jane@x.com", "555-1234567")).session;
        let mut questions = placeholder_questions();
        questions.pop();
        let err = apply(&starting, Event::QuestionsReady { questions }, now()).unwrap_err();
        assert_eq!(err, TransitionError::MalformedQuestionSet(5));
    }

    #[test]
    fn test_generation_failure_returns_to_collection() {
        let starting = uploaded(profile("Jane Doe", "jane@x.com", "555-1234567")).session;
        let failed = step(&starting, Event::GenerationFailed);
        assert_eq!(failed.session.status, SessionStatus::CollectingInfo);
        assert!(failed.session.interview_progress.questions.is_empty());
        assert_eq!(last_message(&failed.session), START_FAILED);

        let retried = step(
            &failed.session,
            Event::InfoSubmitted {
                text: "retry".to_string(),
            },
        );
        assert_eq!(retried.session.status, SessionStatus::StartingInterview);
        assert_eq!(retried.effect, Some(Effect::GenerateQuestions));
    }

    #[test]
    fn test_tick_counts_down_and_forces_submit_at_zero() {
        let mut session = in_progress();
        for expected in (1..20).rev() {
            let result = step(&session, Event::Tick);
            assert!(result.effect.is_none());
            assert_eq!(result.session.interview_progress.current_timer_seconds, expected);
            session = result.session;
        }
        let last = step(&session, Event::Tick);
        assert_eq!(last.session.interview_progress.current_timer_seconds, 0);
        assert_eq!(last.effect, Some(Effect::ForceSubmit));

        let err = apply(&last.session, Event::Tick, now()).unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
    }

    #[test]
    fn test_paused_session_rejects_tick_and_manual_submit() {
        let paused = step(&in_progress(), Event::TogglePause).session;
        assert!(paused.interview_progress.is_paused);
        assert_eq!(
            apply(&paused, Event::Tick, now()).unwrap_err(),
            TransitionError::Paused
        );
        let err = apply(
            &paused,
            Event::AnswerSubmitted {
                answer: "answer".to_string(),
                timed_out: false,
            },
            now(),
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::Paused);

        let resumed = step(&paused, Event::TogglePause).session;
        assert!(!resumed.interview_progress.is_paused);
        assert_eq!(resumed.interview_progress.current_timer_seconds, 20);
    }

    #[test]
    fn test_manual_submit_requires_text() {
        let err = apply(
            &in_progress(),
            Event::AnswerSubmitted {
                answer: "  ".to_string(),
                timed_out: false,
            },
            now(),
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::EmptyInput);
    }

    #[test]
    fn test_timeout_with_empty_draft_quotes_no_answer() {
        let result = step(
            &in_progress(),
            Event::AnswerSubmitted {
                answer: String::new(),
                timed_out: true,
            },
        );
        assert_eq!(
            last_message(&result.session),
            "Time's up! Auto-submitting: \"No answer\""
        );
        let Some(Effect::ScoreAnswer { index, answer, .. }) = result.effect else {
            panic!("expected a scoring effect");
        };
        assert_eq!(index, 0);
        assert_eq!(answer, "");
    }

    #[test]
    fn test_scored_answer_advances_to_next_question() {
        let session = in_progress();
        let result = answer_current(&session, "Closures capture variables");
        let progress = &result.session.interview_progress;
        assert_eq!(progress.current_question_index, 1);
        assert_eq!(progress.current_timer_seconds, 20);
        assert_eq!(
            progress.questions[0].candidate_answer.as_deref(),
            Some("Closures capture variables")
        );
        assert_eq!(progress.questions[0].ai_score, Some(70));
        assert!(result.effect.is_none());

        let messages = &result.session.chat_history;
        let n = messages.len();
        assert_eq!(messages[n - 3].kind, MessageKind::User);
        assert_eq!(messages[n - 2].content, "Question 1 scored: 70/100");
        assert_eq!(messages[n - 1].content, progress.questions[1].text);
    }

    #[test]
    fn test_scored_answer_unpauses() {
        let session = in_progress();
        let submitted = step(
            &session,
            Event::AnswerSubmitted {
                answer: "answer".to_string(),
                timed_out: false,
            },
        );
        let mut paused = submitted.session.clone();
        paused.interview_progress.is_paused = true;
        let scored = step(
            &paused,
            Event::AnswerScored {
                index: 0,
                answer: "answer".to_string(),
                score: score(75),
            },
        );
        assert!(!scored.session.interview_progress.is_paused);
    }

    #[test]
    fn test_stale_score_rejected() {
        let session = answer_current(&in_progress(), "first").session;
        let err = apply(
            &session,
            Event::AnswerScored {
                index: 0,
                answer: "again".to_string(),
                score: score(10),
            },
            now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransitionError::QuestionMismatch {
                expected: 1,
                actual: 0
            }
        );
    }

    #[test]
    fn test_last_answer_requests_summary_then_completes() {
        let mut session = in_progress();
        for _ in 0..QUESTION_COUNT - 1 {
            session = answer_current(&session, "answer").session;
        }
        assert_eq!(session.interview_progress.current_question_index, 5);
        assert_eq!(session.interview_progress.current_timer_seconds, 120);

        let last = answer_current(&session, "final answer");
        assert_eq!(last.session.status, SessionStatus::InProgress);
        assert_eq!(last.session.interview_progress.current_question_index, QUESTION_COUNT);
        assert!(last.session.final_score.is_none());
        let Some(Effect::Summarize { questions }) = last.effect else {
            panic!("expected a summary effect");
        };
        assert!(questions.iter().all(Question::is_answered));

        // No ticking, pausing or answering while the summary is produced.
        assert!(apply(&last.session, Event::Tick, now()).is_err());
        assert!(apply(&last.session, Event::TogglePause, now()).is_err());

        let done = step(
            &last.session,
            Event::Summarized {
                summary: InterviewSummary {
                    final_score: 74,
                    final_summary: "Solid fundamentals.".to_string(),
                },
            },
        );
        assert_eq!(done.session.status, SessionStatus::Completed);
        assert_eq!(done.session.final_score, Some(74));
        assert_eq!(done.session.final_summary.as_deref(), Some("Solid fundamentals."));
        assert_eq!(
            last_message(&done.session),
            "Interview complete! Final score: 74/100"
        );
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut session = in_progress();
        session.status = SessionStatus::Completed;
        for event in [
            Event::Tick,
            Event::TogglePause,
            Event::GenerationFailed,
            Event::InfoSubmitted {
                text: "hello".to_string(),
            },
        ] {
            assert!(matches!(
                apply(&session, event, now()),
                Err(TransitionError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn test_summary_before_last_question_rejected() {
        let err = apply(
            &in_progress(),
            Event::Summarized {
                summary: InterviewSummary {
                    final_score: 90,
                    final_summary: "early".to_string(),
                },
            },
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
    }

    #[test]
    fn test_pending_resume_rejects_answers() {
        let err = apply(
            &CandidateSession::new(),
            Event::AnswerSubmitted {
                answer: "hi".to_string(),
                timed_out: false,
            },
            now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                status: SessionStatus::PendingResume,
                event: "AnswerSubmitted",
            }
        );
    }

    #[test]
    fn test_apply_does_not_touch_input() {
        let session = in_progress();
        let before = session.clone();
        let _ = step(&session, Event::Tick);
        assert_eq!(session, before);
    }

    fn timed_out(draft: &str) -> CandidateSession {
        let mut session = in_progress();
        session.interview_progress.current_timer_seconds = 0;
        step(
            &session,
            Event::AnswerSubmitted {
                answer: draft.to_string(),
                timed_out: true,
            },
        )
        .session
    }

    #[test]
    fn test_pending_work_rescores_timed_out_answer() {
        let session = timed_out("half an answer");
        let Some(Effect::ScoreAnswer { index, answer, .. }) = pending_work(&session) else {
            panic!("expected a scoring effect");
        };
        assert_eq!(index, 0);
        assert_eq!(answer, "half an answer");

        let blank = timed_out("   ");
        let Some(Effect::ScoreAnswer { answer, .. }) = pending_work(&blank) else {
            panic!("expected a scoring effect");
        };
        assert_eq!(answer, "");
    }

    #[test]
    fn test_pending_work_for_each_status() {
        assert_eq!(pending_work(&CandidateSession::new()), None);
        assert_eq!(pending_work(&in_progress()), None);

        let mut starting = CandidateSession::new();
        starting.status = SessionStatus::StartingInterview;
        assert_eq!(pending_work(&starting), Some(Effect::GenerateQuestions));

        let mut session = in_progress();
        for _ in 0..QUESTION_COUNT {
            session = answer_current(&session, "answer").session;
        }
        assert!(matches!(
            pending_work(&session),
            Some(Effect::Summarize { questions }) if questions.len() == QUESTION_COUNT
        ));

        session.status = SessionStatus::Completed;
        assert_eq!(pending_work(&session), None);
    }
}
