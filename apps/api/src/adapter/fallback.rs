//! Local substitutes used when the AI service cannot be reached.

use rand::Rng;

use crate::models::session::{
    AnswerScore, CandidateProfile, Difficulty, InterviewSummary, Question, QUESTION_PLAN,
};

/// Every field set to the missing-value placeholder, which sends the session
/// into manual collection.
pub fn placeholder_profile() -> CandidateProfile {
    CandidateProfile::placeholder()
}

/// Six placeholder questions following the fixed plan, tagged `[MOCK Qn - Level]`.
pub fn placeholder_questions() -> Vec<Question> {
    QUESTION_PLAN
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| {
            let topic = match slot.difficulty {
                Difficulty::Easy => "a core concept you use every day in your stack",
                Difficulty::Medium => "a design trade-off you made in a recent project",
                Difficulty::Hard => "how you would design and scale a system you have built",
            };
            let text = format!(
                "[MOCK Q{} - {}] Describe {topic}.",
                i + 1,
                slot.difficulty
            );
            Question::from_plan(i, text)
        })
        .collect()
}

/// A pseudo-random score in [50, 99] with feedback citing the answer length.
pub fn synthesized_score(answer: &str) -> AnswerScore {
    let score = rand::thread_rng().gen_range(50..100);
    let length = answer.trim().chars().count();
    AnswerScore {
        score,
        feedback: format!(
            "Your answer ({length} characters) scored {score}/100. \
             Consider providing more detail and specific examples."
        ),
    }
}

/// Rounded mean of the recorded per-question scores.
pub fn synthesized_summary(questions: &[Question]) -> InterviewSummary {
    let scores: Vec<u32> = questions.iter().filter_map(|q| q.ai_score).collect();
    let final_score = if scores.is_empty() {
        0
    } else {
        let total: u32 = scores.iter().sum();
        (f64::from(total) / scores.len() as f64).round() as u32
    };
    InterviewSummary {
        final_score,
        final_summary: format!(
            "Overall performance: {final_score}/100 based on {} questions answered.",
            scores.len()
        ),
    }
}
