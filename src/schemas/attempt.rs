use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::domain::models::{AnswerEntry, Attempt, Quiz};
use crate::domain::types::AttemptStatus;
use crate::services::attempts::resume_position;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StartAttemptRequest {
    #[validate(length(min = 1, message = "quiz_id must not be empty"))]
    #[serde(alias = "quizId")]
    pub(crate) quiz_id: String,
    #[serde(default)]
    pub(crate) restart: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnswerSubmitRequest {
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    /// Absent or null both encode the "I don't know" action.
    #[serde(default)]
    #[serde(alias = "selectedOption")]
    pub(crate) selected_option: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerEntryResponse {
    pub(crate) question_id: String,
    pub(crate) position: usize,
    pub(crate) selected_option: Option<String>,
    pub(crate) is_correct: bool,
    pub(crate) points_earned: u32,
    pub(crate) explanation: Option<String>,
    pub(crate) answered_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) learner_id: String,
    pub(crate) status: AttemptStatus,
    pub(crate) answered_count: u32,
    pub(crate) total_count: usize,
    pub(crate) progress_pct: u32,
    pub(crate) last_question_position: usize,
    pub(crate) answers: Vec<AnswerEntryResponse>,
    pub(crate) score_earned: u32,
    pub(crate) score_total: u32,
    pub(crate) passed: Option<bool>,
    pub(crate) started_at: String,
    pub(crate) submitted_at: Option<String>,
    pub(crate) updated_at: String,
}

impl AttemptResponse {
    pub(crate) fn from_attempt(attempt: &Attempt, quiz: &Quiz) -> Self {
        let total_count = quiz.questions.len();
        Self {
            id: attempt.id.clone(),
            quiz_id: attempt.quiz_id.clone(),
            learner_id: attempt.learner_id.clone(),
            status: attempt.status,
            answered_count: attempt.answered_count,
            total_count,
            progress_pct: progress_pct(attempt.answered_count, total_count),
            last_question_position: resume_position(attempt, total_count),
            answers: attempt.answers.iter().map(|entry| answer_entry_response(entry, quiz)).collect(),
            score_earned: attempt.score_earned,
            score_total: attempt.score_total,
            passed: attempt.passed,
            started_at: format_primitive(attempt.started_at),
            submitted_at: attempt.submitted_at.map(format_primitive),
            updated_at: format_primitive(attempt.updated_at),
        }
    }
}

fn answer_entry_response(entry: &AnswerEntry, quiz: &Quiz) -> AnswerEntryResponse {
    AnswerEntryResponse {
        question_id: entry.question_id.clone(),
        position: entry.position,
        selected_option: entry.selected_option.clone(),
        is_correct: entry.is_correct,
        points_earned: entry.points_earned,
        explanation: quiz
            .question(&entry.question_id)
            .and_then(|question| question.explanation.clone()),
        answered_at: format_primitive(entry.answered_at),
    }
}

fn progress_pct(answered_count: u32, total_count: usize) -> u32 {
    if total_count == 0 {
        return 0;
    }
    ((f64::from(answered_count) / total_count as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_pct_rounds_to_nearest() {
        assert_eq!(progress_pct(0, 3), 0);
        assert_eq!(progress_pct(1, 3), 33);
        assert_eq!(progress_pct(2, 3), 67);
        assert_eq!(progress_pct(3, 3), 100);
        assert_eq!(progress_pct(0, 0), 0);
    }
}
