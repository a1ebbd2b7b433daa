use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::domain::types::{AttemptStatus, DifficultyLevel, QuestionKind};

#[derive(Debug, Clone)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) kind: QuestionKind,
    pub(crate) prompt: String,
    /// Ordered display options; empty for true/false questions.
    pub(crate) options: Vec<String>,
    pub(crate) correct_answer: String,
    pub(crate) points: u32,
    pub(crate) explanation: Option<String>,
    pub(crate) difficulty: Option<DifficultyLevel>,
    pub(crate) taxonomy_tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct Quiz {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) questions: Vec<Question>,
    /// Absent means the quiz has no pass/fail gate.
    pub(crate) passing_score: Option<u32>,
}

impl Quiz {
    pub(crate) fn score_total(&self) -> u32 {
        self.questions.iter().map(|question| question.points).sum()
    }

    pub(crate) fn question_index(&self, question_id: &str) -> Option<usize> {
        self.questions.iter().position(|question| question.id == question_id)
    }

    pub(crate) fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == question_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnswerEntry {
    pub(crate) question_id: String,
    /// Ordinal index of the question in the quiz at the time of answering.
    pub(crate) position: usize,
    /// `None` encodes an explicit "I don't know"; it always grades as wrong.
    pub(crate) selected_option: Option<String>,
    pub(crate) is_correct: bool,
    pub(crate) points_earned: u32,
    pub(crate) answered_at: PrimitiveDateTime,
}

#[derive(Debug, Clone)]
pub(crate) struct Attempt {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) learner_id: String,
    pub(crate) status: AttemptStatus,
    /// At most one entry per question, kept ordered by position.
    pub(crate) answers: Vec<AnswerEntry>,
    pub(crate) answered_count: u32,
    pub(crate) score_earned: u32,
    pub(crate) score_total: u32,
    /// Computed at grading time only; stays `None` for quizzes without a
    /// passing score.
    pub(crate) passed: Option<bool>,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) submitted_at: Option<PrimitiveDateTime>,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl Attempt {
    pub(crate) fn new(quiz: &Quiz, learner_id: &str, now: PrimitiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            quiz_id: quiz.id.clone(),
            learner_id: learner_id.to_string(),
            status: AttemptStatus::InProgress,
            answers: Vec::new(),
            answered_count: 0,
            score_earned: 0,
            score_total: quiz.score_total(),
            passed: None,
            started_at: now,
            submitted_at: None,
            updated_at: now,
        }
    }
}
