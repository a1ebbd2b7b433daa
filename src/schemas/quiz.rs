use serde::Serialize;

use crate::domain::models::{Question, Quiz};
use crate::domain::types::{DifficultyLevel, QuestionKind};

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) kind: QuestionKind,
    pub(crate) prompt: String,
    pub(crate) options: Vec<String>,
    pub(crate) points: u32,
    pub(crate) difficulty: Option<DifficultyLevel>,
    pub(crate) taxonomy_tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) passing_score: Option<u32>,
    pub(crate) total_count: usize,
    pub(crate) score_total: u32,
    pub(crate) questions: Vec<QuestionResponse>,
}

impl QuizResponse {
    /// Correct answers and explanations are not serialized; grading happens
    /// server side only.
    pub(crate) fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            passing_score: quiz.passing_score,
            total_count: quiz.questions.len(),
            score_total: quiz.score_total(),
            questions: quiz.questions.iter().map(question_response).collect(),
        }
    }
}

fn question_response(question: &Question) -> QuestionResponse {
    QuestionResponse {
        id: question.id.clone(),
        kind: question.kind,
        prompt: question.prompt.clone(),
        options: question.options.clone(),
        points: question.points,
        difficulty: question.difficulty,
        taxonomy_tags: question.taxonomy_tags.clone(),
    }
}
