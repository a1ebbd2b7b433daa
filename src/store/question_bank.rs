use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use serde::Deserialize;
use validator::Validate;

use crate::domain::models::{Question, Quiz};
use crate::domain::types::{DifficultyLevel, QuestionKind};

#[derive(Debug, Deserialize, Validate)]
struct QuizDefinition {
    #[validate(length(min = 1, message = "quiz id must not be empty"))]
    id: String,
    #[validate(length(min = 1, message = "quiz title must not be empty"))]
    title: String,
    #[serde(default)]
    #[serde(alias = "passingScore")]
    passing_score: Option<u32>,
    #[validate(nested)]
    questions: Vec<QuestionDefinition>,
}

#[derive(Debug, Deserialize, Validate)]
struct QuestionDefinition {
    #[validate(length(min = 1, message = "question id must not be empty"))]
    id: String,
    kind: QuestionKind,
    #[validate(length(min = 1, message = "question prompt must not be empty"))]
    prompt: String,
    #[serde(default)]
    options: Vec<String>,
    #[validate(length(min = 1, message = "correct_answer must not be empty"))]
    #[serde(alias = "correctAnswer")]
    correct_answer: String,
    points: u32,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    #[serde(alias = "taxonomyTags")]
    taxonomy_tags: Vec<String>,
}

/// Immutable read model of the quiz content, keyed by quiz id.
///
/// Authoring happens elsewhere; this side only loads the exported content
/// file once at startup and serves lookups.
#[derive(Debug)]
pub(crate) struct QuestionBank {
    quizzes: HashMap<String, Arc<Quiz>>,
}

impl QuestionBank {
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read question bank: {}", path.display()))?;
        let definitions: Vec<QuizDefinition> =
            serde_json::from_str(&raw).context("question bank json has invalid format")?;
        Self::from_definitions(definitions)
    }

    fn from_definitions(definitions: Vec<QuizDefinition>) -> anyhow::Result<Self> {
        let mut quizzes = HashMap::new();

        for definition in definitions {
            definition
                .validate()
                .map_err(|err| anyhow!("quiz {:?} failed validation: {err}", definition.id))?;
            let quiz = convert_quiz(definition)?;
            let quiz_id = quiz.id.clone();
            if quizzes.insert(quiz_id.clone(), Arc::new(quiz)).is_some() {
                return Err(anyhow!("duplicate quiz id {quiz_id} in question bank"));
            }
        }

        Ok(Self { quizzes })
    }

    #[cfg(test)]
    pub(crate) fn from_quizzes(quizzes: Vec<Quiz>) -> Self {
        Self {
            quizzes: quizzes.into_iter().map(|quiz| (quiz.id.clone(), Arc::new(quiz))).collect(),
        }
    }

    pub(crate) fn quiz(&self, quiz_id: &str) -> Option<Arc<Quiz>> {
        self.quizzes.get(quiz_id).cloned()
    }

    pub(crate) fn quiz_count(&self) -> usize {
        self.quizzes.len()
    }
}

fn convert_quiz(definition: QuizDefinition) -> anyhow::Result<Quiz> {
    let quiz_id = definition.id;
    let mut questions = Vec::with_capacity(definition.questions.len());
    let mut seen_question_ids = std::collections::HashSet::new();

    for question in definition.questions {
        if !seen_question_ids.insert(question.id.clone()) {
            return Err(anyhow!("duplicate question id {} in quiz {quiz_id}", question.id));
        }
        questions.push(convert_question(&quiz_id, question)?);
    }

    Ok(Quiz { id: quiz_id, title: definition.title, questions, passing_score: definition.passing_score })
}

fn convert_question(quiz_id: &str, definition: QuestionDefinition) -> anyhow::Result<Question> {
    match definition.kind {
        QuestionKind::TrueFalse => {
            if !definition.options.is_empty() {
                return Err(anyhow!(
                    "true/false question {} in quiz {quiz_id} must not define options",
                    definition.id
                ));
            }
        }
        QuestionKind::MultipleChoice | QuestionKind::Scenario => {
            if definition.options.len() < 2 {
                return Err(anyhow!(
                    "question {} in quiz {quiz_id} needs at least two options",
                    definition.id
                ));
            }
        }
    }

    Ok(Question {
        id: definition.id,
        kind: definition.kind,
        prompt: definition.prompt,
        options: definition.options,
        correct_answer: definition.correct_answer,
        points: definition.points,
        explanation: definition.explanation,
        difficulty: definition.difficulty,
        taxonomy_tags: definition.taxonomy_tags,
    })
}
