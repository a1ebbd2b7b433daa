pub(crate) mod models;
pub(crate) mod types;

use thiserror::Error;

/// Errors produced by the attempt state machine and its store.
///
/// `Conflict` is transient: the caller may safely re-issue the same request.
/// Every other kind is terminal for the current call.
#[derive(Debug, Error)]
pub(crate) enum AttemptError {
    #[error("quiz {0} not found")]
    QuizNotFound(String),
    #[error("attempt {0} not found")]
    AttemptNotFound(String),
    #[error("attempt {0} is no longer accepting answers")]
    AttemptClosed(String),
    #[error("question {question_id} does not belong to quiz {quiz_id}")]
    QuestionNotInQuiz { question_id: String, quiz_id: String },
    #[error("attempt {0} is already graded")]
    AlreadyGraded(String),
    #[error("attempt {0} was updated concurrently")]
    Conflict(String),
}
