use time::PrimitiveDateTime;

use crate::domain::models::{AnswerEntry, Attempt, Question, Quiz};
use crate::domain::types::AttemptStatus;
use crate::domain::AttemptError;

/// Grades one selection against a question.
///
/// A `None` selection (the learner's "I don't know") is always wrong;
/// anything else is exact string equality with the stored correct answer,
/// with no trimming or case folding.
pub(crate) fn evaluate(question: &Question, selected_option: Option<&str>) -> (bool, u32) {
    let is_correct = match selected_option {
        None => false,
        Some(selected) => selected == question.correct_answer,
    };
    let points_earned = if is_correct { question.points } else { 0 };
    (is_correct, points_earned)
}

/// Builds the successor attempt with the given answer upserted.
///
/// Re-answering a question replaces its entry (last write wins); the derived
/// counters are recomputed from the full answer set, never incremented.
pub(crate) fn apply_answer(
    current: &Attempt,
    quiz: &Quiz,
    question_id: &str,
    selected_option: Option<&str>,
    now: PrimitiveDateTime,
) -> Result<Attempt, AttemptError> {
    if current.status != AttemptStatus::InProgress {
        return Err(AttemptError::AttemptClosed(current.id.clone()));
    }

    let Some(position) = quiz.question_index(question_id) else {
        return Err(AttemptError::QuestionNotInQuiz {
            question_id: question_id.to_string(),
            quiz_id: quiz.id.clone(),
        });
    };
    let question = &quiz.questions[position];
    let (is_correct, points_earned) = evaluate(question, selected_option);

    let entry = AnswerEntry {
        question_id: question_id.to_string(),
        position,
        selected_option: selected_option.map(str::to_string),
        is_correct,
        points_earned,
        answered_at: now,
    };

    let mut next = current.clone();
    match next.answers.iter_mut().find(|existing| existing.question_id == question_id) {
        Some(existing) => *existing = entry,
        None => {
            next.answers.push(entry);
            next.answers.sort_by_key(|answer| answer.position);
        }
    }
    recompute(&mut next, quiz, now);
    Ok(next)
}

/// Recomputes every derived field from the answer set and the quiz.
pub(crate) fn recompute(attempt: &mut Attempt, quiz: &Quiz, now: PrimitiveDateTime) {
    attempt.answered_count = attempt.answers.len() as u32;
    attempt.score_earned = attempt.answers.iter().map(|entry| entry.points_earned).sum();
    attempt.score_total = quiz.score_total();
    attempt.updated_at = now;
}

/// Builds the graded successor of an in-progress attempt.
///
/// Submission and grading are one transition; the submitted state is walked
/// through but never persisted on its own. Unanswered questions grade as
/// zero points and still count toward the total.
pub(crate) fn finalize(
    current: &Attempt,
    quiz: &Quiz,
    now: PrimitiveDateTime,
) -> Result<Attempt, AttemptError> {
    if current.status == AttemptStatus::Graded {
        return Err(AttemptError::AlreadyGraded(current.id.clone()));
    }

    let mut next = current.clone();
    next.status = AttemptStatus::Submitted;
    next.submitted_at = Some(now);
    recompute(&mut next, quiz, now);
    next.passed = quiz.passing_score.map(|threshold| next.score_earned >= threshold);
    next.status = AttemptStatus::Graded;
    Ok(next)
}
