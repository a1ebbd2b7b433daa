use std::sync::Arc;

use crate::core::time::primitive_now_utc;
use crate::domain::models::{Attempt, Quiz};
use crate::domain::types::AttemptStatus;
use crate::domain::AttemptError;
use crate::services::grading;
use crate::store::attempts::AttemptStore;
use crate::store::question_bank::QuestionBank;

/// The attempt state machine.
///
/// Holds the immutable quiz read model and the attempt store; every mutation
/// goes through the store's compare-and-swap so progress and score are
/// recomputed from the full answer set in isolation.
#[derive(Clone)]
pub(crate) struct AttemptEngine {
    bank: Arc<QuestionBank>,
    store: Arc<AttemptStore>,
}

#[derive(Debug)]
pub(crate) struct StartOutcome {
    pub(crate) attempt: Arc<Attempt>,
    /// True when a fresh attempt was created rather than resumed.
    pub(crate) created: bool,
}

impl AttemptEngine {
    pub(crate) fn new(bank: Arc<QuestionBank>, store: Arc<AttemptStore>) -> Self {
        Self { bank, store }
    }

    pub(crate) fn quiz(&self, quiz_id: &str) -> Result<Arc<Quiz>, AttemptError> {
        self.bank.quiz(quiz_id).ok_or_else(|| AttemptError::QuizNotFound(quiz_id.to_string()))
    }

    pub(crate) fn attempt(&self, attempt_id: &str) -> Result<Arc<Attempt>, AttemptError> {
        self.store
            .get(attempt_id)
            .ok_or_else(|| AttemptError::AttemptNotFound(attempt_id.to_string()))
    }

    pub(crate) fn quiz_count(&self) -> usize {
        self.bank.quiz_count()
    }

    pub(crate) fn attempt_count(&self) -> usize {
        self.store.attempt_count()
    }

    /// Resumes the learner's most recent attempt for the quiz, or creates a
    /// fresh one when none exists or `restart` is set. A graded attempt
    /// resumes as-is; callers inspect `status` and treat it as a read-only
    /// results view.
    pub(crate) fn start_or_resume(
        &self,
        learner_id: &str,
        quiz_id: &str,
        restart: bool,
    ) -> Result<StartOutcome, AttemptError> {
        let quiz = self.quiz(quiz_id)?;

        // Resume is the common path and needs no write guard.
        if !restart {
            if let Some(existing) = self.store.latest_for(learner_id, quiz_id) {
                metrics::counter!("attempts_resumed_total").increment(1);
                return Ok(StartOutcome { attempt: existing, created: false });
            }
        }

        let (attempt, created) = self.store.start_attempt(learner_id, quiz_id, restart, || {
            Attempt::new(&quiz, learner_id, primitive_now_utc())
        });

        if created {
            metrics::counter!("attempts_started_total").increment(1);
            tracing::info!(
                attempt_id = %attempt.id,
                quiz_id = %quiz_id,
                learner_id = %learner_id,
                restart,
                "Attempt started"
            );
        } else {
            metrics::counter!("attempts_resumed_total").increment(1);
        }

        Ok(StartOutcome { attempt, created })
    }

    /// Upserts one answer and returns the recomputed attempt.
    pub(crate) fn record_answer(
        &self,
        attempt_id: &str,
        question_id: &str,
        selected_option: Option<&str>,
    ) -> Result<Arc<Attempt>, AttemptError> {
        let result = self.store.compare_and_swap(attempt_id, |current| {
            let quiz = self.quiz(&current.quiz_id)?;
            grading::apply_answer(current, &quiz, question_id, selected_option, primitive_now_utc())
        });

        match &result {
            Ok(attempt) => {
                metrics::counter!("answers_recorded_total").increment(1);
                tracing::debug!(
                    attempt_id = %attempt.id,
                    question_id = %question_id,
                    answered_count = attempt.answered_count,
                    "Answer recorded"
                );
            }
            Err(AttemptError::Conflict(_)) => {
                metrics::counter!("answer_conflicts_total").increment(1);
            }
            Err(_) => {}
        }

        result
    }

    /// Grades the attempt in one transition. Submit is idempotent: a graded
    /// attempt is returned as stored, with no new mutation.
    pub(crate) fn submit(&self, attempt_id: &str) -> Result<Arc<Attempt>, AttemptError> {
        let result = self.store.compare_and_swap(attempt_id, |current| {
            let quiz = self.quiz(&current.quiz_id)?;
            grading::finalize(current, &quiz, primitive_now_utc())
        });

        match result {
            Ok(attempt) => {
                metrics::counter!("attempts_graded_total").increment(1);
                tracing::info!(
                    attempt_id = %attempt.id,
                    score_earned = attempt.score_earned,
                    score_total = attempt.score_total,
                    passed = ?attempt.passed,
                    "Attempt graded"
                );
                Ok(attempt)
            }
            Err(AttemptError::AlreadyGraded(_)) => self.attempt(attempt_id),
            Err(err) => Err(err),
        }
    }
}

/// The question index a client should display when reopening an attempt.
///
/// Pure and deterministic given (attempt, quiz size) so client and server
/// agree without extra round trips.
pub(crate) fn resume_position(attempt: &Attempt, total_questions: usize) -> usize {
    let last_index = total_questions.saturating_sub(1);
    match attempt.status {
        AttemptStatus::InProgress => {
            if attempt.answered_count == 0 {
                0
            } else {
                (attempt.answered_count as usize).min(last_index)
            }
        }
        AttemptStatus::Submitted | AttemptStatus::Graded => last_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_support;

    fn engine() -> AttemptEngine {
        let bank = QuestionBank::from_quizzes(vec![test_support::chem_quiz()]);
        AttemptEngine::new(Arc::new(bank), Arc::new(AttemptStore::new(4)))
    }

    #[test]
    fn start_or_resume_is_idempotent() {
        let engine = engine();
        let first = engine.start_or_resume("learner-1", "chem-basics", false).expect("start");
        assert!(first.created);

        let second = engine.start_or_resume("learner-1", "chem-basics", false).expect("resume");
        assert!(!second.created);
        assert_eq!(first.attempt.id, second.attempt.id);
    }

    #[test]
    fn start_unknown_quiz_fails() {
        let engine = engine();
        let error = engine.start_or_resume("learner-1", "missing", false).expect_err("unknown quiz");
        assert!(matches!(error, AttemptError::QuizNotFound(_)));
    }

    #[test]
    fn restart_leaves_graded_attempt_intact() {
        let engine = engine();
        let first = engine.start_or_resume("learner-1", "chem-basics", false).expect("start");
        engine.submit(&first.attempt.id).expect("submit");

        let fresh = engine.start_or_resume("learner-1", "chem-basics", true).expect("restart");
        assert!(fresh.created);
        assert_ne!(fresh.attempt.id, first.attempt.id);
        assert_eq!(fresh.attempt.answered_count, 0);

        let old = engine.attempt(&first.attempt.id).expect("old attempt");
        assert_eq!(old.status, AttemptStatus::Graded);
    }

    #[test]
    fn graded_attempt_resumes_as_results_view() {
        let engine = engine();
        let started = engine.start_or_resume("learner-1", "chem-basics", false).expect("start");
        engine.submit(&started.attempt.id).expect("submit");

        let resumed = engine.start_or_resume("learner-1", "chem-basics", false).expect("resume");
        assert!(!resumed.created);
        assert_eq!(resumed.attempt.id, started.attempt.id);
        assert_eq!(resumed.attempt.status, AttemptStatus::Graded);
    }

    #[test]
    fn submit_twice_returns_identical_record() {
        let engine = engine();
        let started = engine.start_or_resume("learner-1", "chem-basics", false).expect("start");
        engine.record_answer(&started.attempt.id, "chem-q1", Some("Oxygen")).expect("answer");

        let first = engine.submit(&started.attempt.id).expect("first submit");
        let second = engine.submit(&started.attempt.id).expect("second submit");

        assert_eq!(first.id, second.id);
        assert_eq!(first.score_earned, second.score_earned);
        assert_eq!(first.submitted_at, second.submitted_at);
        assert_eq!(first.updated_at, second.updated_at, "second submit must not mutate");
    }

    #[test]
    fn record_answer_after_submit_is_rejected() {
        let engine = engine();
        let started = engine.start_or_resume("learner-1", "chem-basics", false).expect("start");
        engine.submit(&started.attempt.id).expect("submit");

        let error = engine
            .record_answer(&started.attempt.id, "chem-q1", Some("Oxygen"))
            .expect_err("closed");
        assert!(matches!(error, AttemptError::AttemptClosed(_)));
    }

    #[test]
    fn resume_position_walks_forward_and_clamps() {
        let engine = engine();
        let started = engine.start_or_resume("learner-1", "chem-basics", false).expect("start");
        assert_eq!(resume_position(&started.attempt, 3), 0);

        let one = engine.record_answer(&started.attempt.id, "chem-q1", Some("Oxygen")).expect("q1");
        assert_eq!(resume_position(&one, 3), 1);

        let two = engine.record_answer(&one.id, "chem-q2", Some("true")).expect("q2");
        assert_eq!(resume_position(&two, 3), 2);

        let three = engine.record_answer(&two.id, "chem-q3", None).expect("q3");
        assert_eq!(resume_position(&three, 3), 2, "clamped to the last question");

        let graded = engine.submit(&three.id).expect("submit");
        assert_eq!(resume_position(&graded, 3), 2);
    }

    #[test]
    fn resume_position_handles_empty_quiz() {
        let engine = engine();
        let started = engine.start_or_resume("learner-1", "chem-basics", false).expect("start");
        assert_eq!(resume_position(&started.attempt, 0), 0);
    }
}
