use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_owner, CurrentLearner};
use crate::core::state::AppState;
use crate::schemas::attempt::{AnswerSubmitRequest, AttemptResponse, StartAttemptRequest};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_attempt))
        .route("/:attempt_id", get(get_attempt))
        .route("/:attempt_id/answers", post(record_answer))
        .route("/:attempt_id/submit", post(submit_attempt))
}

async fn start_attempt(
    CurrentLearner(learner_id): CurrentLearner,
    State(state): State<AppState>,
    Json(payload): Json<StartAttemptRequest>,
) -> Result<(StatusCode, Json<AttemptResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let outcome = state.engine().start_or_resume(&learner_id, &payload.quiz_id, payload.restart)?;
    let quiz = state
        .engine()
        .quiz(&outcome.attempt.quiz_id)
        .map_err(|e| ApiError::internal(e, "Quiz missing for attempt"))?;

    let status = if outcome.created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(AttemptResponse::from_attempt(&outcome.attempt, &quiz))))
}

async fn get_attempt(
    Path(attempt_id): Path<String>,
    CurrentLearner(learner_id): CurrentLearner,
    State(state): State<AppState>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let attempt = state.engine().attempt(&attempt_id)?;
    require_owner(&attempt, &learner_id)?;

    let quiz = state
        .engine()
        .quiz(&attempt.quiz_id)
        .map_err(|e| ApiError::internal(e, "Quiz missing for attempt"))?;
    Ok(Json(AttemptResponse::from_attempt(&attempt, &quiz)))
}

async fn record_answer(
    Path(attempt_id): Path<String>,
    CurrentLearner(learner_id): CurrentLearner,
    State(state): State<AppState>,
    Json(payload): Json<AnswerSubmitRequest>,
) -> Result<Json<AttemptResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let attempt = state.engine().attempt(&attempt_id)?;
    require_owner(&attempt, &learner_id)?;

    let updated = state.engine().record_answer(
        &attempt_id,
        &payload.question_id,
        payload.selected_option.as_deref(),
    )?;
    let quiz = state
        .engine()
        .quiz(&updated.quiz_id)
        .map_err(|e| ApiError::internal(e, "Quiz missing for attempt"))?;
    Ok(Json(AttemptResponse::from_attempt(&updated, &quiz)))
}

async fn submit_attempt(
    Path(attempt_id): Path<String>,
    CurrentLearner(learner_id): CurrentLearner,
    State(state): State<AppState>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let attempt = state.engine().attempt(&attempt_id)?;
    require_owner(&attempt, &learner_id)?;

    let graded = state.engine().submit(&attempt_id)?;
    let quiz = state
        .engine()
        .quiz(&graded.quiz_id)
        .map_err(|e| ApiError::internal(e, "Quiz missing for attempt"))?;
    Ok(Json(AttemptResponse::from_attempt(&graded, &quiz)))
}
