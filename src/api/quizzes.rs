use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentLearner;
use crate::core::state::AppState;
use crate::schemas::quiz::QuizResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:quiz_id", get(get_quiz))
}

async fn get_quiz(
    Path(quiz_id): Path<String>,
    CurrentLearner(_learner_id): CurrentLearner,
    State(state): State<AppState>,
) -> Result<Json<QuizResponse>, ApiError> {
    let quiz = state.engine().quiz(&quiz_id)?;
    Ok(Json(QuizResponse::from_quiz(&quiz)))
}
