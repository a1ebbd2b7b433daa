use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::domain::models::Attempt;

/// Authentication happens upstream; the gateway only receives the resolved
/// learner identity in this header and treats it as opaque.
pub(crate) const LEARNER_ID_HEADER: &str = "x-learner-id";

pub(crate) struct CurrentLearner(pub(crate) String);

#[async_trait]
impl FromRequestParts<AppState> for CurrentLearner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let learner_id = parts
            .headers
            .get(LEARNER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::Unauthorized("Learner identity required"))?;

        Ok(CurrentLearner(learner_id.to_string()))
    }
}

pub(crate) fn require_owner(attempt: &Attempt, learner_id: &str) -> Result<(), ApiError> {
    if attempt.learner_id != learner_id {
        return Err(ApiError::Forbidden("Access denied"));
    }
    Ok(())
}
