pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod domain;
pub(crate) mod schemas;
pub(crate) mod services;
pub(crate) mod store;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::services::attempts::AttemptEngine;
use crate::store::{attempts::AttemptStore, question_bank::QuestionBank};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let bank = QuestionBank::load(&settings.content().question_bank_path)?;
    tracing::info!(quizzes = bank.quiz_count(), "Question bank loaded");

    let store = AttemptStore::new(settings.engine().max_swap_attempts);
    let engine = AttemptEngine::new(Arc::new(bank), Arc::new(store));
    let state = AppState::new(settings, engine);

    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "Studyline Attempts API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    Ok(())
}
