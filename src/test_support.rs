use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::api;
use crate::api::guards::LEARNER_ID_HEADER;
use crate::core::{config::Settings, state::AppState};
use crate::domain::models::{Question, Quiz};
use crate::domain::types::QuestionKind;
use crate::services::attempts::AttemptEngine;
use crate::store::{attempts::AttemptStore, question_bank::QuestionBank};

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("STUDYLINE_ENV", "test");
    std::env::set_var("STUDYLINE_STRICT_CONFIG", "0");
    std::env::set_var("ATTEMPT_SWAP_RETRIES", "4");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
}

pub(crate) async fn setup_test_context() -> TestContext {
    let guard = env_lock().await;
    set_test_env();

    let settings = Settings::load().expect("settings");
    let bank = QuestionBank::from_quizzes(vec![chem_quiz(), survey_quiz()]);
    let store = AttemptStore::new(settings.engine().max_swap_attempts);
    let engine = AttemptEngine::new(Arc::new(bank), Arc::new(store));
    let state = AppState::new(settings, engine);
    let app = api::router::router(state.clone());

    TestContext { state, app, _guard: guard }
}

/// Three questions worth 1/1/2 points with a passing score of 2.
pub(crate) fn chem_quiz() -> Quiz {
    Quiz {
        id: "chem-basics".to_string(),
        title: "Chemistry basics".to_string(),
        passing_score: Some(2),
        questions: vec![
            Question {
                id: "chem-q1".to_string(),
                kind: QuestionKind::MultipleChoice,
                prompt: "Which gas do plants release during photosynthesis?".to_string(),
                options: vec![
                    "Oxygen".to_string(),
                    "Carbon dioxide".to_string(),
                    "Nitrogen".to_string(),
                ],
                correct_answer: "Oxygen".to_string(),
                points: 1,
                explanation: Some("Photosynthesis splits water and releases oxygen.".to_string()),
                difficulty: None,
                taxonomy_tags: vec!["recall".to_string()],
            },
            Question {
                id: "chem-q2".to_string(),
                kind: QuestionKind::TrueFalse,
                prompt: "Water boils at 90 degrees Celsius at sea level.".to_string(),
                options: Vec::new(),
                correct_answer: "false".to_string(),
                points: 1,
                explanation: None,
                difficulty: None,
                taxonomy_tags: Vec::new(),
            },
            Question {
                id: "chem-q3".to_string(),
                kind: QuestionKind::Scenario,
                prompt: "You need to measure 25.0 mL of acid precisely. Which glassware do you pick?"
                    .to_string(),
                options: vec![
                    "Beaker".to_string(),
                    "Burette".to_string(),
                    "Watch glass".to_string(),
                ],
                correct_answer: "Burette".to_string(),
                points: 2,
                explanation: Some("A burette dispenses precise volumes.".to_string()),
                difficulty: None,
                taxonomy_tags: vec!["application".to_string()],
            },
        ],
    }
}

/// Two questions, no passing score: `passed` stays null after grading.
pub(crate) fn survey_quiz() -> Quiz {
    Quiz {
        id: "study-habits".to_string(),
        title: "Study habits check".to_string(),
        passing_score: None,
        questions: vec![
            Question {
                id: "habit-q1".to_string(),
                kind: QuestionKind::MultipleChoice,
                prompt: "How often should you review notes?".to_string(),
                options: vec!["Daily".to_string(), "Never".to_string()],
                correct_answer: "Daily".to_string(),
                points: 1,
                explanation: None,
                difficulty: None,
                taxonomy_tags: Vec::new(),
            },
            Question {
                id: "habit-q2".to_string(),
                kind: QuestionKind::TrueFalse,
                prompt: "Cramming beats spaced repetition.".to_string(),
                options: Vec::new(),
                correct_answer: "false".to_string(),
                points: 1,
                explanation: None,
                difficulty: None,
                taxonomy_tags: Vec::new(),
            },
        ],
    }
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    learner_id: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(learner_id) = learner_id {
        builder = builder.header(LEARNER_ID_HEADER, learner_id);
    }

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}
