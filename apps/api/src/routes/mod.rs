pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers as interview;
use crate::state::AppState;
use crate::storage::handlers as candidates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening sessions
        .route("/api/v1/sessions", post(interview::handle_start_session))
        .route(
            "/api/v1/sessions/:id",
            get(interview::handle_get_session).delete(interview::handle_end_session),
        )
        .route(
            "/api/v1/sessions/:id/messages",
            post(interview::handle_send_message),
        )
        // Stored candidate records
        .route("/api/v1/candidates", get(candidates::handle_list_candidates))
        .route(
            "/api/v1/candidates/:id",
            get(candidates::handle_get_candidate),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::interview::flow::FlowController;
    use crate::interview::questions::QuestionGenerator;
    use crate::interview::sessions::SessionRegistry;
    use crate::llm_client::mock::{MockModelClient, PYTHON_GO_QUESTIONS};
    use crate::storage::CandidateStore;

    fn test_app() -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let config =
            Config::from_lookup(|key| (key == "GROQ_API_KEY").then(|| "test-key".to_string()))
                .unwrap();
        let store = Arc::new(CandidateStore::new(dir.path().join("data"), 90));
        let client = MockModelClient::replying(PYTHON_GO_QUESTIONS);
        let flow = FlowController::new(QuestionGenerator::new(client), store.clone());

        let state = AppState {
            config,
            flow: Arc::new(flow),
            sessions: SessionRegistry::default(),
            store,
        };
        (dir, build_router(state))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn start(app: &Router, consent: bool) -> String {
        let (status, body) = call(
            app,
            "POST",
            "/api/v1/sessions",
            Some(json!({ "consent_to_store": consent })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["step"], "basic_info");
        body["session_id"].as_str().unwrap().to_string()
    }

    async fn say(app: &Router, session_id: &str, message: &str) -> (StatusCode, Value) {
        call(
            app,
            "POST",
            &format!("/api/v1/sessions/{session_id}/messages"),
            Some(json!({ "message": message })),
        )
        .await
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = test_app();
        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["active_sessions"], 0);
    }

    #[tokio::test]
    async fn test_full_screening_stores_candidate() {
        let (_dir, app) = test_app();
        let session_id = start(&app, true).await;

        let inputs = [
            "Alice",
            "alice@x.com",
            "555-0100",
            "3",
            "Backend Engineer",
            "Berlin",
            "Python,Go",
        ];
        let mut last = Value::Null;
        for input in inputs {
            let (status, body) = say(&app, &session_id, input).await;
            assert_eq!(status, StatusCode::OK);
            last = body;
        }
        assert_eq!(last["step"], "technical_questions");
        assert!(last["reply"].as_str().unwrap().contains("What is a generator?"));

        for n in 0..6 {
            let (_, body) = say(&app, &session_id, &format!("answer {n}")).await;
            last = body;
        }
        assert_eq!(last["completed"], true);
        assert_eq!(last["progress"], 100);
        let record_id = last["record_id"].as_str().unwrap().to_string();

        // concluded sessions are dropped
        let (status, _) = call(&app, "GET", &format!("/api/v1/sessions/{session_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, record) =
            call(&app, "GET", &format!("/api/v1/candidates/{record_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["full_name"], "Alice");
        assert_eq!(record["tech_stack"], json!(["Python", "Go"]));
        assert_eq!(record["answers"].as_array().unwrap().len(), 6);

        let (_, list) = call(&app, "GET", "/api/v1/candidates", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_keeps_step() {
        let (_dir, app) = test_app();
        let session_id = start(&app, false).await;
        say(&app, &session_id, "Alice").await;

        let (status, body) = say(&app, &session_id, "not-an-email").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "basic_info");

        let (_, view) = call(&app, "GET", &format!("/api/v1/sessions/{session_id}"), None).await;
        assert_eq!(view["profile"]["full_name"], "Alice");
        assert!(view["profile"]["email"].is_null());
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let (_dir, app) = test_app();
        let session_id = start(&app, true).await;
        let (status, body) = say(&app, &session_id, "   ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let (_dir, app) = test_app();
        let missing = uuid::Uuid::new_v4();

        let (status, _) = say(&app, &missing.to_string(), "hello").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "GET", &format!("/api/v1/candidates/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_end_session_discards_it() {
        let (_dir, app) = test_app();
        let session_id = start(&app, true).await;
        let uri = format!("/api/v1/sessions/{session_id}");

        let (status, _) = call(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_start_with_malformed_body_is_rejected() {
        let (_dir, app) = test_app();

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/sessions",
            Some(json!({ "consent_to_store": "yes" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/sessions")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (_, health) = call(&app, "GET", "/health", None).await;
        assert_eq!(health["active_sessions"], 0);
    }

    #[tokio::test]
    async fn test_start_with_empty_object_defaults_to_no_consent() {
        let (_dir, app) = test_app();
        let (status, body) = call(&app, "POST", "/api/v1/sessions", Some(json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);

        let session_id = body["session_id"].as_str().unwrap();
        let (_, view) = call(&app, "GET", &format!("/api/v1/sessions/{session_id}"), None).await;
        assert_eq!(view["consent_to_store"], false);
    }

    #[tokio::test]
    async fn test_start_without_body_defaults_to_no_consent() {
        let (_dir, app) = test_app();
        let (status, body) = call(&app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);

        let session_id = body["session_id"].as_str().unwrap();
        let (_, view) = call(&app, "GET", &format!("/api/v1/sessions/{session_id}"), None).await;
        assert_eq!(view["consent_to_store"], false);
    }
}
