pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::tasks::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/generate-interview-questions",
            post(handlers::handle_generate_questions),
        )
        .route(
            "/api/generate-insights",
            post(handlers::handle_generate_insights),
        )
        .route(
            "/api/analyze-communication",
            post(handlers::handle_analyze_communication),
        )
        .route(
            "/api/generate-analytics",
            post(handlers::handle_generate_analytics),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::LlmError;
    use crate::store::testing::{interview, response, MemoryStore};

    fn app(store: Arc<MemoryStore>, model: Arc<ScriptedModel>, app_env: &str) -> Router {
        build_router(AppState {
            store,
            model,
            config: Config::for_tests(app_env),
        })
    }

    fn seeded_store() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::default()
                .with_interview(interview("iv-1", &["Tell me about a hard bug.", "Why this role?"]))
                .with_response(response("call-1", "iv-1", "Candidate: the bug was a race.", "Good")),
        )
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(seeded_store(), Arc::new(ScriptedModel::default()), "production");
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_communication_wraps_result_under_analysis() {
        let model = Arc::new(ScriptedModel::replying(r#"{"score": 9, "feedback": "Crisp."}"#));
        let (status, body) = post_json(
            app(seeded_store(), model, "production"),
            "/api/analyze-communication",
            json!({"transcript": "Candidate: hello there"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"]["score"], 9);
        assert_eq!(body["analysis"]["feedback"], "Crisp.");
    }

    #[tokio::test]
    async fn test_missing_transcript_is_bad_request() {
        let model = Arc::new(ScriptedModel::default());
        let (status, body) = post_json(
            app(seeded_store(), model.clone(), "production"),
            "/api/analyze-communication",
            json!({}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Transcript is required");
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_question_failure_hides_details_in_production() {
        let model = Arc::new(ScriptedModel::failing(LlmError::Api {
            status: 500,
            message: "backend exploded".to_string(),
        }));
        let (status, body) = post_json(
            app(seeded_store(), model, "production"),
            "/api/generate-interview-questions",
            json!({"name": "Screen", "objective": "Hire", "number": 2}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Failed to generate interview questions");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_question_failure_shows_details_in_development() {
        let model = Arc::new(ScriptedModel::failing(LlmError::Api {
            status: 500,
            message: "backend exploded".to_string(),
        }));
        let (status, body) = post_json(
            app(seeded_store(), model, "development"),
            "/api/generate-interview-questions",
            json!({"name": "Screen", "objective": "Hire", "number": 2}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]["details"]
            .as_str()
            .unwrap()
            .contains("backend exploded"));
    }

    #[tokio::test]
    async fn test_insights_are_returned_and_stored() {
        let store = seeded_store();
        let model = Arc::new(ScriptedModel::replying(r#"{"insights": ["Pool is strong"]}"#));
        let (status, body) = post_json(
            app(store.clone(), model, "production"),
            "/api/generate-insights",
            json!({"interviewId": "iv-1"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["insights"], json!(["Pool is strong"]));
        assert_eq!(store.stored_insights("iv-1"), Some(vec![json!("Pool is strong")]));
    }

    #[tokio::test]
    async fn test_insights_for_unknown_interview_is_internal_error() {
        let model = Arc::new(ScriptedModel::default());
        let (status, body) = post_json(
            app(seeded_store(), model.clone(), "production"),
            "/api/generate-insights",
            json!({"interviewId": "nope"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "internal server error");
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_analytics_are_stored_then_served_from_store() {
        let store = seeded_store();
        let model = Arc::new(ScriptedModel::replying(
            r#"{"overallScore": 72, "communication": {"score": 6, "feedback": "Clear"}}"#,
        ));
        let request = json!({"callId": "call-1", "interviewId": "iv-1"});

        let (status, first) = post_json(
            app(store.clone(), model.clone(), "production"),
            "/api/generate-analytics",
            request.clone(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["analytics"]["overallScore"].as_f64(), Some(72.0));
        assert!(store.stored_analytics("call-1").is_some());

        let (status, second) = post_json(
            app(store.clone(), model.clone(), "production"),
            "/api/generate-analytics",
            request,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["analytics"], second["analytics"]);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_analytics_failure_returns_500_with_zero_score() {
        let store = seeded_store();
        let model = Arc::new(ScriptedModel::failing(LlmError::EmptyContent));
        let (status, body) = post_json(
            app(store.clone(), model, "production"),
            "/api/generate-analytics",
            json!({"callId": "call-1", "interviewId": "iv-1"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["analytics"]["overallScore"].as_f64(), Some(0.0));
        assert_eq!(body["error"], "internal server error");
        assert!(store.stored_analytics("call-1").is_none());
    }

    #[tokio::test]
    async fn test_mistyped_bodies_are_bad_requests() {
        let cases = [
            ("/api/analyze-communication", json!({"transcript": 123})),
            (
                "/api/generate-interview-questions",
                json!({"name": "Screen", "objective": "Hire", "number": "5"}),
            ),
            ("/api/generate-insights", json!({"interviewId": 7})),
            ("/api/generate-analytics", json!({"callId": 5, "interviewId": "iv-1"})),
        ];

        for (uri, body) in cases {
            let model = Arc::new(ScriptedModel::default());
            let (status, response) =
                post_json(app(seeded_store(), model.clone(), "production"), uri, body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(response["error"]["code"], "VALIDATION_ERROR", "{uri}");
            assert!(response["error"]["message"].is_string(), "{uri}");
            assert_eq!(model.calls(), 0, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_analytics_requires_call_id() {
        let (status, _) = post_json(
            app(seeded_store(), Arc::new(ScriptedModel::default()), "production"),
            "/api/generate-analytics",
            json!({"interviewId": "iv-1"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
