//! HTTP front end for the diary.
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | `POST` | `/save_diary` | `{"entry": ".."}` | `{"status","message","indexed"}` |
//! | `POST` | `/analyze_diary` | `{"query": ".."}` | `{"answer": ".."}` |
//! | `POST` | `/prompt_query` | `{"prompt": ".."}` | `{"response": ".."}` |
//! | `GET`  | `/health` | | `{"status","version","knowledgeBase"}` |
//!
//! Errors are `{"status": "error", "message": ".."}`. All origins, methods,
//! and headers are permitted.

mod error;
mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use lifecapsule_core::{AppError, AppResult};
use lifecapsule_diary::DiaryService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Build the router over a shared diary service.
pub fn create_router(service: Arc<DiaryService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/save_diary", post(handlers::save_diary))
        .route("/analyze_diary", post(handlers::analyze_diary))
        .route("/prompt_query", post(handlers::prompt_query))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}

/// Serve until Ctrl-C.
pub async fn run_server(service: Arc<DiaryService>, bind: &str) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", bind, e)))?;

    tracing::info!("Diary server listening on http://{}", bind);

    axum::serve(listener, create_router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Diary server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use lifecapsule_diary::{DiaryStore, LexiconScorer, PromptForwarder};
    use lifecapsule_knowledge::embeddings::providers::trigram::TrigramProvider;
    use lifecapsule_knowledge::{KnowledgeBuilder, RetrievalAnswerer, Segmenter};
    use lifecapsule_llm::{LlmClient, LlmRequest, LlmResponse};
    use lifecapsule_prompt::defaults::builtin_source;
    use lifecapsule_prompt::{parse_prompt, QUERY_PROMPT_ID, RETRIEVAL_PROMPT_ID};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    /// Echoes the rendered prompt, or fails every call when `down`.
    struct StubLlm {
        down: bool,
    }

    #[async_trait]
    impl LlmClient for StubLlm {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            if self.down {
                return Err(AppError::Llm("connection refused".to_string()));
            }
            Ok(LlmResponse::text(request.prompt.clone(), request.model.clone()))
        }
    }

    fn service_at(diary: std::path::PathBuf, llm_down: bool) -> Arc<DiaryService> {
        let llm: Arc<dyn LlmClient> = Arc::new(StubLlm { down: llm_down });
        let retrieval = parse_prompt(builtin_source(RETRIEVAL_PROMPT_ID).unwrap()).unwrap();
        let query = parse_prompt(builtin_source(QUERY_PROMPT_ID).unwrap()).unwrap();

        let builder = KnowledgeBuilder::new(
            Segmenter::new(1000, 200).unwrap(),
            Arc::new(TrigramProvider::new(128)),
            RetrievalAnswerer::new(Arc::clone(&llm), "llama3.2", retrieval, 4),
        );

        Arc::new(DiaryService::new(
            DiaryStore::new(diary),
            builder,
            Arc::new(LexiconScorer::new()),
            PromptForwarder::new(llm, "llama3.2", query),
        ))
    }

    fn test_app(temp: &TempDir) -> (Router, Arc<DiaryService>) {
        let service = service_at(temp.path().join("diary.txt"), false);
        (create_router(Arc::clone(&service)), service)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        post_raw(uri, body.to_string())
    }

    fn post_raw(uri: &str, body: impl Into<String>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.into()))
            .expect("request")
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_save_then_ask_about_happy_days() {
        let temp = TempDir::new().unwrap();
        let (app, _) = test_app(&temp);

        let (status, body) = send(
            &app,
            post_json("/save_diary", json!({"entry": "I had a wonderful day at the park!"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Your diary entry has been saved.");
        assert_eq!(body["indexed"], true);

        let (status, body) = send(
            &app,
            post_json("/analyze_diary", json!({"query": "Was I happy recently?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let answer = body["answer"].as_str().unwrap();
        assert!(answer.starts_with("You seemed happy or joyful on the following days:"));
        assert!(answer.contains("I had a wonderful day at the park!"));
    }

    #[tokio::test]
    async fn test_blank_entry_is_rejected_and_file_untouched() {
        let temp = TempDir::new().unwrap();
        let (app, service) = test_app(&temp);

        for body in [json!({"entry": "   "}), json!({}), json!({"entry": null})] {
            let (status, body) = send(&app, post_json("/save_diary", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"status": "error", "message": "No entry provided."}));
        }

        assert!(!service.store().path().exists());

        std::fs::write(service.store().path(), "June 01, 2024:\nfirst\n\n").unwrap();
        let (status, _) = send(&app, post_json("/save_diary", json!({"entry": "\n\t"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            std::fs::read_to_string(service.store().path()).unwrap(),
            "June 01, 2024:\nfirst\n\n"
        );
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_bad_requests() {
        let temp = TempDir::new().unwrap();
        let (app, _) = test_app(&temp);

        let (status, body) = send(&app, post_raw("/analyze_diary", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No query provided.");

        let (status, body) = send(&app, post_json("/prompt_query", json!({"prompt": 42}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No prompt provided.");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/save_diary")
            .body(Body::empty())
            .expect("request");
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No entry provided.");
    }

    #[tokio::test]
    async fn test_analyze_before_any_entry() {
        let temp = TempDir::new().unwrap();
        let (app, _) = test_app(&temp);

        let (status, body) = send(
            &app,
            post_json("/analyze_diary", json!({"query": "What happened on Monday?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["answer"],
            "The knowledge base is empty. Please add diary entries first."
        );
    }

    #[tokio::test]
    async fn test_generic_question_reads_new_entry() {
        let temp = TempDir::new().unwrap();
        let (app, _) = test_app(&temp);

        send(
            &app,
            post_json("/save_diary", json!({"entry": "Adopted a kitten named Pebble."})),
        )
        .await;

        let (_, body) = send(
            &app,
            post_json("/analyze_diary", json!({"query": "  What is my kitten called?  "})),
        )
        .await;
        let answer = body["answer"].as_str().unwrap();
        assert!(answer.contains("Pebble"));
        assert!(answer.contains("Question: What is my kitten called?\n"));
    }

    #[tokio::test]
    async fn test_prompt_query_forwards_and_swallows_model_errors() {
        let temp = TempDir::new().unwrap();
        let (app, _) = test_app(&temp);

        let (status, body) =
            send(&app, post_json("/prompt_query", json!({"prompt": "Say hi"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"response": "Say hi"}));

        let down = create_router(service_at(temp.path().join("other.txt"), true));
        let (status, body) =
            send(&down, post_json("/prompt_query", json!({"prompt": "Say hi"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["response"],
            "I encountered an error while processing your request. Please try again."
        );
    }

    #[tokio::test]
    async fn test_save_failure_is_internal_error() {
        let temp = TempDir::new().unwrap();
        // The diary path is a directory, so appending fails
        let app = create_router(service_at(temp.path().to_path_buf(), false));

        let (status, body) = send(&app, post_json("/save_diary", json!({"entry": "hello"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"status": "error", "message": "Failed to save diary entry."}));
    }

    #[tokio::test]
    async fn test_health_reports_knowledge_base() {
        let temp = TempDir::new().unwrap();
        let (app, _) = test_app(&temp);

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request");
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["knowledgeBase"], Value::Null);

        send(&app, post_json("/save_diary", json!({"entry": "Quiet evening."}))).await;

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request");
        let (_, body) = send(&app, request).await;
        assert_eq!(body["knowledgeBase"]["chunks"], 1);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let temp = TempDir::new().unwrap();
        let (app, _) = test_app(&temp);

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/save_diary")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
