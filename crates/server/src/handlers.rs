//! Route handlers.
//!
//! A missing field, a blank field, and an unparsable body all get the same
//! 400 response.

use crate::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use lifecapsule_diary::DiaryService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type ServiceState = State<Arc<DiaryService>>;

#[derive(Debug, Deserialize)]
pub struct SaveDiaryRequest {
    #[serde(default)]
    entry: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveDiaryResponse {
    status: &'static str,
    message: &'static str,
    indexed: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeDiaryRequest {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeDiaryResponse {
    answer: String,
}

#[derive(Debug, Deserialize)]
pub struct PromptQueryRequest {
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PromptQueryResponse {
    response: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    #[serde(rename = "knowledgeBase")]
    knowledge_base: Option<KnowledgeBaseHealth>,
}

#[derive(Debug, Serialize)]
pub struct KnowledgeBaseHealth {
    chunks: usize,
}

/// Pull a trimmed, non-empty field out of a JSON body.
fn required<T>(
    payload: Result<Json<T>, JsonRejection>,
    field: impl FnOnce(T) -> Option<String>,
    missing: &str,
) -> Result<String, ApiError> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            return Err(ApiError::bad_request(missing));
        }
    };

    field(body)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request(missing))
}

pub async fn save_diary(
    State(service): ServiceState,
    payload: Result<Json<SaveDiaryRequest>, JsonRejection>,
) -> Result<Json<SaveDiaryResponse>, ApiError> {
    let entry = required(payload, |b| b.entry, "No entry provided.")?;

    let outcome = service.save_entry(&entry).await.map_err(|e| {
        tracing::error!("Failed to save diary entry: {}", e);
        ApiError::internal("Failed to save diary entry.")
    })?;

    Ok(Json(SaveDiaryResponse {
        status: "success",
        message: "Your diary entry has been saved.",
        indexed: outcome.indexed,
    }))
}

pub async fn analyze_diary(
    State(service): ServiceState,
    payload: Result<Json<AnalyzeDiaryRequest>, JsonRejection>,
) -> Result<Json<AnalyzeDiaryResponse>, ApiError> {
    let query = required(payload, |b| b.query, "No query provided.")?;
    let answer = service.analyze(&query).await;
    Ok(Json(AnalyzeDiaryResponse { answer }))
}

pub async fn prompt_query(
    State(service): ServiceState,
    payload: Result<Json<PromptQueryRequest>, JsonRejection>,
) -> Result<Json<PromptQueryResponse>, ApiError> {
    let prompt = required(payload, |b| b.prompt, "No prompt provided.")?;
    let response = service.prompt(&prompt).await;
    Ok(Json(PromptQueryResponse { response }))
}

pub async fn health(State(service): ServiceState) -> Json<HealthResponse> {
    let knowledge_base = service
        .knowledge()
        .stats()
        .await
        .map(|stats| KnowledgeBaseHealth {
            chunks: stats.chunks_count,
        });

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        knowledge_base,
    })
}
