use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::info;
use tts_core::{NarrationPipeline, ScriptProvider, Timeline};

use crate::error::ApiError;
use crate::validation::validate_narration_request;

/// Boxed provider so tests can swap in a stub script source
pub type Pipeline = NarrationPipeline<Box<dyn ScriptProvider>>;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

#[derive(Deserialize)]
pub struct NarrationRequest {
    text: String,
    #[serde(rename = "chapterTitle", default)]
    chapter_title: Option<String>,
}

#[derive(Serialize)]
pub struct NarrationResponse {
    /// Base64-encoded audio bytes
    audio: String,
    script: String,
    metadata: Timeline,
    success: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/audio-tutor", post(narrate_endpoint))
        .with_state(state)
}

pub async fn health_check() -> &'static str {
    "ok"
}

async fn narrate_endpoint(
    State(state): State<AppState>,
    Json(req): Json<NarrationRequest>,
) -> Result<Json<NarrationResponse>, ApiError> {
    validate_narration_request(&req.text, req.chapter_title.as_deref())?;

    let chapter_title = req.chapter_title.unwrap_or_default();
    let result = state.pipeline.narrate(&req.text, &chapter_title).await?;
    info!(
        audio_bytes = result.audio.len(),
        words = result.timeline.len(),
        "narration ready"
    );

    Ok(Json(NarrationResponse {
        audio: base64::engine::general_purpose::STANDARD.encode(&result.audio),
        script: result.script,
        metadata: result.timeline,
        success: true,
    }))
}
