//! Integration tests for the narration server routes

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

use server::routes::{build_router, AppState};
use tts_core::fallback::FallbackConfig;
use tts_core::session::SessionConfig;
use tts_core::{NarrationPipeline, ScriptProvider};

struct FixedScript(&'static str);

#[async_trait]
impl ScriptProvider for FixedScript {
    async fn generate_script(&self, _text: &str, _chapter_title: &str) -> anyhow::Result<String> {
        Ok(self.0.to_string())
    }
}

/// Mock streaming service that plays one full successful turn
async fn spawn_streaming_service() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let _ = ws.next().await; // speech.config
        let _ = ws.next().await; // ssml

        let header = "Path:audio\r\n";
        let mut frame = Vec::new();
        frame.extend_from_slice(&(header.len() as u16).to_be_bytes());
        frame.extend_from_slice(header.as_bytes());
        frame.extend_from_slice(&[0x00, 0xFF, 0xF3, 0x42]);
        ws.send(Message::Binary(frame)).await.unwrap();

        let metadata = "Path:audio.metadata\r\n\r\n{\"Metadata\":[{\"Offset\":0,\"Duration\":3000000,\"text\":{\"Text\":\"সালাম\"}}]}";
        ws.send(Message::Text(metadata.to_string())).await.unwrap();
        ws.send(Message::Text("Path:turn.end\r\n\r\n{}".to_string()))
            .await
            .unwrap();
    });
    format!("ws://{addr}")
}

/// Mock streaming service that closes without audio (forces the fallback)
async fn spawn_empty_streaming_service() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let _ = ws.next().await;
        let _ = ws.next().await;
        ws.close(None).await.unwrap();
    });
    format!("ws://{addr}")
}

async fn spawn_broken_fallback() -> String {
    async fn handler() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
    let app = Router::new().route("/tts", axum::routing::get(handler));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/tts")
}

fn create_test_app(primary_endpoint: String, fallback_endpoint: String) -> Router {
    let provider: Box<dyn ScriptProvider> = Box::new(FixedScript("সালাম বন্ধুরা"));
    let pipeline = NarrationPipeline::new(
        provider,
        SessionConfig {
            endpoint: primary_endpoint,
            timeout: Duration::from_secs(5),
            ..SessionConfig::default()
        },
        FallbackConfig {
            endpoint: fallback_endpoint,
            ..FallbackConfig::default()
        },
    );
    build_router(AppState {
        pipeline: Arc::new(pipeline),
    })
}

fn unused_endpoints() -> (String, String) {
    // Validation failures never reach the pipeline
    ("ws://127.0.0.1:1".to_string(), "http://127.0.0.1:1".to_string())
}

#[tokio::test]
async fn test_health_check() {
    let (primary, fallback) = unused_endpoints();
    let app = create_test_app(primary, fallback);
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_audio_tutor_success() {
    let primary = spawn_streaming_service().await;
    let (_, fallback) = unused_endpoints();
    let app = create_test_app(primary, fallback);
    let request_body = json!({
        "text": "নিউটনের গতিসূত্র নিয়ে আলোচনা",
        "chapterTitle": "পদার্থবিজ্ঞান"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/audio-tutor")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&request_body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let narration: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(narration["success"], true);
    assert_eq!(narration["script"], "সালাম বন্ধুরা");
    assert!(narration["audio"].is_string());
    assert!(!narration["audio"].as_str().unwrap().is_empty());
    let metadata = narration["metadata"].as_array().unwrap();
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata[0]["text"], "সালাম");
    assert_eq!(metadata[0]["offsetTicks"], 0);
}

#[tokio::test]
async fn test_audio_tutor_validation_empty_text() {
    let (primary, fallback) = unused_endpoints();
    let app = create_test_app(primary, fallback);
    let request_body = json!({ "text": "" });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/audio-tutor")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&request_body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["errorKind"], "invalid_input");
    assert!(error["message"].is_string());
}

#[tokio::test]
async fn test_audio_tutor_validation_long_text() {
    let (primary, fallback) = unused_endpoints();
    let app = create_test_app(primary, fallback);
    let request_body = json!({ "text": "a".repeat(30_000) });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/audio-tutor")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&request_body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_audio_tutor_double_failure_is_structured_error() {
    let primary = spawn_empty_streaming_service().await;
    let fallback = spawn_broken_fallback().await;
    let app = create_test_app(primary, fallback);
    let request_body = json!({ "text": "কিছু লেখা" });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/audio-tutor")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&request_body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["errorKind"], "fallback_exhausted");
}

#[tokio::test]
async fn test_not_found_endpoint() {
    let (primary, fallback) = unused_endpoints();
    let app = create_test_app(primary, fallback);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
