//! The HTTP transport against an in-process fake backend bound to an
//! ephemeral port.

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use lq_domain::config::GenerationOptions;
use lq_providers::{GenerateOutcome, GenerateRequest, InferenceBackend, OllamaBackend};

async fn fake_generate(Json(body): Json<Value>) -> (StatusCode, String) {
    let model = body["model"].as_str().unwrap_or_default().to_string();
    match model.as_str() {
        "missing" => (
            StatusCode::NOT_FOUND,
            json!({"error": "model 'missing' not found, try pulling it first"}).to_string(),
        ),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
        "errtext" => (
            StatusCode::OK,
            json!({"response": "Error: context window exceeded"}).to_string(),
        ),
        "silent" => (StatusCode::OK, json!({"response": "", "done": true}).to_string()),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            (StatusCode::OK, json!({"response": "late"}).to_string())
        }
        _ => {
            let echo = format!(
                "stream={} num_predict={} prompt={}",
                body["stream"], body["options"]["num_predict"], body["prompt"]
            );
            (StatusCode::OK, json!({"response": echo, "done": true}).to_string())
        }
    }
}

async fn spawn_backend() -> String {
    let app = Router::new().route("/api/generate", post(fake_generate));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn request(base_url: &str, model: &str) -> GenerateRequest {
    GenerateRequest {
        base_url: base_url.to_string(),
        model: model.to_string(),
        prompt: "=== QUESTION ===\nhola".into(),
        options: GenerationOptions::default(),
        timeout: Duration::from_millis(500),
    }
}

fn backend() -> OllamaBackend {
    OllamaBackend::new(Duration::from_millis(500)).unwrap()
}

#[tokio::test]
async fn success_body_is_returned_as_text() {
    let base = spawn_backend().await;
    let out = backend().generate(&request(&base, "llama3.2")).await;
    match out {
        GenerateOutcome::Ok(text) => {
            assert!(text.contains("stream=false"));
            assert!(text.contains("num_predict=512"));
            assert!(text.contains("hola"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn not_found_means_model_missing() {
    let base = spawn_backend().await;
    let out = backend().generate(&request(&base, "missing")).await;
    assert_eq!(
        out,
        GenerateOutcome::ModelMissing {
            model: "missing".into()
        }
    );
    assert!(out.server_alive());
}

#[tokio::test]
async fn server_failures_are_classified() {
    let base = spawn_backend().await;
    let b = backend();

    assert_eq!(
        b.generate(&request(&base, "broken")).await,
        GenerateOutcome::ServerError {
            status: 500,
            body: "boom".into()
        }
    );
    assert!(matches!(
        b.generate(&request(&base, "errtext")).await,
        GenerateOutcome::ServerError { status: 200, .. }
    ));
    assert_eq!(b.generate(&request(&base, "silent")).await, GenerateOutcome::Empty);
}

#[tokio::test]
async fn slow_backend_times_out_as_transport() {
    let base = spawn_backend().await;
    let out = backend().generate(&request(&base, "slow")).await;
    match out {
        GenerateOutcome::Transport(msg) => assert!(msg.starts_with("timeout"), "got {msg}"),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn closed_port_is_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let out = backend()
        .generate(&request(&format!("http://{addr}"), "llama3.2"))
        .await;
    assert!(matches!(out, GenerateOutcome::Transport(_)));
    assert!(!out.server_alive());
}
