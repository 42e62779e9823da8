//! Ollama-style `/api/generate` adapter.
//!
//! Non-streaming only. Every response is classified into a
//! [`GenerateOutcome`]; nothing here returns an error to the caller.

use std::time::Duration;

use serde_json::Value;

use lq_domain::config::{GenerationOptions, InferenceConfig};
use lq_domain::error::Result;

use crate::traits::{GenerateOutcome, GenerateRequest, InferenceBackend};
use crate::util::from_reqwest;

/// Prefix a backend puts on text that is really an error report.
const ERROR_MARKER: &str = "Error:";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// HTTP transport for servers speaking the Ollama generate protocol.
///
/// The base URL travels with each request because discovery decides it per
/// call. One pooled client is shared by probes and inference.
pub struct OllamaBackend {
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(from_reqwest)?;
        Ok(Self { client })
    }

    pub fn from_config(cfg: &InferenceConfig) -> Result<Self> {
        Self::new(Duration::from_millis(cfg.connect_timeout_ms))
    }
}

// ── Wire format ───────────────────────────────────────────────────

fn build_body(model: &str, prompt: &str, options: &GenerationOptions) -> Value {
    let mut opts = serde_json::json!({
        "temperature": options.temperature,
        "top_p": options.top_p,
        "num_predict": options.num_predict,
    });
    if let Some(num_ctx) = options.num_ctx {
        opts["num_ctx"] = Value::from(num_ctx);
    }

    serde_json::json!({
        "model": model,
        "prompt": prompt,
        "stream": false,
        "options": opts,
    })
}

/// Classify a 2xx body.
///
/// Text comes from `response`, or from `message.content` for chat-shaped
/// replies. An `error` field or an [`ERROR_MARKER`] prefix means the server
/// reported a failure inside a success status.
fn parse_success_body(status: u16, body: &str) -> GenerateOutcome {
    let json: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            return GenerateOutcome::ServerError {
                status,
                body: format!("malformed response body: {e}"),
            }
        }
    };

    if let Some(err) = json.get("error").and_then(|v| v.as_str()) {
        return GenerateOutcome::ServerError {
            status,
            body: err.to_string(),
        };
    }

    let text = json
        .get("response")
        .and_then(|v| v.as_str())
        .or_else(|| {
            json.get("message")
                .and_then(|m| m.get("content"))
                .and_then(|v| v.as_str())
        })
        .unwrap_or("")
        .trim();

    if text.is_empty() {
        GenerateOutcome::Empty
    } else if text.starts_with(ERROR_MARKER) {
        GenerateOutcome::ServerError {
            status,
            body: text.to_string(),
        }
    } else {
        GenerateOutcome::Ok(text.to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl InferenceBackend for OllamaBackend {
    async fn generate(&self, req: &GenerateRequest) -> GenerateOutcome {
        let url = format!("{}/api/generate", req.base_url.trim_end_matches('/'));
        let body = build_body(&req.model, &req.prompt, &req.options);

        tracing::debug!(url = %url, model = %req.model, prompt_chars = req.prompt.len(), "generate request");

        let resp = match self
            .client
            .post(&url)
            .timeout(req.timeout)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return GenerateOutcome::Transport(from_reqwest(e).to_string()),
        };

        let status = resp.status();
        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => return GenerateOutcome::Transport(from_reqwest(e).to_string()),
        };

        if status == reqwest::StatusCode::NOT_FOUND {
            return GenerateOutcome::ModelMissing {
                model: req.model.clone(),
            };
        }
        if !status.is_success() {
            return GenerateOutcome::ServerError {
                status: status.as_u16(),
                body: text,
            };
        }

        parse_success_body(status.as_u16(), &text)
    }

    fn backend_id(&self) -> &str {
        "ollama"
    }
}
