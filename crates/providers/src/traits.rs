use std::time::Duration;

use lq_domain::config::GenerationOptions;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / outcome types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One non-streaming generation call against a specific endpoint.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Base URL of the backend, e.g. `http://127.0.0.1:11434`.
    pub base_url: String,
    pub model: String,
    pub prompt: String,
    pub options: GenerationOptions,
    /// Whole-request deadline, connection included.
    pub timeout: Duration,
}

/// Structured result of a generation call.
///
/// Transports never return `Err`: every failure mode is one of these
/// variants so callers branch on the shape of the outcome instead of
/// inspecting message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Non-empty model output.
    Ok(String),
    /// The server answered successfully but produced no text.
    Empty,
    /// HTTP 404: the server is up but does not have the model.
    ModelMissing { model: String },
    /// Non-success status, or a success body that carries an error.
    ServerError { status: u16, body: String },
    /// Connection refused, DNS failure, timeout, unreadable body.
    Transport(String),
}

impl GenerateOutcome {
    /// Whether the outcome proves that something is listening and speaking
    /// the backend protocol.
    pub fn server_alive(&self) -> bool {
        matches!(
            self,
            GenerateOutcome::Ok(_) | GenerateOutcome::Empty | GenerateOutcome::ModelMissing { .. }
        )
    }

    /// Usable answer text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            GenerateOutcome::Ok(text) => Some(text),
            _ => None,
        }
    }

    /// Short label for logs and trace events.
    pub fn label(&self) -> &'static str {
        match self {
            GenerateOutcome::Ok(_) => "ok",
            GenerateOutcome::Empty => "empty",
            GenerateOutcome::ModelMissing { .. } => "model_missing",
            GenerateOutcome::ServerError { .. } => "server_error",
            GenerateOutcome::Transport(_) => "transport",
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core backend trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Wire adapter for an inference server.
///
/// Discovery probes and the tiered client both go through this seam, so
/// tests can substitute an in-memory backend.
#[async_trait::async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Send one generation request and classify the result.
    async fn generate(&self, req: &GenerateRequest) -> GenerateOutcome;

    /// A short identifier for logs.
    fn backend_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_missing_counts_as_alive() {
        assert!(GenerateOutcome::ModelMissing { model: "x".into() }.server_alive());
        assert!(GenerateOutcome::Empty.server_alive());
        assert!(!GenerateOutcome::Transport("refused".into()).server_alive());
        assert!(!GenerateOutcome::ServerError {
            status: 500,
            body: String::new()
        }
        .server_alive());
    }

    #[test]
    fn only_ok_has_text() {
        assert_eq!(GenerateOutcome::Ok("hi".into()).text(), Some("hi"));
        assert_eq!(GenerateOutcome::Empty.text(), None);
    }
}
