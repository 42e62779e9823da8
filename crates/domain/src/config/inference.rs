use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Inference backend / tiered client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "d_primary_model")]
    pub primary_model: String,
    /// Tried one attempt each when the server is reachable but the primary
    /// model keeps failing.
    #[serde(default = "d_alternate_models")]
    pub alternate_models: Vec<String>,
    /// Per-request timeout for real inference calls. Large contexts are slow.
    #[serde(default = "d_60000")]
    pub request_timeout_ms: u64,
    #[serde(default = "d_5000")]
    pub connect_timeout_ms: u64,
    #[serde(default = "d_3")]
    pub max_attempts: u32,
    #[serde(default = "d_500")]
    pub retry_delay_ms: u64,
    /// Clear the endpoint cache after the primary tier fails on transport,
    /// so the next query rediscovers.
    #[serde(default = "d_true")]
    pub invalidate_on_failure: bool,
    #[serde(default)]
    pub options: GenerationOptions,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            primary_model: d_primary_model(),
            alternate_models: d_alternate_models(),
            request_timeout_ms: 60_000,
            connect_timeout_ms: 5_000,
            max_attempts: 3,
            retry_delay_ms: 500,
            invalidate_on_failure: true,
            options: GenerationOptions::default(),
        }
    }
}

/// Sampling options forwarded verbatim in the request's `options` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    #[serde(default = "d_top_p")]
    pub top_p: f32,
    #[serde(default = "d_512")]
    pub num_predict: u32,
    #[serde(default)]
    pub num_ctx: Option<u32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.9,
            num_predict: 512,
            num_ctx: None,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_primary_model() -> String {
    "llama3.2".into()
}
fn d_alternate_models() -> Vec<String> {
    vec!["llama3.2:1b".into(), "phi3:mini".into(), "tinyllama".into()]
}
fn d_60000() -> u64 {
    60_000
}
fn d_5000() -> u64 {
    5_000
}
fn d_3() -> u32 {
    3
}
fn d_500() -> u64 {
    500
}
fn d_true() -> bool {
    true
}
fn d_temperature() -> f32 {
    0.3
}
fn d_top_p() -> f32 {
    0.9
}
fn d_512() -> u32 {
    512
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_defaults() {
        let cfg = InferenceConfig::default();
        assert_eq!(cfg.max_attempts, 3);
        assert!(cfg.request_timeout_ms >= 10_000);
        assert!(!cfg.alternate_models.is_empty());
        assert!(cfg.options.num_ctx.is_none());
    }

    #[test]
    fn options_deserialize_partially() {
        let json = r#"{ "primary_model": "qwen2.5", "options": { "num_ctx": 8192 } }"#;
        let cfg: InferenceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.primary_model, "qwen2.5");
        assert_eq!(cfg.options.num_ctx, Some(8192));
        assert_eq!(cfg.options.num_predict, 512);
        assert!((cfg.options.temperature - 0.3).abs() < f32::EPSILON);
    }
}
