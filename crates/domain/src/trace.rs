use serde::Serialize;

/// Structured trace events emitted across all learnquery crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SnapshotRegenerated {
        generation: u64,
        bytes: usize,
        tables: usize,
        total_rows: usize,
        duration_ms: u64,
    },
    SnapshotRegenerationFailed {
        error: String,
    },
    EndpointProbed {
        endpoint: String,
        alive: bool,
        duration_ms: u64,
    },
    EndpointResolved {
        endpoint: String,
        cache_hit: bool,
    },
    DiscoveryInvalidated {
        previous: Option<String>,
    },
    PromptBudgeted {
        level: String,
        snapshot_chars: usize,
        injected_data_chars: usize,
        total_chars: usize,
        query_truncated: bool,
    },
    InferenceRequest {
        endpoint: String,
        model: String,
        attempt: u32,
        outcome: String,
        duration_ms: u64,
    },
    InferenceTier {
        request_id: String,
        tier: String,
        intent: String,
        endpoint: Option<String>,
        model: Option<String>,
    },
    StubInitialized {
        ready: bool,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "lq_event");
    }
}
