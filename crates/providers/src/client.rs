//! Tiered inference client.
//!
//! Walks a fixed fallback ladder and always produces a non-empty answer:
//!
//! 1. primary model on the resolved endpoint (with retries), then on every
//!    other candidate endpoint
//! 2. "model missing" notice when the server lacks the primary model
//! 3. alternate models on a reachable endpoint, with reduced context
//! 4. the local stub responder
//! 5. the deterministic canned responder

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use lq_contextpack::PromptBudgeter;
use lq_domain::config::{BudgetConfig, InferenceConfig};
use lq_domain::intent::QueryIntent;
use lq_domain::trace::TraceEvent;
use lq_snapshot::SnapshotStore;

use crate::canned::CannedResponder;
use crate::discovery::EndpointDiscovery;
use crate::stub::LocalStubResponder;
use crate::traits::{GenerateOutcome, GenerateRequest, InferenceBackend};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Answer types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Ladder stage that produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Status report, no model involved.
    Status,
    Primary,
    AlternateEndpoint,
    ModelMissing,
    AlternateModel,
    LocalStub,
    Deterministic,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Status => "status",
            Tier::Primary => "primary",
            Tier::AlternateEndpoint => "alternate_endpoint",
            Tier::ModelMissing => "model_missing",
            Tier::AlternateModel => "alternate_model",
            Tier::LocalStub => "local_stub",
            Tier::Deterministic => "deterministic",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub tier: Tier,
    pub intent: QueryIntent,
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

/// How the primary model fared on one endpoint.
enum PrimaryResult {
    Answered(String),
    ModelMissing,
    /// Server reachable but gave only errors or empty bodies.
    Unusable,
    Unreachable,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct TieredInferenceClient {
    cfg: InferenceConfig,
    budgeter: PromptBudgeter,
    /// Forces the summary level; used for alternate models.
    reduced_budgeter: PromptBudgeter,
    snapshots: Arc<SnapshotStore>,
    discovery: Arc<EndpointDiscovery>,
    backend: Arc<dyn InferenceBackend>,
    stub: Arc<LocalStubResponder>,
}

impl TieredInferenceClient {
    pub fn new(
        cfg: InferenceConfig,
        budget: &BudgetConfig,
        snapshots: Arc<SnapshotStore>,
        discovery: Arc<EndpointDiscovery>,
        backend: Arc<dyn InferenceBackend>,
        stub: Arc<LocalStubResponder>,
    ) -> Self {
        Self {
            cfg,
            budgeter: PromptBudgeter::from_config(budget),
            reduced_budgeter: PromptBudgeter {
                soft_max_chars: 0,
                ..PromptBudgeter::from_config(budget)
            },
            snapshots,
            discovery,
            backend,
            stub,
        }
    }

    pub fn discovery(&self) -> &Arc<EndpointDiscovery> {
        &self.discovery
    }

    // ── Public API ────────────────────────────────────────────────

    /// Answer `query`. Never fails and never returns an empty string.
    pub async fn answer(&self, query: &str) -> String {
        self.answer_detailed(query).await.text
    }

    /// Like [`answer`](Self::answer), also reporting which tier answered.
    pub async fn answer_detailed(&self, query: &str) -> Answer {
        let request_id = uuid::Uuid::new_v4().to_string();
        let intent = QueryIntent::classify(query);
        let start = Instant::now();

        let mut answer = self.run_ladder(query, intent).await;
        if answer.text.trim().is_empty() {
            answer = self.deterministic(query, intent);
        }

        tracing::info!(
            request_id = %request_id,
            tier = answer.tier.as_str(),
            intent = intent.as_str(),
            endpoint = ?answer.endpoint,
            model = ?answer.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "query answered"
        );
        TraceEvent::InferenceTier {
            request_id,
            tier: answer.tier.as_str().to_string(),
            intent: intent.as_str().to_string(),
            endpoint: answer.endpoint.clone(),
            model: answer.model.clone(),
        }
        .emit();

        answer
    }

    // ── Ladder ────────────────────────────────────────────────────

    async fn run_ladder(&self, query: &str, intent: QueryIntent) -> Answer {
        if query.trim().is_empty() {
            return self.deterministic(query, intent);
        }
        if intent == QueryIntent::ServerStatus {
            return self.status_answer(intent);
        }

        let snapshot = self.snapshots.read();
        let (prompt, _report) = self.budgeter.build(query, &snapshot, intent);
        let primary = self.cfg.primary_model.clone();

        // Tier 0: primary model.
        let mut reachable: Option<String> = None;
        match self.discovery.resolve().await {
            Ok(endpoint) => {
                match self.try_primary(&endpoint, &prompt).await {
                    PrimaryResult::Answered(text) => {
                        return self.model_answer(text, Tier::Primary, intent, &endpoint, &primary);
                    }
                    PrimaryResult::ModelMissing => {
                        return self.model_missing(intent, &endpoint);
                    }
                    PrimaryResult::Unusable => reachable = Some(endpoint.clone()),
                    PrimaryResult::Unreachable => {}
                }
                let transport_failed = reachable.is_none();

                let others: Vec<String> = self
                    .discovery
                    .candidates()
                    .iter()
                    .filter(|c| **c != endpoint)
                    .cloned()
                    .collect();
                for other in &others {
                    match self.send(other, &primary, &prompt, 1).await {
                        GenerateOutcome::Ok(text) => {
                            if transport_failed {
                                self.invalidate_after_failure();
                            }
                            return self.model_answer(text, Tier::AlternateEndpoint, intent, other, &primary);
                        }
                        GenerateOutcome::ModelMissing { .. } => {
                            if transport_failed {
                                self.invalidate_after_failure();
                            }
                            return self.model_missing(intent, other);
                        }
                        GenerateOutcome::Transport(_) => {}
                        _ => {
                            reachable.get_or_insert_with(|| other.clone());
                        }
                    }
                }

                if transport_failed {
                    self.invalidate_after_failure();
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "endpoint discovery failed, skipping model tiers");
            }
        }

        // Tier 1b: alternate models on a reachable server.
        if let Some(endpoint) = reachable {
            if let Some(answer) = self.try_alternate_models(query, &snapshot, intent, &endpoint).await {
                return answer;
            }
        }

        // Tier 2: local stub.
        match self.stub.generate(&prompt) {
            Ok(text) => {
                return Answer {
                    text,
                    tier: Tier::LocalStub,
                    intent,
                    endpoint: None,
                    model: None,
                };
            }
            Err(e) => tracing::warn!(error = %e, "local stub unavailable"),
        }

        // Tier 3: deterministic.
        self.deterministic(query, intent)
    }

    async fn try_primary(&self, endpoint: &str, prompt: &str) -> PrimaryResult {
        let model = self.cfg.primary_model.as_str();
        let attempts = self.cfg.max_attempts.max(1);
        let mut last = GenerateOutcome::Empty;

        for attempt in 1..=attempts {
            match self.send(endpoint, model, prompt, attempt).await {
                GenerateOutcome::Ok(text) => return PrimaryResult::Answered(text),
                GenerateOutcome::ModelMissing { .. } => return PrimaryResult::ModelMissing,
                other => last = other,
            }
            if attempt < attempts {
                tokio::time::sleep(Duration::from_millis(self.cfg.retry_delay_ms)).await;
            }
        }

        tracing::warn!(
            endpoint = %endpoint,
            model = %model,
            attempts,
            outcome = last.label(),
            "primary model failed, trying fallbacks"
        );
        match last {
            GenerateOutcome::Transport(_) => PrimaryResult::Unreachable,
            _ => PrimaryResult::Unusable,
        }
    }

    async fn try_alternate_models(
        &self,
        query: &str,
        snapshot: &str,
        intent: QueryIntent,
        endpoint: &str,
    ) -> Option<Answer> {
        let primary = self.cfg.primary_model.as_str();
        let (prompt, _report) = self.reduced_budgeter.build(query, snapshot, intent);

        for alt in self.cfg.alternate_models.iter().filter(|m| m.as_str() != primary) {
            match self.send(endpoint, alt, &prompt, 1).await {
                GenerateOutcome::Ok(text) => {
                    let labeled =
                        format!("[{primary} unavailable, answered by {alt} with reduced context] {text}");
                    return Some(self.model_answer(labeled, Tier::AlternateModel, intent, endpoint, alt));
                }
                other => {
                    tracing::warn!(
                        endpoint = %endpoint,
                        model = %alt,
                        outcome = other.label(),
                        "alternate model failed, trying next"
                    );
                }
            }
        }
        None
    }

    // ── Helpers ───────────────────────────────────────────────────

    async fn send(&self, endpoint: &str, model: &str, prompt: &str, attempt: u32) -> GenerateOutcome {
        let req = GenerateRequest {
            base_url: endpoint.to_string(),
            model: model.to_string(),
            prompt: prompt.to_string(),
            options: self.cfg.options.clone(),
            timeout: Duration::from_millis(self.cfg.request_timeout_ms),
        };

        let start = Instant::now();
        let outcome = self.backend.generate(&req).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        if outcome.text().is_none() {
            tracing::debug!(
                endpoint = %endpoint,
                model = %model,
                attempt,
                outcome = ?outcome,
                "generation attempt failed"
            );
        }
        TraceEvent::InferenceRequest {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            attempt,
            outcome: outcome.label().to_string(),
            duration_ms,
        }
        .emit();
        outcome
    }

    fn invalidate_after_failure(&self) {
        if self.cfg.invalidate_on_failure {
            self.discovery.invalidate();
        }
    }

    fn model_answer(
        &self,
        text: String,
        tier: Tier,
        intent: QueryIntent,
        endpoint: &str,
        model: &str,
    ) -> Answer {
        Answer {
            text,
            tier,
            intent,
            endpoint: Some(endpoint.to_string()),
            model: Some(model.to_string()),
        }
    }

    fn model_missing(&self, intent: QueryIntent, endpoint: &str) -> Answer {
        let model = &self.cfg.primary_model;
        tracing::warn!(endpoint = %endpoint, model = %model, "primary model not installed");
        Answer {
            text: format!(
                "The model \"{model}\" is not installed on the inference server at {endpoint}. \
                 Install it with `ollama pull {model}` and ask again."
            ),
            tier: Tier::ModelMissing,
            intent,
            endpoint: Some(endpoint.to_string()),
            model: Some(model.clone()),
        }
    }

    fn deterministic(&self, query: &str, intent: QueryIntent) -> Answer {
        Answer {
            text: CannedResponder::respond(query),
            tier: Tier::Deterministic,
            intent,
            endpoint: None,
            model: None,
        }
    }

    fn status_answer(&self, intent: QueryIntent) -> Answer {
        let discovery = self.discovery.status();
        let meta = self.snapshots.meta();

        let endpoint = discovery
            .working
            .clone()
            .unwrap_or_else(|| "not resolved yet".into());
        let candidates = discovery
            .candidates_cached
            .map(|n| n.to_string())
            .unwrap_or_else(|| "not generated".into());
        let stub = if self.stub.is_ready() { "ready" } else { "not ready" };
        let snapshot = match meta.generated_at {
            Some(at) => format!(
                "generation {} from {}, {} rows in {} tables, {} bytes",
                meta.generation,
                at.to_rfc3339(),
                meta.total_rows(),
                meta.row_counts.len(),
                meta.bytes
            ),
            None => "not built yet".into(),
        };

        Answer {
            text: format!(
                "Inference endpoint: {endpoint}. Candidates cached: {candidates}. \
                 Primary model: {}. Local stub: {stub}. Snapshot: {snapshot}.",
                self.cfg.primary_model
            ),
            tier: Tier::Status,
            intent,
            endpoint: discovery.working,
            model: None,
        }
    }
}
