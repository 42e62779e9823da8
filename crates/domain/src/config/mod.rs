mod budget;
mod discovery;
mod inference;
mod observability;
mod server;
mod snapshot;

pub use budget::*;
pub use discovery::*;
pub use inference::*;
pub use observability::*;
pub use server::*;
pub use snapshot::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub stub: StubConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |severity, field: &str, message: &str| {
            errors.push(ConfigError {
                severity,
                field: field.into(),
                message: message.into(),
            })
        };

        if self.server.port == 0 {
            push(ConfigSeverity::Error, "server.port", "port must be greater than 0");
        }
        if self.server.host.is_empty() {
            push(ConfigSeverity::Error, "server.host", "host must not be empty");
        }
        if !self.server.context_route.starts_with('/') {
            push(
                ConfigSeverity::Error,
                "server.context_route",
                "route must start with '/'",
            );
        }

        if self.inference.primary_model.trim().is_empty() {
            push(
                ConfigSeverity::Error,
                "inference.primary_model",
                "primary model must not be empty",
            );
        }
        if self.inference.max_attempts == 0 {
            push(
                ConfigSeverity::Error,
                "inference.max_attempts",
                "at least one attempt is required",
            );
        }
        if self.discovery.probe_timeout_ms >= 10_000 {
            push(
                ConfigSeverity::Warning,
                "discovery.probe_timeout_ms",
                "probe timeout of 10s or more makes discovery over many candidates very slow",
            );
        }
        if self.discovery.probe_timeout_ms > self.inference.request_timeout_ms {
            push(
                ConfigSeverity::Warning,
                "discovery.probe_timeout_ms",
                "probe timeout exceeds the inference request timeout",
            );
        }

        if self.budget.soft_max_chars == 0 {
            push(
                ConfigSeverity::Error,
                "budget.soft_max_chars",
                "soft ceiling must be greater than 0",
            );
        }
        if self.budget.hard_max_chars < self.budget.soft_max_chars {
            push(
                ConfigSeverity::Error,
                "budget.hard_max_chars",
                "hard ceiling must not be below the soft ceiling",
            );
        }
        if self.budget.hard_max_chars < SCHEMA_PROMPT_MIN_CHARS {
            push(
                ConfigSeverity::Warning,
                "budget.hard_max_chars",
                "hard ceiling is too small for the schema; oversized prompts carry the question only",
            );
        }

        if self.discovery.known_endpoints.is_empty()
            && !self.discovery.scan_interfaces
            && !self.discovery.include_private_guesses
            && self.discovery.alternate_hosts.is_empty()
        {
            push(
                ConfigSeverity::Warning,
                "discovery",
                "only loopback candidates will be probed",
            );
        }

        if self.stub.enabled && !self.stub.model_path.exists() {
            push(
                ConfigSeverity::Warning,
                "stub.model_path",
                "local stub resource not found; offline stub tier will be skipped",
            );
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
