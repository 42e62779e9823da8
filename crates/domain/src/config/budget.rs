use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Prompt budget caps
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Smallest hard ceiling that comfortably holds the schema-only prompt. Below
/// it an oversized prompt may be reduced to the question alone.
pub const SCHEMA_PROMPT_MIN_CHARS: usize = 2_048;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Ceiling for the data portion; above it the snapshot is summarized.
    #[serde(default = "d_100000")]
    pub soft_max_chars: usize,
    /// Ceiling for the whole prompt; above it only the static schema is sent.
    #[serde(default = "d_4000000")]
    pub hard_max_chars: usize,
    #[serde(default = "d_5")]
    pub summary_max_fields: usize,
    #[serde(default = "d_15")]
    pub summary_value_chars: usize,
    #[serde(default = "d_100")]
    pub minimal_query_chars: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            soft_max_chars: 100_000,
            hard_max_chars: 4_000_000,
            summary_max_fields: 5,
            summary_value_chars: 15,
            minimal_query_chars: 100,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_100000() -> usize {
    100_000
}
fn d_4000000() -> usize {
    4_000_000
}
fn d_5() -> usize {
    5
}
fn d_15() -> usize {
    15
}
fn d_100() -> usize {
    100
}
