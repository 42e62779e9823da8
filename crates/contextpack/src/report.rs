use serde::{Deserialize, Serialize};

/// How much of the snapshot made it into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    /// Snapshot injected verbatim.
    Full,
    /// Per-table counts plus one trimmed sample row.
    Summarized,
    /// Static schema only, question truncated.
    Minimal,
}

impl BudgetLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            BudgetLevel::Full => "full",
            BudgetLevel::Summarized => "summarized",
            BudgetLevel::Minimal => "minimal",
        }
    }
}

/// Machine-readable account of one prompt build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetReport {
    pub level: BudgetLevel,
    pub snapshot_chars: usize,
    pub injected_data_chars: usize,
    pub total_chars: usize,
    pub query_chars: usize,
    pub query_truncated: bool,
    /// Tables listed in the summary (0 unless `level == Summarized`).
    pub tables_summarized: usize,
}
