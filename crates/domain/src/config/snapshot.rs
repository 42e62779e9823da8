use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Snapshot refresh + file-backed record store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SnapshotConfig {
    /// Periodic regeneration for deployments without write notifications.
    /// `None` (default) regenerates only at startup and on notification.
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one `<table>.json` array per tracked table.
    #[serde(default = "d_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: d_data_dir(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Local stub responder
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StubConfig {
    #[serde(default = "d_true")]
    pub enabled: bool,
    /// The stub only reports ready when this resource exists.
    #[serde(default = "d_model_path")]
    pub model_path: PathBuf,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_path: d_model_path(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_data_dir() -> PathBuf {
    PathBuf::from("./data/tables")
}
fn d_model_path() -> PathBuf {
    PathBuf::from("./data/models/local-stub.bin")
}
fn d_true() -> bool {
    true
}
