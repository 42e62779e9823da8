use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Endpoint discovery
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Addresses tried before anything else, in order. Plain configuration:
    /// a host, `host:port`, or a full base URL.
    #[serde(default)]
    pub known_endpoints: Vec<String>,
    /// Port appended to candidate hosts that do not carry one.
    #[serde(default = "d_11434")]
    pub backend_port: u16,
    /// Include every non-loopback IPv4 address of the local interfaces.
    #[serde(default = "d_true")]
    pub scan_interfaces: bool,
    /// Include the static private-subnet guesses.
    #[serde(default = "d_true")]
    pub include_private_guesses: bool,
    #[serde(default = "d_private_guesses")]
    pub private_guesses: Vec<String>,
    /// Fixed alternate hostnames tried last.
    #[serde(default = "d_alternate_hosts")]
    pub alternate_hosts: Vec<String>,
    /// Throwaway low-cost model used by probes. A 404 for it still proves
    /// the server is up.
    #[serde(default = "d_probe_model")]
    pub probe_model: String,
    #[serde(default = "d_3000")]
    pub probe_timeout_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            known_endpoints: Vec::new(),
            backend_port: 11434,
            scan_interfaces: true,
            include_private_guesses: true,
            private_guesses: d_private_guesses(),
            alternate_hosts: d_alternate_hosts(),
            probe_model: d_probe_model(),
            probe_timeout_ms: 3_000,
        }
    }
}

/// Loopback and emulator aliases, always tried right after the known endpoints.
///
/// `10.0.2.2` is the Android emulator's host alias, `10.0.3.2` Genymotion's.
pub const LOOPBACK_ALIASES: &[&str] = &["127.0.0.1", "localhost", "10.0.2.2", "10.0.3.2"];

// ── serde default helpers ───────────────────────────────────────────

fn d_11434() -> u16 {
    11434
}
fn d_true() -> bool {
    true
}
fn d_3000() -> u64 {
    3_000
}
fn d_probe_model() -> String {
    "tinyllama".into()
}
fn d_private_guesses() -> Vec<String> {
    vec![
        "192.168.1.100".into(),
        "192.168.0.100".into(),
        "192.168.1.2".into(),
        "10.0.0.2".into(),
        "172.16.0.2".into(),
    ]
}
fn d_alternate_hosts() -> Vec<String> {
    vec![
        "host.docker.internal".into(),
        "ollama".into(),
        "ollama.local".into(),
    ]
}
