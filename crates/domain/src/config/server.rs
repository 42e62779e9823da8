use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Context HTTP server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_8765")]
    pub port: u16,
    /// Loopback by default: the context endpoint is unauthenticated and only
    /// meant for co-located processes.
    #[serde(default = "d_host")]
    pub host: String,
    /// The single route that serves the current snapshot.
    #[serde(default = "d_context_route")]
    pub context_route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8765,
            host: d_host(),
            context_route: d_context_route(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_8765() -> u16 {
    8765
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_context_route() -> String {
    "/context".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
