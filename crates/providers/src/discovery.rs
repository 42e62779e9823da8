//! Inference endpoint discovery and health caching.
//!
//! The backend's address is not stable (emulators, Docker, DHCP), so
//! candidates are synthesized from configuration, loopback aliases, the
//! host's own interfaces and a few common guesses. The first candidate that
//! answers a probe is cached until [`EndpointDiscovery::invalidate`].

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

use lq_domain::config::{DiscoveryConfig, GenerationOptions, LOOPBACK_ALIASES};
use lq_domain::error::{Error, Result};
use lq_domain::trace::TraceEvent;

use crate::traits::{GenerateRequest, InferenceBackend};
use crate::util::normalize_base_url;

/// Lists the non-loopback IPv4 addresses of this host.
pub type InterfaceScanner = fn() -> Vec<Ipv4Addr>;

/// IPv4 addresses bound to local, non-loopback interfaces.
pub fn local_ipv4_addrs() -> Vec<Ipv4Addr> {
    match if_addrs::get_if_addrs() {
        Ok(ifaces) => ifaces
            .into_iter()
            .filter(|iface| !iface.is_loopback())
            .filter_map(|iface| match iface.ip() {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .collect(),
        Err(e) => {
            tracing::debug!(error = %e, "interface enumeration failed");
            Vec::new()
        }
    }
}

/// Point-in-time view of the discovery caches.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryStatus {
    pub working: Option<String>,
    /// `None` until candidates have been generated.
    pub candidates_cached: Option<usize>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Discovery service
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct EndpointDiscovery {
    cfg: DiscoveryConfig,
    backend: Arc<dyn InferenceBackend>,
    scan: InterfaceScanner,
    working: Mutex<Option<String>>,
    candidates: Mutex<Option<Arc<Vec<String>>>>,
}

impl EndpointDiscovery {
    pub fn new(cfg: DiscoveryConfig, backend: Arc<dyn InferenceBackend>) -> Self {
        Self::with_scanner(cfg, backend, local_ipv4_addrs)
    }

    pub fn with_scanner(
        cfg: DiscoveryConfig,
        backend: Arc<dyn InferenceBackend>,
        scan: InterfaceScanner,
    ) -> Self {
        Self {
            cfg,
            backend,
            scan,
            working: Mutex::new(None),
            candidates: Mutex::new(None),
        }
    }

    // ── Candidates ────────────────────────────────────────────────

    /// Ranked, deduplicated candidate base URLs; generated once and cached.
    pub fn candidates(&self) -> Arc<Vec<String>> {
        if let Some(cached) = self.candidates.lock().as_ref() {
            return Arc::clone(cached);
        }

        let fresh = Arc::new(self.generate_candidates());
        let mut slot = self.candidates.lock();
        Arc::clone(slot.get_or_insert(fresh))
    }

    fn generate_candidates(&self) -> Vec<String> {
        let port = self.cfg.backend_port;
        let mut hosts: Vec<String> = Vec::new();

        hosts.extend(self.cfg.known_endpoints.iter().cloned());
        hosts.extend(LOOPBACK_ALIASES.iter().map(|h| h.to_string()));
        if self.cfg.scan_interfaces {
            hosts.extend((self.scan)().into_iter().map(|ip| ip.to_string()));
        }
        if self.cfg.include_private_guesses {
            hosts.extend(self.cfg.private_guesses.iter().cloned());
        }
        hosts.extend(self.cfg.alternate_hosts.iter().cloned());

        let mut seen = HashSet::new();
        let list: Vec<String> = hosts
            .iter()
            .filter(|h| !h.trim().is_empty())
            .map(|h| normalize_base_url(h, port))
            .filter(|url| seen.insert(url.clone()))
            .collect();

        tracing::debug!(count = list.len(), "generated endpoint candidates");
        list
    }

    // ── Probing ───────────────────────────────────────────────────

    /// Send a one-token request with the throwaway probe model.
    ///
    /// A reply of any kind from the backend protocol, including "model not
    /// found", marks the server alive. Failures are logged and swallowed.
    pub async fn probe(&self, url: &str) -> bool {
        let req = GenerateRequest {
            base_url: url.to_string(),
            model: self.cfg.probe_model.clone(),
            prompt: "ping".into(),
            options: GenerationOptions {
                num_predict: 1,
                ..Default::default()
            },
            timeout: Duration::from_millis(self.cfg.probe_timeout_ms),
        };

        let start = Instant::now();
        let outcome = self.backend.generate(&req).await;
        let alive = outcome.server_alive();
        let duration_ms = start.elapsed().as_millis() as u64;

        if !alive {
            tracing::debug!(endpoint = %url, outcome = outcome.label(), "probe failed");
        }
        TraceEvent::EndpointProbed {
            endpoint: url.to_string(),
            alive,
            duration_ms,
        }
        .emit();
        alive
    }

    // ── Resolution ────────────────────────────────────────────────

    /// The cached working endpoint, or the first candidate that answers a
    /// probe.
    ///
    /// Candidates are probed one at a time in priority order. The cache is
    /// only ever filled, never overwritten, so a concurrent resolver that
    /// finds a different endpoint returns whichever was cached first.
    pub async fn resolve(&self) -> Result<String> {
        if let Some(url) = self.cached() {
            TraceEvent::EndpointResolved {
                endpoint: url.clone(),
                cache_hit: true,
            }
            .emit();
            return Ok(url);
        }

        let candidates = self.candidates();
        for url in candidates.iter() {
            if let Some(winner) = self.cached() {
                return Ok(winner);
            }
            if !self.probe(url).await {
                continue;
            }

            let winner = {
                let mut slot = self.working.lock();
                slot.get_or_insert_with(|| url.clone()).clone()
            };
            tracing::info!(endpoint = %winner, "inference endpoint resolved");
            TraceEvent::EndpointResolved {
                endpoint: winner.clone(),
                cache_hit: false,
            }
            .emit();
            return Ok(winner);
        }

        tracing::warn!(tried = candidates.len(), "no inference endpoint answered");
        Err(Error::Discovery("no inference endpoint available".into()))
    }

    /// Forget the working endpoint and the candidate list.
    pub fn invalidate(&self) {
        let previous = self.working.lock().take();
        *self.candidates.lock() = None;
        tracing::info!(previous = ?previous, "endpoint discovery invalidated");
        TraceEvent::DiscoveryInvalidated { previous }.emit();
    }

    pub fn cached(&self) -> Option<String> {
        self.working.lock().clone()
    }

    pub fn status(&self) -> DiscoveryStatus {
        DiscoveryStatus {
            working: self.cached(),
            candidates_cached: self.candidates.lock().as_ref().map(|c| c.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::GenerateOutcome;

    struct DeadBackend;

    #[async_trait::async_trait]
    impl InferenceBackend for DeadBackend {
        async fn generate(&self, _req: &GenerateRequest) -> GenerateOutcome {
            GenerateOutcome::Transport("connection refused".into())
        }
        fn backend_id(&self) -> &str {
            "dead"
        }
    }

    fn fake_interfaces() -> Vec<Ipv4Addr> {
        vec![Ipv4Addr::new(192, 168, 1, 57), Ipv4Addr::new(10, 0, 2, 2)]
    }

    fn quiet_config() -> DiscoveryConfig {
        DiscoveryConfig {
            known_endpoints: vec!["192.168.1.40".into()],
            alternate_hosts: vec!["ollama".into()],
            private_guesses: vec!["192.168.1.57".into(), "10.0.0.2".into()],
            ..Default::default()
        }
    }

    #[test]
    fn candidates_follow_priority_and_dedup() {
        let discovery =
            EndpointDiscovery::with_scanner(quiet_config(), Arc::new(DeadBackend), fake_interfaces);
        let list = discovery.candidates();
        assert_eq!(
            list.as_slice(),
            &[
                "http://192.168.1.40:11434",
                "http://127.0.0.1:11434",
                "http://localhost:11434",
                "http://10.0.2.2:11434",
                "http://10.0.3.2:11434",
                "http://192.168.1.57:11434",
                "http://10.0.0.2:11434",
                "http://ollama:11434",
            ]
        );
    }

    #[test]
    fn optional_sources_can_be_disabled() {
        let cfg = DiscoveryConfig {
            scan_interfaces: false,
            include_private_guesses: false,
            alternate_hosts: Vec::new(),
            ..Default::default()
        };
        let discovery = EndpointDiscovery::with_scanner(cfg, Arc::new(DeadBackend), fake_interfaces);
        assert_eq!(discovery.candidates().len(), LOOPBACK_ALIASES.len());
    }

    #[test]
    fn candidates_are_cached_until_invalidated() {
        let discovery =
            EndpointDiscovery::with_scanner(quiet_config(), Arc::new(DeadBackend), fake_interfaces);
        assert!(discovery.status().candidates_cached.is_none());
        let first = discovery.candidates();
        let second = discovery.candidates();
        assert!(Arc::ptr_eq(&first, &second));

        discovery.invalidate();
        assert!(discovery.status().candidates_cached.is_none());
        assert!(!Arc::ptr_eq(&first, &discovery.candidates()));
    }

    #[tokio::test]
    async fn exhausted_candidates_report_discovery_error() {
        let discovery =
            EndpointDiscovery::with_scanner(quiet_config(), Arc::new(DeadBackend), fake_interfaces);
        let err = discovery.resolve().await.unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
        assert!(discovery.cached().is_none());
    }
}
