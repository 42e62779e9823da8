//! AppState construction and background-task spawning.
//!
//! `serve` and the one-shot CLI commands share [`build_app_state`]; only
//! `serve` calls [`spawn_background_tasks`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use lq_domain::config::{Config, ConfigSeverity};
use lq_providers::{EndpointDiscovery, LocalStubResponder, OllamaBackend, TieredInferenceClient};
use lq_snapshot::{FileRecordStore, SnapshotBuilder, SnapshotStore};

use crate::state::AppState;

/// Validate config and wire every service into an [`AppState`].
///
/// Nothing here touches the network; the snapshot starts as `{}` until the
/// first regeneration.
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        anyhow::bail!("config validation failed with {error_count} error(s)");
    }

    // ── Snapshot store ───────────────────────────────────────────────
    let data_dir = config.store.data_dir.clone();
    if !data_dir.is_dir() {
        tracing::warn!(path = %data_dir.display(), "table directory not found, snapshot will be empty");
    }
    let records = Arc::new(FileRecordStore::new(data_dir));
    let snapshots = Arc::new(SnapshotStore::new(SnapshotBuilder::new(records)));

    // ── Inference backend & discovery ────────────────────────────────
    let backend = Arc::new(
        OllamaBackend::from_config(&config.inference).context("building inference HTTP client")?,
    );
    let discovery = Arc::new(EndpointDiscovery::new(config.discovery.clone(), backend.clone()));

    // ── Local stub ───────────────────────────────────────────────────
    let stub = Arc::new(LocalStubResponder::new(config.stub.clone()));

    // ── Tiered client ────────────────────────────────────────────────
    let client = Arc::new(TieredInferenceClient::new(
        config.inference.clone(),
        &config.budget,
        snapshots.clone(),
        discovery.clone(),
        backend,
        stub.clone(),
    ));

    tracing::info!(
        primary_model = %config.inference.primary_model,
        known_endpoints = config.discovery.known_endpoints.len(),
        "services ready"
    );

    Ok(AppState {
        config,
        snapshots,
        discovery,
        stub,
        client,
    })
}

/// Spawn the cache-warming and refresh loops used by `serve`.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Initial snapshot & stub warm-up (fire and forget) ────────────
    state.snapshots.notify_write();
    state.stub.preload();

    // ── Periodic snapshot refresh (optional) ─────────────────────────
    if let Some(secs) = state.config.snapshot.refresh_interval_secs.filter(|s| *s > 0) {
        let snapshots = state.snapshots.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(secs));
            // The first tick fires immediately and the warm-up above already
            // covers it.
            interval.tick().await;
            loop {
                interval.tick().await;
                snapshots.notify_write();
            }
        });
        tracing::info!(interval_secs = secs, "periodic snapshot refresh enabled");
    }
}
