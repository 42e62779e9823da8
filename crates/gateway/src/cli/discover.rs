//! `learnquery discover`: candidate list and endpoint resolution.

use std::sync::Arc;

use lq_domain::config::Config;
use lq_providers::{EndpointDiscovery, OllamaBackend};

pub async fn run(config: Arc<Config>, probe_all: bool) -> anyhow::Result<()> {
    let backend = Arc::new(OllamaBackend::from_config(&config.inference)?);
    let discovery = EndpointDiscovery::new(config.discovery.clone(), backend);

    let candidates = discovery.candidates();
    println!("{} candidate(s):", candidates.len());
    for (rank, url) in candidates.iter().enumerate() {
        if probe_all {
            let mark = if discovery.probe(url).await { "alive" } else { "-" };
            println!("  {:>2}. {url:<40} {mark}", rank + 1);
        } else {
            println!("  {:>2}. {url}", rank + 1);
        }
    }

    println!();
    match discovery.resolve().await {
        Ok(endpoint) => {
            println!("working endpoint: {endpoint}");
            Ok(())
        }
        Err(e) => {
            println!("no working endpoint ({e})");
            std::process::exit(1);
        }
    }
}
