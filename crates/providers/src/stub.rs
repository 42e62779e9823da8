//! Offline placeholder "model".
//!
//! Stands in for an on-device model: it becomes ready once its resource file
//! is present and then answers every prompt with a templated message. No
//! real inference happens here.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lq_contextpack::injection::question_of;
use lq_contextpack::truncation::truncate_chars;
use lq_domain::config::StubConfig;
use lq_domain::error::{Error, Result};
use lq_domain::trace::TraceEvent;

/// Characters of the question quoted back in the placeholder answer.
const QUOTE_CHARS: usize = 50;

pub struct LocalStubResponder {
    cfg: StubConfig,
    ready: AtomicBool,
}

impl LocalStubResponder {
    pub fn new(cfg: StubConfig) -> Self {
        Self {
            cfg,
            ready: AtomicBool::new(false),
        }
    }

    /// Check for the resource file and flip the ready flag.
    ///
    /// Idempotent. Returns false, without error, when the stub is disabled
    /// or the file is absent.
    pub fn initialize(&self) -> bool {
        if self.ready.load(Ordering::Acquire) {
            return true;
        }
        if !self.cfg.enabled {
            return false;
        }

        let present = self.cfg.model_path.is_file();
        if present && !self.ready.swap(true, Ordering::AcqRel) {
            tracing::info!(path = %self.cfg.model_path.display(), "local stub ready");
            TraceEvent::StubInitialized { ready: true }.emit();
        } else if !present {
            tracing::debug!(path = %self.cfg.model_path.display(), "local stub resource missing");
        }
        present
    }

    /// Warm the stub without waiting for it.
    pub fn preload(self: &Arc<Self>) {
        let stub = Arc::clone(self);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || stub.initialize());
            }
            Err(_) => {
                stub.initialize();
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Templated answer quoting the start of the prompt's question.
    pub fn generate(&self, prompt: &str) -> Result<String> {
        if !self.initialize() {
            return Err(Error::Stub(format!(
                "local model not available at {}",
                self.cfg.model_path.display()
            )));
        }

        let (quoted, _) = truncate_chars(question_of(prompt).trim(), QUOTE_CHARS);
        Ok(format!(
            "[offline mode] The inference server is unreachable, so this is a \
             placeholder answer from the local model. You asked: \"{quoted}\". \
             Please try again once the connection is restored."
        ))
    }
}
