use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use lq_domain::error::Result;
use lq_domain::trace::TraceEvent;

use crate::builder::{SnapshotBuilder, SnapshotMeta, EMPTY_SNAPSHOT};

/// Text and metadata are always swapped together.
struct Current {
    text: Arc<str>,
    meta: Arc<SnapshotMeta>,
}

/// Holder of the latest completed snapshot.
///
/// Readers take the lock only long enough to clone two `Arc`s; a rebuild
/// renders the whole document before it touches the lock, so a reader never
/// waits on table fetches and never sees a half-written document.
pub struct SnapshotStore {
    builder: SnapshotBuilder,
    current: Mutex<Current>,
    /// A detached regeneration task is running.
    in_flight: AtomicBool,
    /// A write notification arrived that the running task has not covered yet.
    dirty: AtomicBool,
}

impl SnapshotStore {
    pub fn new(builder: SnapshotBuilder) -> Self {
        Self {
            builder,
            current: Mutex::new(Current {
                text: Arc::from(EMPTY_SNAPSHOT),
                meta: Arc::new(SnapshotMeta::default()),
            }),
            in_flight: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
        }
    }

    /// Current snapshot text; `{}` until the first regeneration completes.
    pub fn read(&self) -> Arc<str> {
        self.current.lock().text.clone()
    }

    pub fn meta(&self) -> Arc<SnapshotMeta> {
        self.current.lock().meta.clone()
    }

    /// Text and metadata from the same regeneration cycle.
    pub fn read_with_meta(&self) -> (Arc<str>, Arc<SnapshotMeta>) {
        let cur = self.current.lock();
        (cur.text.clone(), cur.meta.clone())
    }

    pub fn is_populated(&self) -> bool {
        self.current.lock().meta.generation > 0
    }

    /// Rebuild and swap in a new snapshot, returning the new generation.
    ///
    /// On error the previous snapshot is left untouched.
    pub async fn try_regenerate(&self) -> Result<u64> {
        let start = Instant::now();
        let (text, mut meta) = self.builder.build().await?;

        let bytes = meta.bytes;
        let tables = meta.row_counts.len();
        let total_rows = meta.total_rows();

        let generation = {
            let mut cur = self.current.lock();
            meta.generation = cur.meta.generation + 1;
            let generation = meta.generation;
            *cur = Current {
                text: Arc::from(text),
                meta: Arc::new(meta),
            };
            generation
        };

        TraceEvent::SnapshotRegenerated {
            generation,
            bytes,
            tables,
            total_rows,
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        Ok(generation)
    }

    /// Like [`try_regenerate`](Self::try_regenerate) but never fails: errors
    /// are logged and the previous snapshot is kept. Returns whether a new
    /// snapshot was swapped in.
    pub async fn regenerate(&self) -> bool {
        match self.try_regenerate().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "snapshot regeneration failed, keeping previous snapshot");
                TraceEvent::SnapshotRegenerationFailed {
                    error: e.to_string(),
                }
                .emit();
                false
            }
        }
    }

    /// Write-notification hook for the relational store.
    ///
    /// Fire and forget: spawns a detached regeneration. Notifications that
    /// arrive while one is running are coalesced into a single extra pass
    /// once it finishes, so the newest write is always picked up.
    pub fn notify_write(self: &Arc<Self>) {
        self.dirty.store(true, Ordering::SeqCst);
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("write notification outside a tokio runtime, regeneration skipped");
                self.in_flight.store(false, Ordering::SeqCst);
                return;
            }
        };

        let store = Arc::clone(self);
        handle.spawn(async move {
            loop {
                store.dirty.store(false, Ordering::SeqCst);
                store.regenerate().await;

                if store.dirty.load(Ordering::SeqCst) {
                    continue;
                }
                store.in_flight.store(false, Ordering::SeqCst);
                // A notification may have landed between the check and the
                // release; reclaim the slot unless another task already did.
                if store.dirty.load(Ordering::SeqCst)
                    && !store.in_flight.swap(true, Ordering::SeqCst)
                {
                    continue;
                }
                break;
            }
        });
    }

    /// Whether a detached regeneration is currently running.
    pub fn is_regenerating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RecordStore;
    use lq_domain::error::Error;
    use lq_domain::table::{Record, TrackedTable};
    use std::sync::atomic::AtomicUsize;

    /// Returns one row per table; fails every table once `fail` is set.
    struct ToggleStore {
        fail: AtomicBool,
        fetches: AtomicUsize,
    }

    impl ToggleStore {
        fn new() -> Self {
            Self {
                fail: AtomicBool::new(false),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl RecordStore for ToggleStore {
        async fn fetch_table(&self, table: TrackedTable) -> Result<Vec<Record>> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) && table == TrackedTable::Topics {
                return Err(Error::Other("disk I/O error".into()));
            }
            let mut row = Record::new();
            row.insert("fetch".into(), n.into());
            Ok(vec![row])
        }
    }

    fn store_over(source: Arc<ToggleStore>) -> SnapshotStore {
        SnapshotStore::new(SnapshotBuilder::new(source))
    }

    #[test]
    fn empty_store_reads_valid_json() {
        let store = store_over(Arc::new(ToggleStore::new()));
        let text = store.read();
        assert_eq!(&*text, "{}");
        assert!(serde_json::from_str::<serde_json::Value>(&text).is_ok());
        assert!(!store.is_populated());
    }

    #[tokio::test]
    async fn regenerate_replaces_snapshot_and_bumps_generation() {
        let store = store_over(Arc::new(ToggleStore::new()));
        assert!(store.regenerate().await);
        assert!(store.regenerate().await);
        assert!(store.is_populated());
        assert_eq!(store.meta().generation, 2);

        let doc: serde_json::Value = serde_json::from_str(&store.read()).unwrap();
        assert_eq!(doc["users"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_regeneration_keeps_previous_text() {
        let source = Arc::new(ToggleStore::new());
        let store = store_over(source.clone());
        assert!(store.regenerate().await);
        let before = store.read();
        let before_gen = store.meta().generation;

        source.fail.store(true, Ordering::SeqCst);
        assert!(!store.regenerate().await);

        assert_eq!(&*store.read(), &*before);
        assert_eq!(store.meta().generation, before_gen);
    }

    #[tokio::test]
    async fn failed_first_regeneration_keeps_placeholder() {
        let source = Arc::new(ToggleStore::new());
        source.fail.store(true, Ordering::SeqCst);
        let store = store_over(source);
        assert!(store.try_regenerate().await.is_err());
        assert_eq!(&*store.read(), "{}");
    }

    #[tokio::test]
    async fn notify_write_regenerates_in_background() {
        let store = Arc::new(store_over(Arc::new(ToggleStore::new())));
        store.notify_write();

        for _ in 0..100 {
            if store.is_populated() && !store.is_regenerating() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(store.is_populated());
        assert!(!store.is_regenerating());
    }
}
