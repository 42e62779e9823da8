use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use lq_domain::error::{Error, Result};
use lq_domain::table::TrackedTable;

use crate::source::RecordStore;

/// Reserved top-level key holding `table -> column description`.
pub const SCHEMA_KEY: &str = "schema";

/// Placeholder served before the first successful regeneration.
pub const EMPTY_SNAPSHOT: &str = "{}";

/// Bookkeeping that travels with a snapshot text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SnapshotMeta {
    /// 0 = placeholder, incremented by the store on every successful swap.
    pub generation: u64,
    pub generated_at: Option<DateTime<Utc>>,
    pub bytes: usize,
    pub row_counts: BTreeMap<String, usize>,
}

impl SnapshotMeta {
    pub fn total_rows(&self) -> usize {
        self.row_counts.values().sum()
    }
}

/// Renders the full snapshot document from a [`RecordStore`].
pub struct SnapshotBuilder {
    store: Arc<dyn RecordStore>,
}

impl SnapshotBuilder {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Fetch every tracked table and serialize
    /// `{table: [...rows], ..., "schema": {table: "columns"}}`.
    ///
    /// The first failing table aborts the build; no partial document is
    /// ever produced.
    pub async fn build(&self) -> Result<(String, SnapshotMeta)> {
        let mut doc = serde_json::Map::new();
        let mut schema = serde_json::Map::new();
        let mut row_counts = BTreeMap::new();

        for table in TrackedTable::ALL {
            let rows = self
                .store
                .fetch_table(table)
                .await
                .map_err(|e| match e {
                    Error::Store { .. } => e,
                    other => Error::Store {
                        table: table.name().into(),
                        message: other.to_string(),
                    },
                })?;

            row_counts.insert(table.name().to_string(), rows.len());
            doc.insert(
                table.name().to_string(),
                serde_json::Value::Array(rows.into_iter().map(serde_json::Value::Object).collect()),
            );
            schema.insert(
                table.name().to_string(),
                serde_json::Value::String(table.columns().to_string()),
            );
        }

        doc.insert(SCHEMA_KEY.to_string(), serde_json::Value::Object(schema));

        let text = serde_json::to_string(&serde_json::Value::Object(doc))?;
        let meta = SnapshotMeta {
            generation: 0,
            generated_at: Some(Utc::now()),
            bytes: text.len(),
            row_counts,
        };
        Ok((text, meta))
    }
}
