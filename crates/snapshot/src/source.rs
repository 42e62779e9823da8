use std::path::PathBuf;

use lq_domain::error::{Error, Result};
use lq_domain::table::{Record, TrackedTable};

/// Read-only access to the relational store, one call per tracked table.
///
/// Implementations return rows in the store's natural order. The snapshot
/// builder never writes through this trait.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_table(&self, table: TrackedTable) -> Result<Vec<Record>>;
}

/// A record store backed by a directory of `<table>.json` files, each holding
/// a JSON array of flat objects.
///
/// A missing file is an empty table; anything that is not an array of
/// objects is an error for that table.
pub struct FileRecordStore {
    root: PathBuf,
}

impl FileRecordStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn path_for(&self, table: TrackedTable) -> PathBuf {
        self.root.join(format!("{}.json", table.name()))
    }
}

#[async_trait::async_trait]
impl RecordStore for FileRecordStore {
    async fn fetch_table(&self, table: TrackedTable) -> Result<Vec<Record>> {
        let path = self.path_for(table);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(table = %table, path = %path.display(), "table file missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| Error::Store {
            table: table.name().into(),
            message: format!("invalid JSON in {}: {e}", path.display()),
        })?;

        let rows = match value {
            serde_json::Value::Array(rows) => rows,
            _ => {
                return Err(Error::Store {
                    table: table.name().into(),
                    message: "expected a JSON array of records".into(),
                })
            }
        };

        rows.into_iter()
            .enumerate()
            .map(|(idx, row)| match row {
                serde_json::Value::Object(map) => Ok(map),
                _ => Err(Error::Store {
                    table: table.name().into(),
                    message: format!("row {idx} is not an object"),
                }),
            })
            .collect()
    }
}
