//! `learnquery snapshot`: build once from the table directory and print.

use std::sync::Arc;

use lq_domain::config::Config;
use lq_snapshot::{FileRecordStore, SnapshotBuilder, SnapshotStore};

pub async fn run(config: Arc<Config>) -> anyhow::Result<()> {
    let records = Arc::new(FileRecordStore::new(config.store.data_dir.clone()));
    let store = SnapshotStore::new(SnapshotBuilder::new(records));
    store.try_regenerate().await?;

    let (text, meta) = store.read_with_meta();
    println!("{text}");
    for (table, rows) in &meta.row_counts {
        eprintln!("{table:>14}: {rows}");
    }
    eprintln!("{} rows, {} bytes", meta.total_rows(), meta.bytes);
    Ok(())
}
