//! JSON projection of the relational store used as model context.
//!
//! [`SnapshotBuilder`] reads every tracked table through a [`RecordStore`]
//! and renders one document; [`SnapshotStore`] holds the last completed
//! rendering and swaps in new ones atomically.

pub mod builder;
pub mod source;
pub mod store;

pub use builder::{SnapshotBuilder, SnapshotMeta};
pub use source::{FileRecordStore, RecordStore};
pub use store::SnapshotStore;
