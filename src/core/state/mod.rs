//! Sync state tracking
//!
//! Watermark model and persistence for incremental sync runs.

pub mod store;
pub mod watermark;

pub use store::{FileStateStore, StateStore};
pub use watermark::{SyncStatus, Watermark};
