//! Sync run orchestration

pub mod orchestrator;
pub mod report;
pub mod summary;

pub use orchestrator::{describe_watermark, SyncOrchestrator};
pub use report::{
    JobReporter, TracingReporter, PROGRESS_PAGE_COMPLETE, PROGRESS_PAGE_FETCHED,
    PROGRESS_PAGE_MIDPOINT,
};
pub use summary::{SyncIssue, SyncIssueType, SyncSummary};
