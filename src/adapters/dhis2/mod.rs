//! DHIS2 adapter
//!
//! Web API client, wire envelopes, and the pending-change datastore.

pub mod api;
pub mod client;
pub mod models;

pub use api::Dhis2Api;
pub use client::Dhis2Client;
pub use models::{PendingChange, StagedEntry, StagingDisposition, RECORD_LAST_UPDATED_KEY};
