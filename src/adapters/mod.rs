//! External system adapters
//!
//! HTTP clients for the master facility registry and DHIS2, plus the shared
//! retry policy. Each adapter exposes its operations through a trait so the
//! core stays testable without a network.

pub mod dhis2;
pub mod registry;
pub mod retry;

pub use retry::RetryPolicy;
