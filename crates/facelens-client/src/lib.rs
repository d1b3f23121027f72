//! facelens-client — Thin HTTP client for the face recognition API.
//!
//! The client never detects or matches anything itself: every request
//! is forwarded to the recognition service, and this crate only pages,
//! groups and tracks the results.

pub mod api;
pub mod config;
pub mod error;
pub mod loader;
pub mod sources;
pub mod submit;

pub use api::{ApiClient, Reply};
pub use config::Config;
pub use error::ClientError;
pub use loader::{LoadEvent, PagedLoader};
pub use sources::{DetectionHistory, PageSource, PersonSearch};
pub use submit::{submit_groups, GroupOutcome};
