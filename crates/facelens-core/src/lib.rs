//! facelens-core — Client-side state for the face recognition front end.
//!
//! Holds the wire types returned by the recognition API and the small
//! state machines that sit on top of them: result paging, overlay
//! geometry, and selection between bounding boxes and candidate groups.
//! Nothing in this crate performs I/O.

pub mod format;
pub mod geometry;
pub mod pagination;
pub mod selection;
pub mod types;
pub mod upload;

pub use geometry::{map_box, ImageGeometry, Overlay, Rect};
pub use pagination::{LoadState, PageCursor, PageOutcome, PageTicket, Paginator};
pub use selection::{ScrollRequest, Selection, SelectionSync};
pub use types::{BoundingBox, Candidate, CoreError, DetectionRecord, DetectionReport, PersonRecord};
pub use upload::{group_uploads, UploadGroup, UploadTracker};

/// Number of records requested per page by every list view.
pub const DEFAULT_PAGE_SIZE: usize = 5;
