//! Paginated endpoints, expressed as page sources for [`PagedLoader`](crate::PagedLoader).

use crate::api::{ApiClient, Reply};
use crate::error::ClientError;
use facelens_core::format::DateRange;
use facelens_core::{DetectionRecord, PersonRecord};
use std::future::Future;

/// Something that can return one page of results at `offset`.
pub trait PageSource {
    type Item;

    fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Reply<Vec<Self::Item>>, ClientError>> + Send;
}

/// Personnel records whose name contains `name`.
#[derive(Clone, Debug)]
pub struct PersonSearch {
    client: ApiClient,
    name: String,
}

impl PersonSearch {
    pub fn new(client: ApiClient, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }
}

impl PageSource for PersonSearch {
    type Item = PersonRecord;

    fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Reply<Vec<PersonRecord>>, ClientError>> + Send {
        self.client.search_persons(&self.name, offset, limit)
    }
}

/// Stored detections, newest first, optionally limited to a date range.
#[derive(Clone, Debug)]
pub struct DetectionHistory {
    client: ApiClient,
    range: Option<DateRange>,
}

impl DetectionHistory {
    pub fn new(client: ApiClient, range: Option<DateRange>) -> Self {
        Self { client, range }
    }
}

impl PageSource for DetectionHistory {
    type Item = DetectionRecord;

    fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Reply<Vec<DetectionRecord>>, ClientError>> + Send {
        self.client.list_detections(self.range.as_ref(), offset, limit)
    }
}
