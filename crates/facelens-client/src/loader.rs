//! Single-flight incremental loader shared by every list view.
//!
//! Wraps a [`Paginator`] around a [`PageSource`]. The paginator lives
//! behind a mutex that is never held across the network await, so
//! `load_next` can be called from several tasks: the first claims the
//! page, the rest return [`LoadEvent::Skipped`] until it lands.

use crate::api::Reply;
use crate::error::ClientError;
use crate::sources::PageSource;
use facelens_core::pagination::{LoadState, PageCursor, PageOutcome, Paginator};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of one `load_next` call.
#[derive(Debug)]
pub enum LoadEvent {
    Appended { added: usize, has_more: bool },
    /// The result set is empty, or its first page could not be fetched.
    NotFound(Option<ClientError>),
    /// A later page failed. Already loaded items are kept; retry with `load_next`.
    Failed(ClientError),
    /// Nothing was requested: a load is in flight or there are no more pages.
    Skipped,
    /// The loader was reset while the request was in flight; the response was dropped.
    Stale,
}

pub struct PagedLoader<S: PageSource> {
    source: S,
    pages: Mutex<Paginator<S::Item>>,
}

impl<S: PageSource> PagedLoader<S> {
    pub fn new(source: S, page_size: usize) -> Self {
        Self {
            source,
            pages: Mutex::new(Paginator::new(page_size)),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the next page (the first page on a fresh loader) and append it.
    pub async fn load_next(&self) -> LoadEvent {
        let Some(ticket) = self.lock().begin() else {
            return LoadEvent::Skipped;
        };

        tracing::debug!(offset = ticket.offset(), limit = ticket.limit(), "loading page");
        let result = match self.source.fetch_page(ticket.offset(), ticket.limit()).await {
            Ok(Reply::Data(items)) => Ok(items),
            Ok(Reply::Status(code)) => Err(ClientError::Status(code)),
            Err(e) => Err(e),
        };

        match self.lock().complete(ticket, result) {
            PageOutcome::Appended { added, has_more } => {
                tracing::debug!(offset = ticket.offset(), added, has_more, "page loaded");
                LoadEvent::Appended { added, has_more }
            }
            PageOutcome::NotFound(err) => {
                match &err {
                    Some(e) => {
                        tracing::warn!(error = %e, "first page failed; treating as not found")
                    }
                    None => tracing::info!("no results"),
                }
                LoadEvent::NotFound(err)
            }
            PageOutcome::Failed(e) => {
                tracing::warn!(offset = ticket.offset(), error = %e, "page load failed");
                LoadEvent::Failed(e)
            }
            PageOutcome::Stale => {
                tracing::debug!(offset = ticket.offset(), "discarding stale page");
                LoadEvent::Stale
            }
        }
    }

    /// Keep loading until the last page, the not-found state, or an error.
    pub async fn load_all(&self) -> LoadEvent {
        loop {
            match self.load_next().await {
                LoadEvent::Appended { has_more: true, .. } => continue,
                event => return event,
            }
        }
    }

    /// Drop all loaded items. A request in flight will be discarded when it lands.
    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn items(&self) -> Vec<S::Item>
    where
        S::Item: Clone,
    {
        self.lock().items().to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_items(self) -> Vec<S::Item> {
        self.pages
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_items()
    }

    pub fn cursor(&self) -> PageCursor {
        self.lock().cursor()
    }

    pub fn state(&self) -> LoadState {
        self.lock().state()
    }

    /// True while a page request is outstanding; callers disable "load more".
    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    pub fn can_load_more(&self) -> bool {
        self.lock().can_load_more()
    }

    fn lock(&self) -> MutexGuard<'_, Paginator<S::Item>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
