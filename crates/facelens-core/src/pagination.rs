//! Incremental page loading state.
//!
//! [`Paginator`] owns the accumulated result list and the offset/limit
//! cursor. It never performs I/O: [`Paginator::begin`] hands out a
//! [`PageTicket`] describing the next request, and the caller feeds the
//! response back through [`Paginator::complete`]. Only one ticket is
//! outstanding at a time and each is honoured once: a ticket that was
//! already completed, or was issued before a [`Paginator::reset`], is
//! recognised as stale and dropped.

/// Position of a paginated result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    /// Offset the next page will be requested at.
    pub offset: usize,
    pub page_size: usize,
    pub loaded_count: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    /// The first page was empty or could not be fetched. Terminal until reset.
    NotFound,
}

/// Permission to fetch one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    serial: u64,
    offset: usize,
    limit: usize,
}

impl PageTicket {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_first_page(&self) -> bool {
        self.offset == 0
    }
}

/// What applying a page response did.
#[derive(Debug, PartialEq)]
pub enum PageOutcome<E> {
    Appended { added: usize, has_more: bool },
    /// Nothing to show. Carries the error if the first fetch failed.
    NotFound(Option<E>),
    /// A later page failed; loaded items and `has_more` are untouched.
    Failed(E),
    /// The ticket was already completed, or was issued before the last reset.
    Stale,
}

#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Vec<T>,
    page_size: usize,
    pages_loaded: usize,
    has_more: bool,
    state: LoadState,
    /// Serial of the most recently issued ticket; bumped on reset too.
    serial: u64,
}

impl<T> Paginator<T> {
    /// A zero page size is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            page_size: page_size.max(1),
            pages_loaded: 0,
            has_more: true,
            state: LoadState::Idle,
            serial: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether a "load more" control should be offered and enabled.
    pub fn can_load_more(&self) -> bool {
        self.pages_loaded > 0 && self.has_more && self.state == LoadState::Idle
    }

    pub fn cursor(&self) -> PageCursor {
        PageCursor {
            offset: self.pages_loaded * self.page_size,
            page_size: self.page_size,
            loaded_count: self.items.len(),
            has_more: self.has_more,
        }
    }

    /// Claim the next page request.
    ///
    /// Returns `None` while a request is in flight, after the last page,
    /// or once the result set turned out empty.
    pub fn begin(&mut self) -> Option<PageTicket> {
        if self.state != LoadState::Idle || !self.has_more {
            return None;
        }
        self.state = LoadState::Loading;
        self.serial = self.serial.wrapping_add(1);
        Some(PageTicket {
            serial: self.serial,
            offset: self.pages_loaded * self.page_size,
            limit: self.page_size,
        })
    }

    /// Apply the response for `ticket`.
    pub fn complete<E>(&mut self, ticket: PageTicket, result: Result<Vec<T>, E>) -> PageOutcome<E> {
        if self.state != LoadState::Loading || ticket.serial != self.serial {
            return PageOutcome::Stale;
        }
        self.state = LoadState::Idle;

        match result {
            Ok(page) if self.pages_loaded == 0 && page.is_empty() => {
                self.has_more = false;
                self.state = LoadState::NotFound;
                PageOutcome::NotFound(None)
            }
            Ok(page) => {
                let added = page.len();
                self.has_more = added >= self.page_size;
                self.items.extend(page);
                self.pages_loaded += 1;
                PageOutcome::Appended {
                    added,
                    has_more: self.has_more,
                }
            }
            Err(e) if self.pages_loaded == 0 => {
                self.has_more = false;
                self.state = LoadState::NotFound;
                PageOutcome::NotFound(Some(e))
            }
            Err(e) => PageOutcome::Failed(e),
        }
    }

    /// Forget everything, e.g. on navigating away. Outstanding tickets go stale.
    pub fn reset(&mut self) {
        self.serial = self.serial.wrapping_add(1);
        self.items.clear();
        self.pages_loaded = 0;
        self.has_more = true;
        self.state = LoadState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serve `offset..offset+limit` out of `0..total`.
    fn serve(total: usize, ticket: PageTicket) -> Vec<usize> {
        (ticket.offset()..total.min(ticket.offset() + ticket.limit())).collect()
    }

    fn drain(total: usize, page_size: usize) -> (Paginator<usize>, usize) {
        let mut p = Paginator::new(page_size);
        let mut fetches = 0;
        while let Some(ticket) = p.begin() {
            fetches += 1;
            let page = serve(total, ticket);
            let _ = p.complete::<()>(ticket, Ok(page));
            assert!(fetches <= total + 2, "runaway paging");
        }
        (p, fetches)
    }

    #[test]
    fn test_twelve_records_in_pages_of_five() {
        let mut p = Paginator::new(5);
        let expected = [(5, true), (10, true), (12, false)];
        for (loaded, more) in expected {
            let t = p.begin().expect("should be able to load");
            let outcome = p.complete::<()>(t, Ok(serve(12, t)));
            assert!(matches!(outcome, PageOutcome::Appended { has_more, .. } if has_more == more));
            assert_eq!(p.items().len(), loaded);
            assert_eq!(p.has_more(), more);
        }
        assert!(p.begin().is_none());
        assert_eq!(p.items(), (0..12).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn test_drain_yields_every_item_in_order() {
        for page_size in 1..=7 {
            for total in 1..=30 {
                let (p, fetches) = drain(total, page_size);
                assert_eq!(p.items(), (0..total).collect::<Vec<_>>().as_slice());
                assert!(!p.has_more());
                // an exact multiple needs one trailing empty page to learn the end
                let expected = total / page_size + 1;
                let expected = if total % page_size == 0 {
                    expected
                } else {
                    total.div_ceil(page_size)
                };
                assert_eq!(fetches, expected, "P={page_size} T={total}");
            }
        }
    }

    #[test]
    fn test_short_page_stops_loading() {
        let mut p = Paginator::new(5);
        let t = p.begin().unwrap();
        p.complete::<()>(t, Ok(vec![1, 2, 3]));
        assert!(!p.has_more());
        assert!(!p.can_load_more());
        assert!(p.begin().is_none());
        assert!(p.begin().is_none());
    }

    #[test]
    fn test_single_flight() {
        let mut p: Paginator<u8> = Paginator::new(5);
        let t = p.begin().unwrap();
        assert!(p.is_loading());
        assert!(p.begin().is_none());
        p.complete::<()>(t, Ok(vec![0; 5]));
        assert!(!p.is_loading());
        assert!(p.can_load_more());
        let t2 = p.begin().unwrap();
        assert_eq!(t2.offset(), 5);
        assert_eq!(t2.limit(), 5);
        assert!(!t2.is_first_page());
    }

    #[test]
    fn test_empty_first_page_is_not_found() {
        let mut p: Paginator<u8> = Paginator::new(5);
        let t = p.begin().unwrap();
        assert_eq!(p.complete::<()>(t, Ok(vec![])), PageOutcome::NotFound(None));
        assert_eq!(p.state(), LoadState::NotFound);
        assert!(p.begin().is_none());
    }

    #[test]
    fn test_first_page_failure_is_not_found() {
        let mut p: Paginator<u8> = Paginator::new(5);
        let t = p.begin().unwrap();
        assert_eq!(p.complete(t, Err(404u16)), PageOutcome::NotFound(Some(404)));
        assert!(p.items().is_empty());
        assert_eq!(p.state(), LoadState::NotFound);
    }

    #[test]
    fn test_later_failure_keeps_loaded_items() {
        let mut p = Paginator::new(2);
        let t = p.begin().unwrap();
        p.complete::<&str>(t, Ok(vec!["a", "b"]));
        let t = p.begin().unwrap();
        assert_eq!(p.complete(t, Err("timeout")), PageOutcome::Failed("timeout"));
        assert_eq!(p.items(), &["a", "b"]);
        assert!(p.has_more());
        assert_eq!(p.state(), LoadState::Idle);

        // retry picks up at the same offset
        let t = p.begin().unwrap();
        assert_eq!(t.offset(), 2);
        p.complete::<&str>(t, Ok(vec!["c"]));
        assert_eq!(p.items(), &["a", "b", "c"]);
    }

    #[test]
    fn test_reset_discards_stale_response() {
        let mut p = Paginator::new(2);
        let old = p.begin().unwrap();
        p.reset();
        assert_eq!(p.complete::<()>(old, Ok(vec![9, 9])), PageOutcome::Stale);
        assert!(p.items().is_empty());
        assert_eq!(p.state(), LoadState::Idle);

        let t = p.begin().unwrap();
        assert!(t.is_first_page());
        p.complete::<()>(t, Ok(vec![1, 2]));
        assert_eq!(p.items(), &[1, 2]);
    }

    #[test]
    fn test_completed_ticket_is_not_applied_twice() {
        let mut p = Paginator::new(5);
        let t = p.begin().unwrap();
        p.complete::<()>(t, Ok(vec![1, 2]));
        assert_eq!(p.complete::<()>(t, Ok(vec![1, 2])), PageOutcome::Stale);
        assert_eq!(p.items(), &[1, 2]);
        assert_eq!(p.pages_loaded(), 1);
        assert_eq!(p.cursor().offset, 5);
    }

    #[test]
    fn test_old_ticket_cannot_stand_in_for_current_one() {
        let mut p = Paginator::new(2);
        let first = p.begin().unwrap();
        p.complete::<()>(first, Ok(vec![1, 2]));
        let second = p.begin().unwrap();
        assert_eq!(p.complete::<()>(first, Ok(vec![1, 2])), PageOutcome::Stale);
        assert!(p.is_loading());

        p.complete::<()>(second, Ok(vec![3]));
        assert_eq!(p.items(), &[1, 2, 3]);
        assert!(!p.has_more());
    }

    #[test]
    fn test_cursor_tracks_progress() {
        let mut p = Paginator::new(5);
        assert_eq!(
            p.cursor(),
            PageCursor {
                offset: 0,
                page_size: 5,
                loaded_count: 0,
                has_more: true,
            }
        );
        let t = p.begin().unwrap();
        p.complete::<()>(t, Ok(vec![0; 5]));
        assert_eq!(
            p.cursor(),
            PageCursor {
                offset: 5,
                page_size: 5,
                loaded_count: 5,
                has_more: true,
            }
        );
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let p: Paginator<u8> = Paginator::new(0);
        assert_eq!(p.page_size(), 1);
    }
}
