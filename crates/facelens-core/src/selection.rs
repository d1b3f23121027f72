//! Selection synchronizer between the image overlay and the candidate list.
//!
//! A click on a bounding box and a click on its candidate-group header are
//! the same input: both toggle that group open, closing any other. Every
//! transition yields the scroll the list should perform.

use crate::types::CoreError;
use std::time::Duration;

/// Delay before scrolling, so the expand/collapse animation starts first.
pub const SCROLL_DELAY: Duration = Duration::from_millis(400);

/// Which candidate group, if any, is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Closed,
    /// Zero-based index of the expanded group.
    Open(usize),
}

impl Selection {
    pub fn index(&self) -> Option<usize> {
        match self {
            Selection::Closed => None,
            Selection::Open(i) => Some(*i),
        }
    }
}

/// Where the click came from. Both sources follow the same transition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickSource {
    BoundingBox,
    ListGroup,
}

/// Bring `group` to the leading edge of the list viewport after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub group: usize,
    pub delay: Duration,
}

/// One applied selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Selection,
    pub to: Selection,
    pub scroll: Option<ScrollRequest>,
}

#[derive(Debug, Clone)]
pub struct SelectionSync {
    state: Selection,
    groups: usize,
    scroll_delay: Duration,
}

impl SelectionSync {
    pub fn new(groups: usize) -> Self {
        Self {
            state: Selection::Closed,
            groups,
            scroll_delay: SCROLL_DELAY,
        }
    }

    pub fn with_scroll_delay(mut self, delay: Duration) -> Self {
        self.scroll_delay = delay;
        self
    }

    pub fn state(&self) -> Selection {
        self.state
    }

    pub fn groups(&self) -> usize {
        self.groups
    }

    pub fn is_open(&self, group: usize) -> bool {
        self.state == Selection::Open(group)
    }

    /// Start over for a new set of boxes.
    pub fn reset(&mut self, groups: usize) {
        self.state = Selection::Closed;
        self.groups = groups;
    }

    pub fn click_box(&mut self, group: usize) -> Result<Transition, CoreError> {
        self.click(ClickSource::BoundingBox, group)
    }

    pub fn click_group(&mut self, group: usize) -> Result<Transition, CoreError> {
        self.click(ClickSource::ListGroup, group)
    }

    /// Toggle `group`: open it, or close it if it is already open.
    pub fn click(&mut self, source: ClickSource, group: usize) -> Result<Transition, CoreError> {
        if group >= self.groups {
            return Err(CoreError::SelectionOutOfRange {
                index: group,
                len: self.groups,
            });
        }
        let next = match self.state {
            Selection::Open(open) if open == group => Selection::Closed,
            _ => Selection::Open(group),
        };
        tracing::trace!(?source, group, from = ?self.state, to = ?next, "selection click");
        Ok(self.transition(next))
    }

    /// Collapse whatever is open.
    pub fn close(&mut self) -> Transition {
        self.transition(Selection::Closed)
    }

    fn transition(&mut self, next: Selection) -> Transition {
        let from = self.state;
        self.state = next;
        // Closing stays anchored on the group that was open.
        let target = match next {
            Selection::Open(group) => Some(group),
            Selection::Closed => from.index(),
        };
        Transition {
            from,
            to: next,
            scroll: target.map(|group| ScrollRequest {
                group,
                delay: self.scroll_delay,
            }),
        }
    }
}
