//! View request types

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::coord::Coordinate;
use crate::grid::{TileSet, TileSetId};
use crate::source::RequestId;

/// Default time a request may stay pending before it is dropped.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// View request queue settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// How long a request may wait for its grid. Independent of the
    /// request's display duration.
    pub timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl QueueConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Where a request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Waiting for its grid.
    Pending,
    /// Grid assembled, not yet shown.
    Ready { tile_set_id: TileSetId },
    /// Grid is the source's active set.
    Displayed {
        tile_set_id: TileSetId,
        displayed_at: Instant,
    },
}

/// A request to move the view to a new center and zoom.
#[derive(Debug, Clone)]
pub struct ViewRequest {
    id: RequestId,
    center: Coordinate,
    zoom: u8,
    wait: Duration,
    timeout: Duration,
    created_at: Instant,
    tile_set_id: Option<TileSetId>,
    displayed_at: Option<Instant>,
}

impl ViewRequest {
    pub(crate) fn new(
        id: RequestId,
        center: Coordinate,
        zoom: u8,
        wait: Duration,
        timeout: Duration,
        created_at: Instant,
    ) -> Self {
        Self {
            id,
            center,
            zoom,
            wait,
            timeout,
            created_at,
            tile_set_id: None,
            displayed_at: None,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Minimum time the grid stays displayed before the next request may
    /// replace it.
    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn state(&self) -> ViewState {
        match (self.tile_set_id, self.displayed_at) {
            (None, _) => ViewState::Pending,
            (Some(tile_set_id), None) => ViewState::Ready { tile_set_id },
            (Some(tile_set_id), Some(displayed_at)) => ViewState::Displayed {
                tile_set_id,
                displayed_at,
            },
        }
    }

    /// Records the assembled grid. Only the first result counts.
    pub(crate) fn attach(&mut self, tile_set_id: TileSetId) -> bool {
        if self.tile_set_id.is_some() {
            return false;
        }
        self.tile_set_id = Some(tile_set_id);
        true
    }

    pub(crate) fn mark_displayed(&mut self, now: Instant) {
        self.displayed_at = Some(now);
    }

    /// True if still pending and older than the timeout.
    pub(crate) fn timed_out(&self, now: Instant) -> bool {
        self.tile_set_id.is_none() && now.saturating_duration_since(self.created_at) > self.timeout
    }

    /// True if displayed for longer than its wait.
    pub(crate) fn display_elapsed(&self, now: Instant) -> bool {
        self.displayed_at
            .is_some_and(|shown| now.saturating_duration_since(shown) > self.wait)
    }
}

/// Result of matching a completed grid to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDelivery {
    /// The grid was attached; the request is now ready.
    Attached,
    /// The request already had a grid; the new one was ignored.
    AlreadyResolved,
    /// No such request in the queue (it timed out or never existed).
    UnknownRequest,
}

/// What one control pass did.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlOutcome {
    /// Queue is empty.
    Idle,
    /// Head request is still waiting for its grid.
    Waiting(RequestId),
    /// Head request's grid became the active set.
    Displayed {
        request_id: RequestId,
        tile_set: Arc<TileSet>,
    },
    /// Head request is displayed and its wait has not elapsed.
    Holding(RequestId),
    /// Head request never got its grid in time and was removed.
    TimedOut(RequestId),
    /// Head request's display window elapsed and it was removed.
    Finished(RequestId),
}

impl ControlOutcome {
    /// Request the pass acted on, if any.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            ControlOutcome::Idle => None,
            ControlOutcome::Waiting(id)
            | ControlOutcome::Holding(id)
            | ControlOutcome::TimedOut(id)
            | ControlOutcome::Finished(id) => Some(*id),
            ControlOutcome::Displayed { request_id, .. } => Some(*request_id),
        }
    }
}
