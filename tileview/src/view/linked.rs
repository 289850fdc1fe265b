//! Two maps kept on the same view.

use std::time::{Duration, Instant};

use super::queue::ViewRequestQueue;
use super::types::ControlOutcome;
use crate::coord::Coordinate;
use crate::error::TileError;
use crate::grid::Viewport;
use crate::provider::{HttpClient, ReqwestClient};
use crate::source::RequestId;

/// A pair of view queues driven together, one per tile source.
///
/// Typically used to show two providers (say, a road map and satellite
/// imagery) side by side. Each queue keeps its own ordering and timeout, so
/// one slow provider never holds back the other.
pub struct LinkedViews<C: HttpClient + 'static = ReqwestClient> {
    primary: ViewRequestQueue<C>,
    secondary: ViewRequestQueue<C>,
}

impl<C: HttpClient + 'static> LinkedViews<C> {
    pub fn new(primary: ViewRequestQueue<C>, secondary: ViewRequestQueue<C>) -> Self {
        Self { primary, secondary }
    }

    pub fn primary(&self) -> &ViewRequestQueue<C> {
        &self.primary
    }

    pub fn secondary(&self) -> &ViewRequestQueue<C> {
        &self.secondary
    }

    /// Applies a viewport change to both maps.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.primary.set_viewport(viewport);
        self.secondary.set_viewport(viewport);
    }

    /// Requests the same view on both maps.
    ///
    /// Both queues validate input identically, so either both requests are
    /// queued or neither is.
    pub fn center_next(
        &mut self,
        center: Coordinate,
        zoom: u8,
        wait: Duration,
    ) -> Result<(RequestId, RequestId), TileError> {
        self.center_next_at(center, zoom, wait, Instant::now())
    }

    pub fn center_next_at(
        &mut self,
        center: Coordinate,
        zoom: u8,
        wait: Duration,
        now: Instant,
    ) -> Result<(RequestId, RequestId), TileError> {
        let first = self.primary.center_next_at(center, zoom, wait, now)?;
        let second = self.secondary.center_next_at(center, zoom, wait, now)?;
        Ok((first, second))
    }

    /// Runs a control pass on both maps.
    pub fn control_pass(&mut self) -> (ControlOutcome, ControlOutcome) {
        self.control_pass_at(Instant::now())
    }

    pub fn control_pass_at(&mut self, now: Instant) -> (ControlOutcome, ControlOutcome) {
        (
            self.primary.control_pass_at(now),
            self.secondary.control_pass_at(now),
        )
    }
}
