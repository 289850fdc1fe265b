//! FIFO of view requests for one tile source.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use super::types::{ControlOutcome, QueueConfig, ResultDelivery, ViewRequest, ViewState};
use crate::coord::Coordinate;
use crate::error::TileError;
use crate::grid::Viewport;
use crate::provider::{HttpClient, ReqwestClient};
use crate::source::{GridLoaded, RequestId, TileSource};

/// Schedules view changes on one tile source.
///
/// Each [`center_next`](Self::center_next) starts a background grid load and
/// queues a [`ViewRequest`]. The consumer calls
/// [`control_pass`](Self::control_pass) on a fixed period; each pass first
/// collects finished loads, then advances only the head of the queue:
///
/// | Head state | Condition             | Action                         |
/// |------------|-----------------------|--------------------------------|
/// | Pending    | older than timeout    | removed                        |
/// | Ready      | always                | set active, stamped displayed  |
/// | Displayed  | shown longer than wait| removed                        |
///
/// A later request is never displayed before every earlier one has been
/// displayed or timed out. Results for requests that are no longer queued
/// are ignored.
///
/// Must be used from within a Tokio runtime.
pub struct ViewRequestQueue<C: HttpClient + 'static = ReqwestClient> {
    source: TileSource<C>,
    config: QueueConfig,
    viewport: Viewport,
    // Request ids increase monotonically, so key order is submission order.
    requests: BTreeMap<RequestId, ViewRequest>,
    results_tx: UnboundedSender<GridLoaded>,
    results_rx: UnboundedReceiver<GridLoaded>,
}

impl<C: HttpClient + 'static> ViewRequestQueue<C> {
    pub fn new(source: TileSource<C>, config: QueueConfig, viewport: Viewport) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            source,
            config,
            viewport,
            requests: BTreeMap::new(),
            results_tx,
            results_rx,
        }
    }

    pub fn source(&self) -> &TileSource<C> {
        &self.source
    }

    pub fn config(&self) -> QueueConfig {
        self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Changes the viewport used by subsequent requests.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn request(&self, id: RequestId) -> Option<&ViewRequest> {
        self.requests.get(&id)
    }

    /// Queued requests in submission order.
    pub fn requests(&self) -> impl Iterator<Item = &ViewRequest> {
        self.requests.values()
    }

    /// Requests a move to `center` at `zoom`, to be displayed for at least
    /// `wait` once its grid is ready.
    ///
    /// # Errors
    ///
    /// Invalid input fails immediately and nothing is queued.
    pub fn center_next(
        &mut self,
        center: Coordinate,
        zoom: u8,
        wait: Duration,
    ) -> Result<RequestId, TileError> {
        self.center_next_at(center, zoom, wait, Instant::now())
    }

    /// [`center_next`](Self::center_next) with an explicit creation time.
    pub fn center_next_at(
        &mut self,
        center: Coordinate,
        zoom: u8,
        wait: Duration,
        now: Instant,
    ) -> Result<RequestId, TileError> {
        let id = self.source.request_async(
            center.lon,
            center.lat,
            zoom,
            self.viewport,
            self.results_tx.clone(),
        )?;
        self.requests.insert(
            id,
            ViewRequest::new(id, center, zoom, wait, self.config.timeout, now),
        );
        debug!(request_id = id, zoom, queued = self.requests.len(), "View request queued");
        Ok(id)
    }

    /// Attaches a completed grid to its request.
    pub fn deliver(&mut self, loaded: GridLoaded) -> ResultDelivery {
        let Some(request) = self.requests.get_mut(&loaded.request_id) else {
            debug!(
                request_id = loaded.request_id,
                tile_set_id = loaded.tile_set_id,
                "Result for request no longer queued"
            );
            return ResultDelivery::UnknownRequest;
        };

        if !request.attach(loaded.tile_set_id) {
            return ResultDelivery::AlreadyResolved;
        }
        debug!(
            request_id = loaded.request_id,
            tile_set_id = loaded.tile_set_id,
            "View request ready"
        );
        ResultDelivery::Attached
    }

    /// Runs one control pass at the current time.
    pub fn control_pass(&mut self) -> ControlOutcome {
        self.control_pass_at(Instant::now())
    }

    /// Runs one control pass as if the current time were `now`.
    pub fn control_pass_at(&mut self, now: Instant) -> ControlOutcome {
        while let Ok(loaded) = self.results_rx.try_recv() {
            self.deliver(loaded);
        }

        let Some(mut head) = self.requests.first_entry() else {
            return ControlOutcome::Idle;
        };
        let id = *head.key();
        let request = head.get_mut();

        if request.timed_out(now) {
            head.remove();
            debug!(request_id = id, "View request timed out");
            return ControlOutcome::TimedOut(id);
        }

        match request.state() {
            ViewState::Pending => ControlOutcome::Waiting(id),
            ViewState::Ready { tile_set_id } => {
                match self.source.set_active_tile_set(tile_set_id) {
                    Ok(tile_set) => {
                        request.mark_displayed(now);
                        info!(request_id = id, tile_set_id, "View displayed");
                        ControlOutcome::Displayed {
                            request_id: id,
                            tile_set,
                        }
                    }
                    Err(e) => {
                        // Only reachable if a result was delivered by hand
                        // with an id this source never produced.
                        warn!(request_id = id, tile_set_id, error = %e, "Dropping view request");
                        head.remove();
                        ControlOutcome::Finished(id)
                    }
                }
            }
            ViewState::Displayed { .. } => {
                if request.display_elapsed(now) {
                    head.remove();
                    debug!(request_id = id, "View request finished");
                    ControlOutcome::Finished(id)
                } else {
                    ControlOutcome::Holding(id)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{CountingHttpClient, ProviderConfig};
    use crate::source::SourceConfig;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn queue(temp: &TempDir, timeout: Duration) -> ViewRequestQueue<CountingHttpClient> {
        let config = SourceConfig::new(temp.path(), ProviderConfig::osm_single("a"))
            .with_download_delay(Duration::ZERO);
        let source = TileSource::with_client(config, CountingHttpClient::new(Ok(vec![1]))).unwrap();
        ViewRequestQueue::new(
            source,
            QueueConfig::default().with_timeout(timeout),
            Viewport::uniform(128),
        )
    }

    /// Drains results until the request with `id` is ready.
    async fn wait_ready(queue: &mut ViewRequestQueue<CountingHttpClient>, id: RequestId) {
        for _ in 0..500 {
            while let Ok(loaded) = queue.results_rx.try_recv() {
                queue.deliver(loaded);
            }
            if matches!(queue.request(id).map(|r| r.state()), Some(ViewState::Ready { .. })) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("request {} never became ready", id);
    }

    /// Client whose downloads block until released.
    #[derive(Clone, Default)]
    struct HeldClient {
        open: Arc<(std::sync::Mutex<bool>, std::sync::Condvar)>,
    }

    impl HeldClient {
        fn release(&self) {
            let (open, cv) = &*self.open;
            *open.lock().unwrap() = true;
            cv.notify_all();
        }
    }

    impl HttpClient for HeldClient {
        fn get(&self, _url: &str) -> Result<Vec<u8>, crate::provider::ProviderError> {
            let (open, cv) = &*self.open;
            let mut released = open.lock().unwrap();
            while !*released {
                released = cv.wait(released).unwrap();
            }
            Ok(vec![1])
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_queue_is_idle() {
        let temp = TempDir::new().unwrap();
        let mut queue = queue(&temp, Duration::from_secs(1));
        assert_eq!(queue.control_pass(), ControlOutcome::Idle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_ready_request_displayed_then_finished() {
        let temp = TempDir::new().unwrap();
        let mut queue = queue(&temp, Duration::from_secs(1));
        let t0 = Instant::now();

        let id = queue
            .center_next_at(Coordinate::new(10.5, 50.0), 18, Duration::from_secs(2), t0)
            .unwrap();
        wait_ready(&mut queue, id).await;

        let shown = queue.control_pass_at(t0);
        match shown {
            ControlOutcome::Displayed { request_id, tile_set } => {
                assert_eq!(request_id, id);
                assert_eq!(queue.source().active_tile_set().unwrap().id(), tile_set.id());
            }
            other => panic!("expected Displayed, got {:?}", other),
        }

        assert_eq!(
            queue.control_pass_at(t0 + Duration::from_secs(1)),
            ControlOutcome::Holding(id)
        );
        assert_eq!(
            queue.control_pass_at(t0 + Duration::from_millis(2001)),
            ControlOutcome::Finished(id)
        );
        assert!(queue.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unknown_result_is_ignored() {
        let temp = TempDir::new().unwrap();
        let mut queue = queue(&temp, Duration::from_secs(1));

        let delivery = queue.deliver(GridLoaded {
            request_id: 99,
            tile_set_id: 0,
        });
        assert_eq!(delivery, ResultDelivery::UnknownRequest);
        assert_eq!(queue.control_pass(), ControlOutcome::Idle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_invalid_request_not_queued() {
        let temp = TempDir::new().unwrap();
        let mut queue = queue(&temp, Duration::from_secs(1));

        let err = queue
            .center_next(Coordinate::new(f64::NAN, 0.0), 3, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, TileError::InvalidInput(_)));
        assert!(queue.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_timeout_independent_of_wait() {
        let temp = TempDir::new().unwrap();
        let client = HeldClient::default();
        let config = SourceConfig::new(temp.path(), ProviderConfig::osm_single("a"))
            .with_download_delay(Duration::ZERO);
        let source = TileSource::with_client(config, client.clone()).unwrap();
        let mut queue = ViewRequestQueue::new(
            source,
            QueueConfig::default().with_timeout(Duration::from_secs(1)),
            Viewport::uniform(128),
        );
        let t0 = Instant::now();

        // A long wait does not extend how long the request may stay pending.
        let id = queue
            .center_next_at(Coordinate::new(0.0, 0.0), 2, Duration::from_secs(60), t0)
            .unwrap();
        assert_eq!(
            queue.control_pass_at(t0 + Duration::from_millis(999)),
            ControlOutcome::Waiting(id)
        );
        assert_eq!(
            queue.control_pass_at(t0 + Duration::from_millis(1001)),
            ControlOutcome::TimedOut(id)
        );
        assert!(queue.is_empty());

        client.release();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_duplicate_delivery() {
        let temp = TempDir::new().unwrap();
        let mut queue = queue(&temp, Duration::from_secs(1));
        let t0 = Instant::now();

        let id = queue
            .center_next_at(Coordinate::new(10.5, 50.0), 18, Duration::ZERO, t0)
            .unwrap();
        wait_ready(&mut queue, id).await;

        let again = queue.deliver(GridLoaded {
            request_id: id,
            tile_set_id: 0,
        });
        assert_eq!(again, ResultDelivery::AlreadyResolved);
    }
}
