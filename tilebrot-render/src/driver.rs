use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::debug;

use tilebrot_core::{Fractal, Viewport};

use crate::cancel::RenderCancel;
use crate::error::RenderError;
use crate::renderer::{RenderResult, Renderer};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Whether a render cycle is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Idle,
    Recomputing,
}

impl RenderPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Recomputing => "Rendering\u{2026}",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderRequest {
    pub id: u64,
    pub viewport: Viewport,
}

#[derive(Debug)]
pub struct RenderResponse {
    pub id: u64,
    pub result: crate::Result<RenderResult>,
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Coordinating render thread with queue-and-coalesce semantics.
///
/// Each [`request`](Self::request) cancels the cycle in flight and queues
/// the new viewport. Before starting a cycle the render thread skips to the
/// newest queued request, so a burst of input produces one render. Only the
/// response to the newest request is ever handed out; responses to older
/// requests are dropped.
pub struct RenderDriver {
    tx_request: Option<mpsc::Sender<RenderRequest>>,
    rx_response: mpsc::Receiver<RenderResponse>,
    cancel: Arc<RenderCancel>,
    render_id: u64,
    phase: RenderPhase,
    worker: Option<JoinHandle<()>>,
}

impl RenderDriver {
    pub fn spawn<F>(renderer: Renderer<F>) -> crate::Result<Self>
    where
        F: Fractal + Send + Sync + 'static,
    {
        Self::spawn_with_notify(renderer, || {})
    }

    /// Like [`spawn`](Self::spawn), calling `notify` on the render thread
    /// after every response is sent (e.g. to wake a UI event loop).
    pub fn spawn_with_notify<F, N>(renderer: Renderer<F>, notify: N) -> crate::Result<Self>
    where
        F: Fractal + Send + Sync + 'static,
        N: Fn() + Send + 'static,
    {
        let cancel = renderer.cancel_handle();
        let (tx_request, rx_request) = mpsc::channel::<RenderRequest>();
        let (tx_response, rx_response) = mpsc::channel::<RenderResponse>();

        let worker = thread::Builder::new()
            .name("render-driver".into())
            .spawn(move || render_loop(renderer, rx_request, tx_response, notify))
            .map_err(|e| RenderError::ThreadPool(format!("render driver thread: {e}")))?;

        Ok(Self {
            tx_request: Some(tx_request),
            rx_response,
            cancel,
            render_id: 0,
            phase: RenderPhase::Idle,
            worker: Some(worker),
        })
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    /// Id of the newest request.
    pub fn latest_id(&self) -> u64 {
        self.render_id
    }

    /// `(done, total)` tiles of the cycle in flight.
    pub fn progress(&self) -> (usize, usize) {
        self.cancel.progress()
    }

    /// Supersede any in-flight cycle with a render of `viewport`.
    pub fn request(&mut self, viewport: Viewport) -> crate::Result<u64> {
        self.cancel.cancel();
        self.render_id += 1;
        debug!(
            id = self.render_id,
            zoom = viewport.zoom(),
            "Requesting render"
        );

        let tx = self.tx_request.as_ref().ok_or(RenderError::DriverStopped)?;
        tx.send(RenderRequest {
            id: self.render_id,
            viewport,
        })
        .map_err(|_| RenderError::DriverStopped)?;
        self.phase = RenderPhase::Recomputing;
        Ok(self.render_id)
    }

    /// Cancel the cycle in flight. Its response still arrives, as
    /// [`RenderError::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Non-blocking: the newest response if it has arrived.
    pub fn poll(&mut self) -> Option<RenderResponse> {
        let mut latest = None;
        loop {
            match self.rx_response.try_recv() {
                Ok(resp) => {
                    if let Some(resp) = self.accept(resp) {
                        latest = Some(resp);
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    if latest.is_none() && self.phase == RenderPhase::Recomputing {
                        latest = Some(self.stopped());
                    }
                    break;
                }
            }
        }
        latest
    }

    /// Block until the response to the newest request arrives.
    ///
    /// Returns `None` when nothing is pending.
    pub fn wait(&mut self) -> Option<RenderResponse> {
        while self.phase == RenderPhase::Recomputing {
            match self.rx_response.recv() {
                Ok(resp) => {
                    if let Some(resp) = self.accept(resp) {
                        return Some(resp);
                    }
                }
                Err(_) => return Some(self.stopped()),
            }
        }
        None
    }

    fn accept(&mut self, resp: RenderResponse) -> Option<RenderResponse> {
        if resp.id != self.render_id {
            debug!(id = resp.id, latest = self.render_id, "Dropping stale response");
            return None;
        }
        self.phase = RenderPhase::Idle;
        Some(resp)
    }

    fn stopped(&mut self) -> RenderResponse {
        self.phase = RenderPhase::Idle;
        RenderResponse {
            id: self.render_id,
            result: Err(RenderError::DriverStopped),
        }
    }
}

impl Drop for RenderDriver {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.tx_request.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

// ---------------------------------------------------------------------------
// Render thread
// ---------------------------------------------------------------------------

fn drain_latest(initial: RenderRequest, rx: &mpsc::Receiver<RenderRequest>) -> RenderRequest {
    let mut req = initial;
    while let Ok(newer) = rx.try_recv() {
        req = newer;
    }
    req
}

fn render_loop<F, N>(
    renderer: Renderer<F>,
    rx: mpsc::Receiver<RenderRequest>,
    tx: mpsc::Sender<RenderResponse>,
    notify: N,
) where
    F: Fractal + Send + Sync + 'static,
    N: Fn(),
{
    debug!("Render driver started");
    while let Ok(initial) = rx.recv() {
        let req = drain_latest(initial, &rx);
        if req.id != initial.id {
            debug!(skipped_to = req.id, from = initial.id, "Coalesced render requests");
        }
        let result = renderer.render(req.viewport);
        if tx.send(RenderResponse { id: req.id, result }).is_err() {
            break;
        }
        notify();
    }
    debug!("Render driver exiting");
}
