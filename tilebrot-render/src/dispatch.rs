use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use tracing::{debug, warn};

use tilebrot_core::{Fractal, Viewport};

use crate::cancel::CycleToken;
use crate::error::RenderError;
use crate::palette::ColorLut;
use crate::tile::{Tile, TileGrid};

/// One evaluated pixel, moved from a worker to the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelResult {
    pub x: u32,
    pub y: u32,
    pub iterations: u32,
    pub color: [u8; 3],
}

/// Messages a tile job sends to the collector.
#[derive(Debug)]
pub enum WorkerMessage {
    /// One tile row worth of results.
    Pixels(Vec<PixelResult>),
    /// Tile `index` has sent all of its pixels.
    TileDone { index: usize },
    /// Tile `index` stopped early because a newer cycle started.
    Cancelled { index: usize },
    /// Tile `index` panicked.
    Failed { index: usize, reason: String },
}

enum TileOutcome {
    Done,
    Cancelled,
}

/// Fixed-size pool of render workers.
///
/// Tiles queue up inside the pool, so the number of tiles per frame is
/// independent of the number of threads evaluating them.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    pub fn new(workers: usize) -> crate::Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("tilebrot-worker-{i}"))
            .build()
            .map_err(|e| RenderError::ThreadPool(e.to_string()))?;
        debug!(workers = pool.current_num_threads(), "Worker pool ready");
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Queue one job per tile of `grid`.
    ///
    /// Every job owns its tile, a copy of `viewport` and clones of the shared
    /// read-only state. Results go to `sink`; this function returns as soon
    /// as the jobs are queued and drops its own `sink` handle, so the channel
    /// disconnects once the last job is gone.
    pub fn dispatch<F>(
        &self,
        grid: &TileGrid,
        fractal: &Arc<F>,
        viewport: Viewport,
        lut: &Arc<ColorLut>,
        token: &CycleToken,
        sink: Sender<WorkerMessage>,
    ) where
        F: Fractal + Send + Sync + 'static,
    {
        let (width, height) = (grid.width(), grid.height());
        for (index, &tile) in grid.tiles().iter().enumerate() {
            let fractal = Arc::clone(fractal);
            let lut = Arc::clone(lut);
            let token = token.clone();
            let sink = sink.clone();
            self.pool.spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    render_tile(&*fractal, &viewport, &lut, tile, width, height, &token, &sink)
                }));
                let msg = match outcome {
                    Ok(TileOutcome::Done) => {
                        token.tile_finished();
                        WorkerMessage::TileDone { index }
                    }
                    Ok(TileOutcome::Cancelled) => WorkerMessage::Cancelled { index },
                    Err(payload) => {
                        let reason = panic_message(payload.as_ref());
                        warn!(tile = index, %reason, "Tile job panicked");
                        WorkerMessage::Failed { index, reason }
                    }
                };
                // The collector may already have given up on this cycle.
                let _ = sink.send(msg);
            });
        }
    }
}

/// Evaluate and color every pixel of `tile`, one row per message.
#[allow(clippy::too_many_arguments)]
fn render_tile<F: Fractal>(
    fractal: &F,
    viewport: &Viewport,
    lut: &ColorLut,
    tile: Tile,
    width: u32,
    height: u32,
    token: &CycleToken,
    sink: &Sender<WorkerMessage>,
) -> TileOutcome {
    for py in tile.y_start..tile.y_end {
        if token.is_stale() {
            return TileOutcome::Cancelled;
        }
        let row = (tile.x_start..tile.x_end)
            .map(|px| {
                let iterations = fractal.evaluate_pixel(px, py, width, height, viewport);
                PixelResult {
                    x: px,
                    y: py,
                    iterations,
                    color: lut.color_of(iterations),
                }
            })
            .collect();
        if sink.send(WorkerMessage::Pixels(row)).is_err() {
            return TileOutcome::Cancelled;
        }
    }
    // A cancel that lands during the last row still abandons the tile.
    if token.is_stale() {
        return TileOutcome::Cancelled;
    }
    TileOutcome::Done
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
