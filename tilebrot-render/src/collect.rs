use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::buffer::{FrameBuffer, OPAQUE};
use crate::dispatch::{PixelResult, WorkerMessage};
use crate::error::RenderError;
use crate::iteration_buffer::IterationBuffer;
use crate::tile::TileGrid;

/// A fully assembled frame: every pixel slot has been written exactly once.
#[derive(Debug, Clone)]
pub struct AssembledFrame {
    pub frame: FrameBuffer,
    pub iterations: IterationBuffer,
}

/// Block until every pixel of `grid` has arrived on `rx`, assembling the
/// RGBA frame and iteration buffer as results come in.
///
/// The expected count is taken from `grid`, the same geometry the jobs were
/// dispatched from. The partial buffers are dropped on any error, so a caller
/// only ever sees a complete frame.
pub fn collect(
    rx: &Receiver<WorkerMessage>,
    grid: &TileGrid,
    max_iterations: u32,
    timeout: Option<Duration>,
) -> crate::Result<AssembledFrame> {
    let (width, height) = (grid.width(), grid.height());
    let expected = grid.pixel_count();
    let mut frame = FrameBuffer::new(width, height);
    let mut iterations = IterationBuffer::new(width, height, max_iterations);
    let deadline = timeout.map(|t| (Instant::now() + t, t));

    let mut received = 0usize;
    let mut tiles_done = 0usize;

    while received < expected || tiles_done < grid.len() {
        if tiles_done == grid.len() {
            // Every job finished yet pixels are missing.
            return Err(RenderError::GeometryMismatch {
                expected,
                actual: received,
            });
        }

        let msg = match deadline {
            Some((at, limit)) => {
                match rx.recv_timeout(at.saturating_duration_since(Instant::now())) {
                    Ok(msg) => msg,
                    Err(RecvTimeoutError::Timeout) => return Err(RenderError::Timeout(limit)),
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(RenderError::WorkerLost { received, expected })
                    }
                }
            }
            None => rx
                .recv()
                .map_err(|_| RenderError::WorkerLost { received, expected })?,
        };

        match msg {
            WorkerMessage::Pixels(batch) => {
                for result in batch {
                    write_pixel(&mut frame, &mut iterations, result, expected, received)?;
                    received += 1;
                }
            }
            WorkerMessage::TileDone { .. } => tiles_done += 1,
            WorkerMessage::Cancelled { index } => {
                debug!(tile = index, received, expected, "Cycle cancelled during collection");
                return Err(RenderError::Cancelled);
            }
            WorkerMessage::Failed { index, reason } => {
                return Err(RenderError::WorkerPanicked {
                    tile: index,
                    reason,
                })
            }
        }
    }

    Ok(AssembledFrame { frame, iterations })
}

/// Write one result, rejecting pixels outside the frame or written twice.
fn write_pixel(
    frame: &mut FrameBuffer,
    iterations: &mut IterationBuffer,
    result: PixelResult,
    expected: usize,
    received: usize,
) -> crate::Result<()> {
    let mismatch = RenderError::GeometryMismatch {
        expected,
        actual: received + 1,
    };
    if result.x >= frame.width || result.y >= frame.height {
        return Err(mismatch);
    }
    if frame.get(result.x, result.y)[3] == OPAQUE {
        return Err(mismatch);
    }
    frame.put(result.x, result.y, result.color);
    iterations.set(result.x, result.y, result.iterations);
    Ok(())
}
