use std::time::Duration;

use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid tile grid: {tiles_x}×{tiles_y} (must be at least 1×1)")]
    InvalidTileGrid { tiles_x: u32, tiles_y: u32 },

    #[error("tile geometry mismatch: expected {expected} pixels, got {actual}")]
    GeometryMismatch { expected: usize, actual: usize },

    #[error("worker panicked while rendering tile {tile}: {reason}")]
    WorkerPanicked { tile: usize, reason: String },

    #[error("workers disconnected after {received} of {expected} pixels")]
    WorkerLost { received: usize, expected: usize },

    #[error("render cancelled")]
    Cancelled,

    #[error("render cycle exceeded {0:?}")]
    Timeout(Duration),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("render driver has stopped")]
    DriverStopped,

    #[error(transparent)]
    Core(#[from] tilebrot_core::CoreError),
}
