use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use tilebrot_core::{Fractal, Mandelbrot, RenderConfig, Viewport};

use crate::buffer::FrameBuffer;
use crate::cancel::{CycleToken, RenderCancel};
use crate::collect::{collect, AssembledFrame};
use crate::dispatch::WorkerPool;
use crate::error::RenderError;
use crate::iteration_buffer::IterationBuffer;
use crate::palette::ColorLut;
use crate::tile::partition;

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// The result of one complete render cycle.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub frame: FrameBuffer,
    pub iterations: IterationBuffer,
    /// The viewport snapshot this frame was computed from.
    pub viewport: Viewport,
    pub elapsed: Duration,
    pub tiles_rendered: usize,
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Runs full Partition → Dispatch → Collect cycles for a fixed frame size.
///
/// The renderer is generic over the fractal for static dispatch. The color
/// table is built once from the fractal's iteration cap and shared with every
/// job of every cycle.
pub struct Renderer<F = Mandelbrot> {
    fractal: Arc<F>,
    lut: Arc<ColorLut>,
    pool: WorkerPool,
    cancel: Arc<RenderCancel>,
    width: u32,
    height: u32,
    tiles_x: u32,
    tiles_y: u32,
    timeout: Option<Duration>,
}

impl Renderer<Mandelbrot> {
    /// Build a Mandelbrot renderer from a validated configuration.
    pub fn from_config(config: &RenderConfig) -> crate::Result<Self> {
        let fractal = Mandelbrot::new(config.max_iterations)?;
        Self::with_fractal(fractal, config)
    }
}

impl<F: Fractal + Send + Sync + 'static> Renderer<F> {
    /// Build a renderer for `fractal`. The iteration cap comes from the
    /// fractal; the geometry, worker count and timeout from `config`.
    pub fn with_fractal(fractal: F, config: &RenderConfig) -> crate::Result<Self> {
        config.validate()?;
        let lut = ColorLut::new(fractal.max_iterations())?;
        let pool = WorkerPool::new(config.resolved_workers())?;
        info!(
            width = config.width,
            height = config.height,
            tiles_x = config.tiles_x,
            tiles_y = config.tiles_y,
            workers = pool.workers(),
            max_iter = fractal.max_iterations(),
            "Renderer initialised"
        );
        Ok(Self {
            fractal: Arc::new(fractal),
            lut: Arc::new(lut),
            pool,
            cancel: Arc::new(RenderCancel::new()),
            width: config.width,
            height: config.height,
            tiles_x: config.tiles_x,
            tiles_y: config.tiles_y,
            timeout: config.cycle_timeout(),
        })
    }

    pub fn fractal(&self) -> &F {
        &self.fractal
    }

    pub fn lut(&self) -> &ColorLut {
        &self.lut
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// Shared handle for cancelling in-flight cycles from another thread.
    pub fn cancel_handle(&self) -> Arc<RenderCancel> {
        Arc::clone(&self.cancel)
    }

    /// Render one full frame of `viewport`, blocking until it is complete.
    ///
    /// Fails with [`RenderError::Cancelled`] if [`RenderCancel::cancel`] is
    /// called while the cycle is in flight.
    pub fn render(&self, viewport: Viewport) -> crate::Result<RenderResult> {
        let start = Instant::now();
        let token = CycleToken::begin(&self.cancel);

        let grid = partition(self.width, self.height, self.tiles_x, self.tiles_y)?;
        let tile_count = grid.len();
        token.start_progress(tile_count);
        debug!(
            generation = token.generation(),
            tile_count,
            expected_pixels = grid.pixel_count(),
            offset_x = viewport.offset_x(),
            offset_y = viewport.offset_y(),
            zoom = viewport.zoom(),
            "Starting tiled render"
        );

        let (tx, rx) = mpsc::channel();
        self.pool
            .dispatch(&grid, &self.fractal, viewport, &self.lut, &token, tx);

        let assembled = collect(&rx, &grid, self.fractal.max_iterations(), self.timeout);
        let elapsed = start.elapsed();

        match assembled {
            Ok(_) if token.is_stale() => {
                debug!(generation = token.generation(), "Render cancelled after assembly");
                Err(RenderError::Cancelled)
            }
            Ok(AssembledFrame { frame, iterations }) => {
                info!(
                    elapsed_ms = elapsed.as_millis(),
                    tiles_rendered = tile_count,
                    "Render complete"
                );
                Ok(RenderResult {
                    frame,
                    iterations,
                    viewport,
                    elapsed,
                    tiles_rendered: tile_count,
                })
            }
            Err(RenderError::Cancelled) => {
                debug!(generation = token.generation(), "Render cancelled");
                Err(RenderError::Cancelled)
            }
            Err(e) => {
                // Stop the remaining jobs of this cycle.
                self.cancel.cancel();
                warn!(elapsed_ms = elapsed.as_millis(), "Render failed: {e}");
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Single-threaded reference
// ---------------------------------------------------------------------------

/// Render a frame on the calling thread, pixel by pixel in row-major order.
///
/// Produces exactly what [`Renderer::render`] produces for the same inputs;
/// used as the reference the parallel path is checked against.
pub fn render_sequential<F: Fractal>(
    fractal: &F,
    lut: &ColorLut,
    viewport: &Viewport,
    width: u32,
    height: u32,
) -> RenderResult {
    let start = Instant::now();
    let mut frame = FrameBuffer::new(width, height);
    let mut iterations = IterationBuffer::new(width, height, fractal.max_iterations());
    for py in 0..height {
        for px in 0..width {
            let n = fractal.evaluate_pixel(px, py, width, height, viewport);
            frame.put(px, py, lut.color_of(n));
            iterations.set(px, py, n);
        }
    }
    RenderResult {
        frame,
        iterations,
        viewport: *viewport,
        elapsed: start.elapsed(),
        tiles_rendered: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilebrot_core::Complex;

    fn small_config() -> RenderConfig {
        RenderConfig {
            width: 96,
            height: 64,
            max_iterations: 64,
            tiles_x: 5,
            tiles_y: 3,
            workers: 2,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn basic_render_produces_complete_frame() {
        let renderer = Renderer::from_config(&small_config()).unwrap();
        let result = renderer.render(Viewport::default()).unwrap();

        assert_eq!(result.frame.pixels.len(), 96 * 64 * 4);
        assert_eq!(result.iterations.data.len(), 96 * 64);
        assert_eq!(result.tiles_rendered, 15);
        assert!(result.frame.is_complete());
        assert_eq!(renderer.cancel_handle().progress(), (15, 15));
    }

    #[test]
    fn parallel_matches_sequential() {
        let renderer = Renderer::from_config(&small_config()).unwrap();
        let vp = Viewport::new(-0.5, 0.1, 2.5).unwrap();
        let parallel = renderer.render(vp).unwrap();
        let reference = render_sequential(renderer.fractal(), renderer.lut(), &vp, 96, 64);
        assert_eq!(parallel.iterations, reference.iterations);
        assert_eq!(parallel.frame, reference.frame);
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = RenderConfig {
            tiles_x: 0,
            ..small_config()
        };
        assert!(Renderer::from_config(&cfg).is_err());
    }

    struct Exploding;

    impl Fractal for Exploding {
        fn max_iterations(&self) -> u32 {
            8
        }

        fn escape_count(&self, c: Complex) -> u32 {
            if c.re > 0.0 && c.im > 0.0 {
                panic!("exploded at {c:?}");
            }
            0
        }
    }

    #[test]
    fn panicking_worker_fails_cycle_instead_of_hanging() {
        let renderer = Renderer::with_fractal(Exploding, &small_config()).unwrap();
        let result = renderer.render(Viewport::new(0.0, 0.0, 2.0).unwrap());
        assert!(matches!(result, Err(RenderError::WorkerPanicked { .. })));

        // The pool survives and can render again.
        let ok = renderer.render(Viewport::new(-10.0, -10.0, 1.0).unwrap());
        assert!(ok.is_ok());
    }

    struct Slow;

    impl Fractal for Slow {
        fn max_iterations(&self) -> u32 {
            4
        }

        fn escape_count(&self, _c: Complex) -> u32 {
            std::thread::sleep(Duration::from_micros(200));
            0
        }
    }

    #[test]
    fn cancellation_stops_render() {
        let renderer = Renderer::with_fractal(Slow, &small_config()).unwrap();
        let cancel = renderer.cancel_handle();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            cancel.cancel();
        });

        let result = renderer.render(Viewport::default());
        assert!(matches!(result, Err(RenderError::Cancelled)));
    }

    struct VerySlow;

    impl Fractal for VerySlow {
        fn max_iterations(&self) -> u32 {
            4
        }

        fn escape_count(&self, _c: Complex) -> u32 {
            std::thread::sleep(Duration::from_millis(50));
            0
        }
    }

    #[test]
    fn cancel_inside_single_row_tile_fails_cycle() {
        let cfg = RenderConfig {
            width: 4,
            height: 1,
            tiles_x: 1,
            tiles_y: 1,
            workers: 2,
            ..RenderConfig::default()
        };
        let renderer = Renderer::with_fractal(VerySlow, &cfg).unwrap();
        let cancel = renderer.cancel_handle();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            cancel.cancel();
        });

        let stale = renderer.render(Viewport::default());
        canceller.join().unwrap();
        assert!(matches!(stale, Err(RenderError::Cancelled)));

        let fresh = renderer.render(Viewport::default());
        assert!(fresh.is_ok());
        assert_eq!(renderer.cancel_handle().progress(), (1, 1));
    }

    #[test]
    fn timeout_bounds_cycle_latency() {
        let cfg = RenderConfig {
            cycle_timeout_ms: Some(10),
            ..small_config()
        };
        let renderer = Renderer::with_fractal(Slow, &cfg).unwrap();
        let result = renderer.render(Viewport::default());
        assert!(matches!(result, Err(RenderError::Timeout(_))));
    }
}
