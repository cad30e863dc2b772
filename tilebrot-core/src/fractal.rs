use crate::complex::Complex;
use crate::viewport::Viewport;

/// Escape-time iteration model shared by the evaluator and the renderer.
///
/// Designed for **static dispatch**: the renderer is generic over
/// `F: Fractal` so the hot loop inlines. Implementations must be pure, since
/// the same value is read concurrently by every worker of a render cycle.
pub trait Fractal {
    /// Iteration cap; also the "did not escape" sentinel.
    fn max_iterations(&self) -> u32;

    /// Iteration count at which the orbit of `c` escapes, or exactly
    /// [`max_iterations`](Self::max_iterations) if it never does.
    fn escape_count(&self, c: Complex) -> u32;

    /// Map pixel `(px, py)` of a `width × height` frame through `viewport`
    /// and evaluate it.
    #[inline]
    fn evaluate_pixel(
        &self,
        px: u32,
        py: u32,
        width: u32,
        height: u32,
        viewport: &Viewport,
    ) -> u32 {
        self.escape_count(viewport.pixel_to_complex(px, py, width, height))
    }

    /// `true` when `iterations` is the inside-the-set sentinel.
    #[inline]
    fn is_inside(&self, iterations: u32) -> bool {
        iterations >= self.max_iterations()
    }
}
