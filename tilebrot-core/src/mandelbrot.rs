use crate::complex::Complex;
use crate::error::CoreError;
use crate::fractal::Fractal;
use crate::viewport::Viewport;

/// Squared bailout radius: an orbit with `|z|² > 4` has escaped.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// The Mandelbrot set: `z_{n+1} = z_n² + c`, starting from `z₀ = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mandelbrot {
    max_iterations: u32,
}

impl Mandelbrot {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 128;

    pub fn new(max_iterations: u32) -> crate::Result<Self> {
        if max_iterations < 1 {
            return Err(CoreError::InvalidMaxIterations(max_iterations));
        }
        Ok(Self { max_iterations })
    }
}

impl Default for Mandelbrot {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Fractal for Mandelbrot {
    #[inline]
    fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    #[inline]
    fn escape_count(&self, c: Complex) -> u32 {
        escape_count(c, self.max_iterations)
    }
}

/// Count iterations of `z ← z² + c` until `|z|² > 4`.
///
/// Returns the zero-based step at which the orbit escaped, or
/// `max_iterations` when it stayed bounded for the whole budget.
#[inline]
pub fn escape_count(c: Complex, max_iterations: u32) -> u32 {
    let mut z = Complex::ZERO;
    for n in 0..max_iterations {
        z = z.square() + c;
        if z.norm_sq() > ESCAPE_RADIUS_SQ {
            return n;
        }
    }
    max_iterations
}

/// Evaluate a single pixel of a `width × height` frame.
///
/// Free-standing form of [`Fractal::evaluate_pixel`] for callers that only
/// have an iteration cap at hand.
#[inline]
pub fn evaluate(
    px: u32,
    py: u32,
    width: u32,
    height: u32,
    viewport: &Viewport,
    max_iterations: u32,
) -> u32 {
    escape_count(viewport.pixel_to_complex(px, py, width, height), max_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mb() -> Mandelbrot {
        Mandelbrot::default()
    }

    #[test]
    fn origin_is_inside() {
        assert_eq!(mb().escape_count(Complex::ZERO), Mandelbrot::DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn far_point_escapes_immediately() {
        assert_eq!(mb().escape_count(Complex::new(2.0, 2.0)), 0);
        assert_eq!(mb().escape_count(Complex::new(10.0, 0.0)), 0);
    }

    #[test]
    fn known_escape_count() {
        // c = 1: z₁ = 1, z₂ = 2 (|z|² = 4, not > 4), z₃ = 5 -> escapes at n = 2.
        assert_eq!(mb().escape_count(Complex::new(1.0, 0.0)), 2);
    }

    #[test]
    fn minus_one_is_periodic_and_inside() {
        assert_eq!(mb().escape_count(Complex::new(-1.0, 0.0)), 128);
    }

    #[test]
    fn result_never_exceeds_cap() {
        let m = Mandelbrot::new(16).unwrap();
        for i in 0..50 {
            let c = Complex::new(-2.0 + i as f64 * 0.05, 0.3);
            assert!(m.escape_count(c) <= 16);
        }
    }

    #[test]
    fn zero_iterations_rejected() {
        assert!(Mandelbrot::new(0).is_err());
        assert!(Mandelbrot::new(1).is_ok());
    }

    #[test]
    fn viewport_center_with_zero_offset_is_inside() {
        let vp = Viewport::new(0.0, 0.0, 4.0).unwrap();
        assert_eq!(evaluate(50, 50, 100, 100, &vp, 64), 64);
    }

    #[test]
    fn mapped_divergent_point_escapes() {
        // Offset the viewport so its centre pixel maps to 2 + 2i.
        let vp = Viewport::new(2.0, 2.0, 1.0).unwrap();
        assert!(evaluate(50, 50, 100, 100, &vp, 64) < 64);
    }

    #[test]
    fn free_function_matches_trait() {
        let m = mb();
        let vp = Viewport::default();
        for (px, py) in [(0, 0), (17, 200), (320, 320), (639, 639)] {
            assert_eq!(
                m.evaluate_pixel(px, py, 640, 640, &vp),
                evaluate(px, py, 640, 640, &vp, m.max_iterations())
            );
        }
    }

    #[test]
    fn deterministic_results() {
        let m = mb();
        let points = [
            Complex::new(0.0, 0.0),
            Complex::new(-0.75, 0.1),
            Complex::new(0.3, 0.5),
            Complex::new(-2.0, 0.0),
            Complex::new(1.0, 1.0),
        ];
        let run1: Vec<_> = points.iter().map(|&c| m.escape_count(c)).collect();
        let run2: Vec<_> = points.iter().map(|&c| m.escape_count(c)).collect();
        assert_eq!(run1, run2);
    }
}
