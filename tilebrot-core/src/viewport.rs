use crate::complex::Complex;
use crate::error::CoreError;

/// Defines the visible region of the complex plane.
///
/// `zoom` is the side length of the visible square region, centred on
/// `(offset_x, offset_y)`. Both axes span `zoom` units regardless of the
/// frame's pixel dimensions.
///
/// A `Viewport` is a plain `Copy` value: every render cycle captures its own
/// snapshot, so navigation can never be observed half-applied by a worker.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Viewport {
    offset_x: f64,
    offset_y: f64,
    zoom: f64,
}

/// Deserialize through the validating constructor so a config file can never
/// smuggle in a non-positive zoom.
impl<'de> serde::Deserialize<'de> for Viewport {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            offset_x: f64,
            offset_y: f64,
            zoom: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.offset_x, raw.offset_y, raw.zoom).map_err(serde::de::Error::custom)
    }
}

impl Viewport {
    pub const DEFAULT_OFFSET_X: f64 = -0.75;
    pub const DEFAULT_OFFSET_Y: f64 = 0.25;
    pub const DEFAULT_ZOOM: f64 = 2.0;

    /// Create a viewport, rejecting non-finite offsets and non-positive zoom.
    pub fn new(offset_x: f64, offset_y: f64, zoom: f64) -> crate::Result<Self> {
        if !offset_x.is_finite() || !offset_y.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("offset must be finite, got ({offset_x}, {offset_y})"),
            });
        }
        if zoom <= 0.0 || !zoom.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("zoom must be positive and finite, got {zoom}"),
            });
        }
        Ok(Self {
            offset_x,
            offset_y,
            zoom,
        })
    }

    #[inline]
    pub fn offset_x(&self) -> f64 {
        self.offset_x
    }

    #[inline]
    pub fn offset_y(&self) -> f64 {
        self.offset_y
    }

    #[inline]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Map a pixel coordinate of a `width × height` frame to the complex plane.
    ///
    /// `(0, 0)` is the top-left pixel. Pixel rows grow downward while the
    /// imaginary axis grows upward, hence the `height - py` flip.
    #[inline]
    pub fn pixel_to_complex(&self, px: u32, py: u32, width: u32, height: u32) -> Complex {
        let w = width as f64;
        let h = height as f64;
        let half = self.zoom / 2.0;
        Complex::new(
            px as f64 * self.zoom / w - half + self.offset_x,
            (h - py as f64) * self.zoom / h - half + self.offset_y,
        )
    }

    /// Return a copy with the zoom multiplied by `factor`.
    pub fn zoomed(&self, factor: f64) -> crate::Result<Self> {
        Self::new(self.offset_x, self.offset_y, self.zoom * factor)
    }

    /// Return a copy with the offset moved by `(dx, dy)` plane units.
    pub fn panned(&self, dx: f64, dy: f64) -> crate::Result<Self> {
        Self::new(self.offset_x + dx, self.offset_y + dy, self.zoom)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: Self::DEFAULT_OFFSET_X,
            offset_y: Self::DEFAULT_OFFSET_Y,
            zoom: Self::DEFAULT_ZOOM,
        }
    }
}
