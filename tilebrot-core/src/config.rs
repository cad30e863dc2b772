use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::navigation::NavigationSettings;
use crate::viewport::Viewport;

/// Fixed render configuration.
///
/// Every field has a default, so a config file only needs to list the values
/// it overrides. Changing `width`, `height` or `max_iterations` requires
/// building a new renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Iteration cap and inside-the-set sentinel.
    pub max_iterations: u32,
    /// Tile columns.
    pub tiles_x: u32,
    /// Tile rows.
    pub tiles_y: u32,
    /// Worker threads; `0` uses all available CPUs.
    pub workers: usize,
    pub initial_viewport: Viewport,
    /// Fail a render cycle that takes longer than this.
    pub cycle_timeout_ms: Option<u64>,
    /// `zoom_factor` and `pan_fraction`, read as top-level keys.
    #[serde(flatten)]
    pub navigation: NavigationSettings,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 640,
            max_iterations: 128,
            tiles_x: 10,
            tiles_y: 10,
            workers: 0,
            initial_viewport: Viewport::default(),
            cycle_timeout_ms: None,
            navigation: NavigationSettings::default(),
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_iterations == 0 {
            return Err(CoreError::InvalidMaxIterations(self.max_iterations));
        }
        if self.tiles_x == 0 || self.tiles_y == 0 {
            return Err(CoreError::InvalidConfig {
                reason: format!(
                    "tile grid must be at least 1×1, got {}×{}",
                    self.tiles_x, self.tiles_y
                ),
            });
        }
        let zf = self.navigation.zoom_factor;
        if !(zf > 0.0 && zf < 1.0) {
            return Err(CoreError::InvalidConfig {
                reason: format!("zoom_factor must be in (0, 1), got {zf}"),
            });
        }
        let pf = self.navigation.pan_fraction;
        if pf <= 0.0 || !pf.is_finite() {
            return Err(CoreError::InvalidConfig {
                reason: format!("pan_fraction must be positive and finite, got {pf}"),
            });
        }
        if self.cycle_timeout_ms == Some(0) {
            return Err(CoreError::InvalidConfig {
                reason: "cycle_timeout_ms must be > 0 when set".into(),
            });
        }
        Ok(())
    }

    /// Worker count with `0` resolved to the available parallelism.
    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    pub fn cycle_timeout(&self) -> Option<Duration> {
        self.cycle_timeout_ms.map(Duration::from_millis)
    }
}
