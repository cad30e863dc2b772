use tilebrot_core::CoreError;

/// Color used for points that never escape.
pub const INSIDE_COLOR: [u8; 3] = [0xff, 0xff, 0xff];

/// Peak intensity of the escape ramp.
const RAMP_PEAK: f64 = 128.0;

/// Precomputed intensity ramp for one iteration cap.
///
/// `table[i] = √(i / max_iterations) · 128`, which spreads the low iteration
/// counts (the bulk of the visible exterior) over most of the ramp. Built once
/// per configuration and shared read-only by all workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorLut {
    max_iterations: u32,
    table: Vec<u8>,
}

impl ColorLut {
    pub fn new(max_iterations: u32) -> crate::Result<Self> {
        if max_iterations == 0 {
            return Err(CoreError::InvalidMaxIterations(max_iterations).into());
        }
        let n = max_iterations as f64;
        let table = (0..max_iterations)
            .map(|i| ((i as f64 / n).sqrt() * RAMP_PEAK) as u8)
            .collect();
        Ok(Self {
            max_iterations,
            table,
        })
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Ramp intensity for an escaped point. Counts at or past the cap
    /// saturate to the last entry.
    #[inline]
    pub fn intensity(&self, iterations: u32) -> u8 {
        let idx = (iterations as usize).min(self.table.len() - 1);
        self.table[idx]
    }

    /// Map an iteration count to RGB: white inside, grayscale ramp outside.
    #[inline]
    pub fn color_of(&self, iterations: u32) -> [u8; 3] {
        if iterations >= self.max_iterations {
            return INSIDE_COLOR;
        }
        let c = self.table[iterations as usize];
        [c, c, c]
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
