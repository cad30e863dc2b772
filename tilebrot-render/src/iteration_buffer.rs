/// Stores per-pixel iteration counts for a full frame.
///
/// Assembled alongside the RGBA frame so callers can inspect the raw
/// escape data (statistics, cross-checks) without reversing the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationBuffer {
    pub width: u32,
    pub height: u32,
    pub max_iterations: u32,
    pub data: Vec<u32>,
}

impl IterationBuffer {
    pub fn new(width: u32, height: u32, max_iterations: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            max_iterations,
            data: vec![0; size],
        }
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, iterations: u32) {
        let idx = y as usize * self.width as usize + x as usize;
        self.data[idx] = iterations;
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Number of pixels that never escaped.
    pub fn inside_count(&self) -> usize {
        self.data
            .iter()
            .filter(|&&n| n >= self.max_iterations)
            .count()
    }
}
