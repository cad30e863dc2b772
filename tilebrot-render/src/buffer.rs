/// Alpha value written for every assembled pixel.
pub const OPAQUE: u8 = 0xff;

/// An RGBA pixel buffer representing one rendered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel, row-major order.
    pub pixels: Vec<u8>,
}

impl FrameBuffer {
    /// Create a zeroed buffer. Every alpha byte starts at 0, so an unwritten
    /// slot is distinguishable from an assembled one.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
        }
    }

    /// Byte offset of pixel `(x, y)`.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        4 * (x as usize + y as usize * self.width as usize)
    }

    /// Write an opaque pixel.
    #[inline]
    pub fn put(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let p = self.offset(x, y);
        self.pixels[p..p + 4].copy_from_slice(&[rgb[0], rgb[1], rgb[2], OPAQUE]);
    }

    /// RGBA of pixel `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        let p = self.offset(x, y);
        [
            self.pixels[p],
            self.pixels[p + 1],
            self.pixels[p + 2],
            self.pixels[p + 3],
        ]
    }

    /// `true` once every pixel has been written.
    pub fn is_complete(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == OPAQUE)
    }
}
