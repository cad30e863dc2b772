pub mod buffer;
pub mod cancel;
pub mod collect;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod explorer;
pub mod iteration_buffer;
pub mod palette;
pub mod renderer;
pub mod tile;

pub use buffer::FrameBuffer;
pub use cancel::{CycleToken, RenderCancel};
pub use collect::{collect, AssembledFrame};
pub use dispatch::{PixelResult, WorkerMessage, WorkerPool};
pub use driver::{RenderDriver, RenderPhase, RenderRequest, RenderResponse};
pub use error::RenderError;
pub use explorer::{Display, Explorer, FrameStats};
pub use iteration_buffer::IterationBuffer;
pub use palette::{ColorLut, INSIDE_COLOR};
pub use renderer::{render_sequential, RenderResult, Renderer};
pub use tile::{partition, Tile, TileGrid};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
