pub mod complex;
pub mod config;
pub mod error;
pub mod fractal;
pub mod mandelbrot;
pub mod navigation;
pub mod viewport;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use config::RenderConfig;
pub use error::CoreError;
pub use fractal::Fractal;
pub use mandelbrot::{escape_count, evaluate, Mandelbrot};
pub use navigation::{NavigationSettings, Navigator, ViewEvent};
pub use viewport::Viewport;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
