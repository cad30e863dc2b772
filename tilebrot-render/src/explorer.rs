use std::time::Duration;

use tracing::warn;

use tilebrot_core::{Navigator, ViewEvent, Viewport};

use crate::buffer::FrameBuffer;
use crate::driver::{RenderDriver, RenderPhase, RenderResponse};

/// Receives completed frames.
///
/// The frame is moved in: once presented, nothing else holds or writes it.
pub trait Display {
    fn present(&mut self, frame: FrameBuffer);
}

/// Summary of a presented frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub id: u64,
    pub viewport: Viewport,
    pub elapsed: Duration,
    pub tiles_rendered: usize,
    pub inside_pixels: usize,
}

/// Ties navigation input, the render driver and a display together.
///
/// Input events update the [`Navigator`] and request a render of the new
/// viewport; [`pump`](Self::pump) or [`settle`](Self::settle) hand finished
/// frames to the display.
pub struct Explorer<D> {
    navigator: Navigator,
    driver: RenderDriver,
    display: D,
    last_stats: Option<FrameStats>,
}

impl<D: Display> Explorer<D> {
    pub fn new(navigator: Navigator, driver: RenderDriver, display: D) -> Self {
        Self {
            navigator,
            driver,
            display,
            last_stats: None,
        }
    }

    /// Request a render of the current viewport without navigating.
    pub fn refresh(&mut self) -> crate::Result<u64> {
        self.driver.request(self.navigator.current())
    }

    /// Apply `event` and request a render of the resulting viewport.
    ///
    /// A rejected event leaves both the viewport and the displayed frame
    /// untouched.
    pub fn handle(&mut self, event: ViewEvent) -> crate::Result<u64> {
        let viewport = self.navigator.apply(event)?;
        self.driver.request(viewport)
    }

    /// Step back in view history. `Ok(None)` when already at the oldest view.
    pub fn back(&mut self) -> crate::Result<Option<u64>> {
        match self.navigator.back() {
            Some(vp) => self.driver.request(vp).map(Some),
            None => Ok(None),
        }
    }

    /// Step forward in view history. `Ok(None)` when already at the newest view.
    pub fn forward(&mut self) -> crate::Result<Option<u64>> {
        match self.navigator.forward() {
            Some(vp) => self.driver.request(vp).map(Some),
            None => Ok(None),
        }
    }

    /// Abandon the cycle in flight; its frame is never presented.
    pub fn cancel(&self) {
        self.driver.cancel();
    }

    /// Present the newest frame if it is ready. Never blocks.
    pub fn pump(&mut self) -> Option<crate::Result<FrameStats>> {
        let resp = self.driver.poll()?;
        Some(self.deliver(resp))
    }

    /// Block until the newest requested frame is presented.
    pub fn settle(&mut self) -> Option<crate::Result<FrameStats>> {
        let resp = self.driver.wait()?;
        Some(self.deliver(resp))
    }

    fn deliver(&mut self, resp: RenderResponse) -> crate::Result<FrameStats> {
        let id = resp.id;
        let result = resp.result.inspect_err(|e| {
            warn!(id, "Frame not presented: {e}");
        })?;
        let stats = FrameStats {
            id,
            viewport: result.viewport,
            elapsed: result.elapsed,
            tiles_rendered: result.tiles_rendered,
            inside_pixels: result.iterations.inside_count(),
        };
        self.display.present(result.frame);
        self.last_stats = Some(stats);
        Ok(stats)
    }

    pub fn viewport(&self) -> Viewport {
        self.navigator.current()
    }

    pub fn phase(&self) -> RenderPhase {
        self.driver.phase()
    }

    pub fn progress(&self) -> (usize, usize) {
        self.driver.progress()
    }

    pub fn last_stats(&self) -> Option<FrameStats> {
        self.last_stats
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}

#[cfg(test)]
mod tests {
    use tilebrot_core::{NavigationSettings, RenderConfig};

    use super::*;
    use crate::renderer::Renderer;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<FrameBuffer>,
    }

    impl Display for Recorder {
        fn present(&mut self, frame: FrameBuffer) {
            self.frames.push(frame);
        }
    }

    fn explorer() -> Explorer<Recorder> {
        let cfg = RenderConfig {
            width: 48,
            height: 48,
            max_iterations: 48,
            tiles_x: 3,
            tiles_y: 3,
            workers: 2,
            ..RenderConfig::default()
        };
        let driver = RenderDriver::spawn(Renderer::from_config(&cfg).unwrap()).unwrap();
        let navigator = Navigator::new(cfg.initial_viewport, cfg.navigation);
        Explorer::new(navigator, driver, Recorder::default())
    }

    #[test]
    fn event_triggers_presented_frame() {
        let mut ex = explorer();
        ex.refresh().unwrap();
        let first = ex.settle().unwrap().unwrap();
        assert_eq!(first.viewport, Viewport::default());

        ex.handle(ViewEvent::ZoomIn).unwrap();
        let second = ex.settle().unwrap().unwrap();
        assert!(second.viewport.zoom() < first.viewport.zoom());
        assert_eq!(ex.display().frames.len(), 2);
        assert!(ex.display().frames.iter().all(FrameBuffer::is_complete));
        assert_eq!(ex.phase(), RenderPhase::Idle);
        assert_eq!(ex.last_stats(), Some(second));
    }

    #[test]
    fn back_re_renders_identical_frame() {
        let mut ex = explorer();
        ex.refresh().unwrap();
        ex.settle().unwrap().unwrap();
        ex.handle(ViewEvent::PanLeft).unwrap();
        ex.settle().unwrap().unwrap();
        assert!(ex.back().unwrap().is_some());
        ex.settle().unwrap().unwrap();

        let frames = &ex.display().frames;
        assert_eq!(frames[0], frames[2]);
        assert_ne!(frames[0], frames[1]);
        assert!(ex.back().unwrap().is_none());
    }

    #[test]
    fn rejected_event_requests_nothing() {
        let cfg = RenderConfig {
            width: 16,
            height: 16,
            workers: 1,
            ..RenderConfig::default()
        };
        let driver = RenderDriver::spawn(Renderer::from_config(&cfg).unwrap()).unwrap();
        let settings = NavigationSettings {
            zoom_factor: 0.0,
            pan_fraction: 0.1,
        };
        let mut ex = Explorer::new(
            Navigator::new(Viewport::default(), settings),
            driver,
            Recorder::default(),
        );
        assert!(ex.handle(ViewEvent::ZoomIn).is_err());
        assert_eq!(ex.phase(), RenderPhase::Idle);
        assert!(ex.settle().is_none());
        assert!(ex.display().frames.is_empty());
    }
}
