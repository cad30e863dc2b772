use tracing::{debug, warn};

use crate::viewport::Viewport;

/// Maximum undo/redo history entries.
pub const MAX_HISTORY: usize = 200;

/// A discrete navigation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    ZoomIn,
    ZoomOut,
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    /// Return to the initial viewport.
    Reset,
}

/// Fixed deltas applied by [`Navigator::apply`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    /// Zoom multiplier for [`ViewEvent::ZoomIn`]; its inverse zooms out.
    pub zoom_factor: f64,
    /// Pan distance as a fraction of the current zoom.
    pub pan_fraction: f64,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            zoom_factor: 0.8,
            pan_fraction: 0.1,
        }
    }
}

/// Owns the live viewport and its back/forward history.
///
/// Every mutation goes through a validating [`Viewport`] constructor, so a
/// rejected event leaves the navigator exactly as it was.
#[derive(Debug, Clone)]
pub struct Navigator {
    initial: Viewport,
    settings: NavigationSettings,
    history: Vec<Viewport>,
    history_pos: usize,
}

impl Navigator {
    pub fn new(initial: Viewport, settings: NavigationSettings) -> Self {
        Self {
            initial,
            settings,
            history: vec![initial],
            history_pos: 0,
        }
    }

    /// The viewport the next render cycle should snapshot.
    pub fn current(&self) -> Viewport {
        self.history[self.history_pos]
    }

    pub fn settings(&self) -> NavigationSettings {
        self.settings
    }

    /// Apply `event` and return the new viewport.
    pub fn apply(&mut self, event: ViewEvent) -> crate::Result<Viewport> {
        let vp = self.current();
        let step = self.settings.pan_fraction * vp.zoom();
        let next = match event {
            ViewEvent::ZoomIn => vp.zoomed(self.settings.zoom_factor),
            ViewEvent::ZoomOut => vp.zoomed(1.0 / self.settings.zoom_factor),
            ViewEvent::PanUp => vp.panned(0.0, step),
            ViewEvent::PanDown => vp.panned(0.0, -step),
            ViewEvent::PanLeft => vp.panned(-step, 0.0),
            ViewEvent::PanRight => vp.panned(step, 0.0),
            ViewEvent::Reset => Ok(self.initial),
        };
        let next = match next {
            Ok(v) => v,
            Err(e) => {
                warn!(?event, "Rejected navigation event: {e}");
                return Err(e);
            }
        };
        debug!(
            ?event,
            offset_x = next.offset_x(),
            offset_y = next.offset_y(),
            zoom = next.zoom(),
            "Viewport changed"
        );
        self.push(next);
        Ok(next)
    }

    fn push(&mut self, viewport: Viewport) {
        self.history.truncate(self.history_pos + 1);
        self.history.push(viewport);
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
        self.history_pos = self.history.len() - 1;
    }

    /// Step back in history. Returns the restored viewport, if any.
    pub fn back(&mut self) -> Option<Viewport> {
        if self.history_pos == 0 {
            return None;
        }
        self.history_pos -= 1;
        Some(self.current())
    }

    /// Step forward in history. Returns the restored viewport, if any.
    pub fn forward(&mut self) -> Option<Viewport> {
        if self.history_pos + 1 >= self.history.len() {
            return None;
        }
        self.history_pos += 1;
        Some(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn nav() -> Navigator {
        Navigator::new(Viewport::default(), NavigationSettings::default())
    }

    #[test]
    fn zoom_in_then_out_round_trips() {
        let mut n = nav();
        let zin = n.apply(ViewEvent::ZoomIn).unwrap();
        assert!((zin.zoom() - 1.6).abs() < EPSILON);
        let zout = n.apply(ViewEvent::ZoomOut).unwrap();
        assert!((zout.zoom() - 2.0).abs() < EPSILON);
    }

    #[test]
    fn pans_move_by_fraction_of_zoom() {
        let mut n = nav();
        let up = n.apply(ViewEvent::PanUp).unwrap();
        assert!((up.offset_y() - 0.45).abs() < EPSILON);
        let right = n.apply(ViewEvent::PanRight).unwrap();
        assert!((right.offset_x() - (-0.55)).abs() < EPSILON);
        let down = n.apply(ViewEvent::PanDown).unwrap();
        assert!((down.offset_y() - 0.25).abs() < EPSILON);
        let left = n.apply(ViewEvent::PanLeft).unwrap();
        assert!((left.offset_x() - (-0.75)).abs() < EPSILON);
    }

    #[test]
    fn reset_restores_initial() {
        let mut n = nav();
        n.apply(ViewEvent::ZoomIn).unwrap();
        n.apply(ViewEvent::PanLeft).unwrap();
        assert_eq!(n.apply(ViewEvent::Reset).unwrap(), Viewport::default());
    }

    #[test]
    fn rejected_event_leaves_state_unchanged() {
        let settings = NavigationSettings {
            zoom_factor: 0.0,
            pan_fraction: 0.1,
        };
        let mut n = Navigator::new(Viewport::default(), settings);
        assert!(n.apply(ViewEvent::ZoomIn).is_err());
        assert_eq!(n.current(), Viewport::default());
        assert!(n.back().is_none());
    }

    #[test]
    fn back_and_forward_walk_history() {
        let mut n = nav();
        let a = n.apply(ViewEvent::ZoomIn).unwrap();
        let b = n.apply(ViewEvent::PanUp).unwrap();
        assert_eq!(n.back(), Some(a));
        assert_eq!(n.back(), Some(Viewport::default()));
        assert_eq!(n.back(), None);
        assert_eq!(n.forward(), Some(a));
        assert_eq!(n.forward(), Some(b));
        assert_eq!(n.forward(), None);
    }

    #[test]
    fn new_event_discards_redo_branch() {
        let mut n = nav();
        n.apply(ViewEvent::ZoomIn).unwrap();
        n.back();
        n.apply(ViewEvent::PanLeft).unwrap();
        assert_eq!(n.forward(), None);
    }

    #[test]
    fn history_is_bounded() {
        let mut n = nav();
        for _ in 0..MAX_HISTORY + 50 {
            n.apply(ViewEvent::PanRight).unwrap();
        }
        let mut steps = 0;
        while n.back().is_some() {
            steps += 1;
        }
        assert_eq!(steps, MAX_HISTORY - 1);
    }
}
