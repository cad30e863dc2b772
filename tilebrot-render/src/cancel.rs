use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct CycleProgress {
    generation: u64,
    done: usize,
    total: usize,
}

/// Shared cancellation state of a renderer.
///
/// Bumping the generation makes every token taken before the bump stale.
/// Tile progress belongs to one generation: a tile finishing for an older
/// cycle is not counted against the current one.
#[derive(Debug, Default)]
pub struct RenderCancel {
    generation: AtomicU64,
    progress: Mutex<CycleProgress>,
}

impl RenderCancel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abandon the cycle in flight.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// `(done, total)` tiles of the most recently started cycle.
    pub fn progress(&self) -> (usize, usize) {
        let p = self.lock_progress();
        (p.done, p.total)
    }

    fn lock_progress(&self) -> MutexGuard<'_, CycleProgress> {
        // Progress is plain counters; a poisoned lock still holds usable data.
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The generation a render cycle started under.
///
/// Cloned into every tile job; a job whose token went stale stops at the next
/// row boundary.
#[derive(Debug, Clone)]
pub struct CycleToken {
    cancel: Arc<RenderCancel>,
    generation: u64,
}

impl CycleToken {
    /// Snapshot the current generation of `cancel`.
    pub fn begin(cancel: &Arc<RenderCancel>) -> Self {
        Self {
            cancel: Arc::clone(cancel),
            generation: cancel.generation(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` once a newer cycle has been requested.
    #[inline]
    pub fn is_stale(&self) -> bool {
        self.cancel.generation() != self.generation
    }

    /// Make this cycle the one reported by [`RenderCancel::progress`].
    pub(crate) fn start_progress(&self, total: usize) {
        *self.cancel.lock_progress() = CycleProgress {
            generation: self.generation,
            done: 0,
            total,
        };
    }

    /// Count one finished tile, unless a newer cycle owns the counter.
    pub(crate) fn tile_finished(&self) {
        let mut p = self.cancel.lock_progress();
        if p.generation == self.generation && p.done < p.total {
            p.done += 1;
        }
    }
}
