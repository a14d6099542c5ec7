//! Progress reporting and cancellation support.
//!
//! [`CancellationToken`] lets an interrupt handler stop a run cooperatively;
//! detection checks it before every packet and extraction before every
//! frame. [`ProgressCallback`] receives one [`ProgressInfo`] per processed
//! scene.
//!
//! # Example
//!
//! ```
//! use scenegrab::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let handler_token = token.clone();
//! // e.g. from a Ctrl-C handler:
//! handler_token.cancel();
//! assert!(token.is_cancelled());
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

/// A snapshot of run progress, emitted after each scene.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Scenes processed so far, including the current one.
    pub scenes_done: u64,
    /// Total scenes detected.
    pub scenes_total: u64,
    /// Frames written so far.
    pub frames_written: u64,
    /// Wall-clock time since extraction started.
    pub elapsed: Duration,
}

impl ProgressInfo {
    /// Completion percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f32 {
        if self.scenes_total == 0 {
            100.0
        } else {
            self.scenes_done as f32 / self.scenes_total as f32 * 100.0
        }
    }
}

/// Receives progress updates during a run.
///
/// Callbacks observe but cannot halt the run; use [`CancellationToken`]
/// for that.
pub trait ProgressCallback {
    /// Called once before the first scene with the total scene count.
    fn on_start(&self, _scenes_total: u64) {}

    /// Called after every scene.
    fn on_progress(&self, info: &ProgressInfo);

    /// Called once after the last scene.
    fn on_finish(&self) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clones share state, so a clone can be moved into a signal handler.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
