//! Display-frame scheduling seam.
//!
//! The controller never spins its own timer. When it has per-frame work
//! (coalesced preview recomputes, edge auto-scroll, copy-flash countdown) it
//! asks the host for a single callback on the next display refresh; the host
//! answers by calling [`crate::controller::GridInteraction::on_frame`].

/// Host hook for requesting one callback on the next display refresh.
/// `request_frame` between two refreshes is idempotent: at most one
/// callback results.
///
/// The controller only ever requests. A frame that outlives its gesture is
/// still delivered, does nothing, and is not re-requested; cancellation is
/// the host's affordance for tearing down a view while a callback is
/// pending.
pub trait FrameScheduler {
    fn request_frame(&mut self);

    /// Drop the pending callback, if any.
    fn cancel_frame(&mut self);
}

/// Scheduler for hosts that drive frames unconditionally (or tests that
/// call `on_frame` by hand).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopScheduler;

impl FrameScheduler for NoopScheduler {
    fn request_frame(&mut self) {}

    fn cancel_frame(&mut self) {}
}

/// Poll-style scheduler: the host checks and clears the flag once per
/// render pass.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    requested: bool,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Clear and return the pending request.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.requested = true;
    }

    fn cancel_frame(&mut self) {
        self.requested = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_take_clears_flag() {
        let mut scheduler = ManualScheduler::new();
        assert!(!scheduler.take());

        scheduler.request_frame();
        scheduler.request_frame();
        assert!(scheduler.is_requested());
        assert!(scheduler.take());
        assert!(!scheduler.take());

        scheduler.request_frame();
        scheduler.cancel_frame();
        assert!(!scheduler.is_requested());
    }
}
