//! Self-rescheduling step loop over a host scheduling primitive

/// A "call me once before the next repaint" primitive
pub trait StepScheduler {
    type Handle: Copy + std::fmt::Debug;

    /// Ask for one more callback
    fn request_step(&mut self) -> Self::Handle;

    /// Withdraw a pending request
    fn cancel_step(&mut self, handle: Self::Handle);
}

/// Keeps exactly one request outstanding while running.
///
/// The host calls [`AnimationLoop::on_step`] from its callback; the loop runs
/// the step and books the next callback. [`AnimationLoop::cancel`] withdraws
/// the pending request and nothing is booked after that.
#[derive(Debug)]
pub struct AnimationLoop<S: StepScheduler> {
    scheduler: S,
    pending: Option<S::Handle>,
    running: bool,
}

impl<S: StepScheduler> AnimationLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            pending: None,
            running: false,
        }
    }

    /// Book the first callback. No-op when already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.pending = Some(self.scheduler.request_step());
    }

    /// Run `step` for a delivered callback and book the next one.
    /// Returns None without running `step` if the loop was cancelled.
    pub fn on_step<R>(&mut self, step: impl FnOnce() -> R) -> Option<R> {
        self.pending = None;
        if !self.running {
            return None;
        }
        let result = step();
        if self.running {
            self.pending = Some(self.scheduler.request_step());
        }
        Some(result)
    }

    pub fn cancel(&mut self) {
        self.running = false;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_step(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<S: StepScheduler> Drop for AnimationLoop<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::clock::{FramePacer, FRAME_MS};

    /// Scheduler that only records what was asked of it
    #[derive(Debug, Default)]
    struct RecordingScheduler {
        next: u32,
        requested: Vec<u32>,
        cancelled: Vec<u32>,
    }

    impl StepScheduler for RecordingScheduler {
        type Handle = u32;

        fn request_step(&mut self) -> u32 {
            self.next += 1;
            self.requested.push(self.next);
            self.next
        }

        fn cancel_step(&mut self, handle: u32) {
            self.cancelled.push(handle);
        }
    }

    #[test]
    fn test_start_requests_once() {
        let mut frame_loop = AnimationLoop::new(RecordingScheduler::default());
        frame_loop.start();
        frame_loop.start();
        assert_eq!(frame_loop.scheduler().requested, vec![1]);
        assert!(frame_loop.is_running());
    }

    #[test]
    fn test_each_step_reschedules() {
        let mut frame_loop = AnimationLoop::new(RecordingScheduler::default());
        frame_loop.start();
        for _ in 0..3 {
            assert_eq!(frame_loop.on_step(|| 7), Some(7));
        }
        assert_eq!(frame_loop.scheduler().requested, vec![1, 2, 3, 4]);
        assert!(frame_loop.has_pending());
    }

    #[test]
    fn test_cancel_stops_scheduling() {
        let mut frame_loop = AnimationLoop::new(RecordingScheduler::default());
        frame_loop.start();
        frame_loop.on_step(|| ());
        frame_loop.cancel();

        assert_eq!(frame_loop.scheduler().cancelled, vec![2]);
        // A callback already in flight must not run or book another
        let mut ran = false;
        assert_eq!(frame_loop.on_step(|| ran = true), None);
        assert!(!ran);
        assert_eq!(frame_loop.scheduler().requested, vec![1, 2]);
        assert!(!frame_loop.is_running());
    }

    #[test]
    fn test_restart_after_cancel() {
        let mut frame_loop = AnimationLoop::new(RecordingScheduler::default());
        frame_loop.start();
        frame_loop.cancel();
        frame_loop.start();
        assert!(frame_loop.is_running());
        assert_eq!(frame_loop.scheduler().requested, vec![1, 2]);
    }

    #[test]
    fn test_divisor_two_steps_on_even_callbacks() {
        let mut frame_loop = AnimationLoop::new(RecordingScheduler::default());
        let mut pacer = FramePacer::new(2);
        let mut stepped_on = Vec::new();

        frame_loop.start();
        for callback in 1..=6u32 {
            let ts = callback as f64 * FRAME_MS;
            let stepped = frame_loop.on_step(|| pacer.on_callback(ts).is_some());
            if stepped == Some(true) {
                stepped_on.push(callback);
            }
        }
        assert_eq!(stepped_on, vec![2, 4, 6]);
        assert_eq!(frame_loop.scheduler().requested.len(), 7);
    }
}
