//! Frame timing: delta ticks, clamping and the update divisor

/// Duration of one nominal 60 Hz frame in milliseconds
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// Smallest step ever handed to physics
pub const MIN_DELTA_TICKS: f32 = 0.05;

/// Largest step ever handed to physics, so a tab waking from the background
/// does not throw leaves across the screen
pub const MAX_DELTA_TICKS: f32 = 3.0;

/// Clamp a raw tick count into `[MIN_DELTA_TICKS, MAX_DELTA_TICKS]`.
/// Non-finite and non-positive values become the minimum.
pub fn clamp_delta_ticks(raw: f64) -> f32 {
    if !raw.is_finite() || raw <= 0.0 {
        log::trace!("degenerate frame delta {}, using minimum", raw);
        return MIN_DELTA_TICKS;
    }
    let ticks = raw as f32;
    if ticks > MAX_DELTA_TICKS {
        log::trace!("frame delta {:.2} ticks clamped", ticks);
        return MAX_DELTA_TICKS;
    }
    ticks.max(MIN_DELTA_TICKS)
}

/// Turns scheduler timestamps into delta ticks
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta ticks since the previous call. The first call primes the clock
    /// and reports one nominal frame.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last {
            Some(last) => clamp_delta_ticks((now_ms - last) / FRAME_MS),
            None => 1.0,
        };
        // A NaN timestamp must not poison the next delta
        if now_ms.is_finite() {
            self.last = Some(now_ms);
        }
        delta
    }

    /// Forget the last timestamp, e.g. after the loop was stopped
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn is_primed(&self) -> bool {
        self.last.is_some()
    }
}

/// Lets physics run on every n-th scheduling callback only
#[derive(Debug, Clone)]
pub struct UpdateGate {
    divisor: u32,
    callbacks: u64,
}

impl UpdateGate {
    pub fn new(divisor: u32) -> Self {
        Self {
            divisor: divisor.max(1),
            callbacks: 0,
        }
    }

    /// Count one callback; true when this one should step physics.
    /// Callback numbering starts at 1.
    pub fn should_step(&mut self) -> bool {
        self.callbacks += 1;
        self.callbacks % self.divisor as u64 == 0
    }

    pub fn set_divisor(&mut self, divisor: u32) {
        self.divisor = divisor.max(1);
    }

    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    pub fn callbacks(&self) -> u64 {
        self.callbacks
    }
}

impl Default for UpdateGate {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Gate and clock combined: feed every callback, get a delta on the ones
/// that step. Skipped callbacks do not advance the clock, so the next step
/// covers the whole gap.
#[derive(Debug, Clone, Default)]
pub struct FramePacer {
    pub gate: UpdateGate,
    pub clock: FrameClock,
}

impl FramePacer {
    pub fn new(divisor: u32) -> Self {
        Self {
            gate: UpdateGate::new(divisor),
            clock: FrameClock::new(),
        }
    }

    pub fn on_callback(&mut self, timestamp_ms: f64) -> Option<f32> {
        if self.gate.should_step() {
            Some(self.clock.tick(timestamp_ms))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_frame_is_one_tick() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1000.0), 1.0);
        assert!((clock.tick(1000.0 + FRAME_MS) - 1.0).abs() < 1e-5);
        assert!((clock.tick(1000.0 + 3.0 * FRAME_MS) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_deltas_clamped() {
        assert_eq!(clamp_delta_ticks(0.0), MIN_DELTA_TICKS);
        assert_eq!(clamp_delta_ticks(-4.0), MIN_DELTA_TICKS);
        assert_eq!(clamp_delta_ticks(f64::NAN), MIN_DELTA_TICKS);
        assert_eq!(clamp_delta_ticks(f64::INFINITY), MIN_DELTA_TICKS);
        assert_eq!(clamp_delta_ticks(0.01), MIN_DELTA_TICKS);
        assert_eq!(clamp_delta_ticks(1.5), 1.5);
    }

    #[test]
    fn test_resume_after_long_pause_is_clamped() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        // Ten seconds in a background tab
        assert_eq!(clock.tick(10_000.0), MAX_DELTA_TICKS);
    }

    #[test]
    fn test_backwards_time_is_minimum() {
        let mut clock = FrameClock::new();
        clock.tick(500.0);
        assert_eq!(clock.tick(400.0), MIN_DELTA_TICKS);
    }

    #[test]
    fn test_nan_timestamp_keeps_last() {
        let mut clock = FrameClock::new();
        clock.tick(100.0);
        assert_eq!(clock.tick(f64::NAN), MIN_DELTA_TICKS);
        assert!((clock.tick(100.0 + FRAME_MS) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_reset_reprimes() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        clock.reset();
        assert!(!clock.is_primed());
        assert_eq!(clock.tick(50_000.0), 1.0);
    }

    #[test]
    fn test_gate_divisor_two_steps_even_callbacks() {
        let mut gate = UpdateGate::new(2);
        let mut stepped = Vec::new();
        for _ in 0..6 {
            if gate.should_step() {
                stepped.push(gate.callbacks());
            }
        }
        assert_eq!(stepped, vec![2, 4, 6]);
    }

    #[test]
    fn test_gate_zero_divisor_is_one() {
        let mut gate = UpdateGate::new(0);
        assert_eq!(gate.divisor(), 1);
        assert!(gate.should_step());
        assert!(gate.should_step());
    }

    #[test]
    fn test_pacer_skipped_callbacks_leave_clock() {
        let mut pacer = FramePacer::new(2);
        let t = |n: u32| n as f64 * FRAME_MS;

        assert_eq!(pacer.on_callback(t(1)), None);
        assert!(!pacer.clock.is_primed());
        assert_eq!(pacer.on_callback(t(2)), Some(1.0));
        assert_eq!(pacer.on_callback(t(3)), None);
        // Covers callbacks 3 and 4
        let delta = pacer.on_callback(t(4)).unwrap();
        assert!((delta - 2.0).abs() < 1e-4);
    }
}
