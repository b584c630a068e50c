//! Frame timing and the self-rescheduling render loop

pub mod clock;
pub mod raf;
pub mod scheduler;

pub use clock::{FrameClock, FramePacer, UpdateGate, clamp_delta_ticks, FRAME_MS, MAX_DELTA_TICKS, MIN_DELTA_TICKS};
pub use raf::{RafHandle, RafScheduler};
pub use scheduler::{AnimationLoop, StepScheduler};
