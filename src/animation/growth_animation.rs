//! Tree growth reveal
//!
//! Reveals the tree from bare trunk to full canopy:
//! - a global progress scalar that only ever moves forward
//! - per-branch reveal staggered by generation order
//! - branch data is never touched, only how much of it is drawn

use super::easing::{Easing, ease};

/// Fraction of the overall progress each branch takes to fully appear
const STAGGER_WINDOW: f32 = 0.25;

/// Overall growth state
#[derive(Debug, Clone)]
pub struct GrowthAnimation {
    /// Overall progress (0.0 = bare, 1.0 = fully grown)
    progress: f32,
    /// Duration in milliseconds
    pub duration_ms: f32,
    elapsed_ms: f32,
    pub easing: Easing,
    playing: bool,
}

impl Default for GrowthAnimation {
    fn default() -> Self {
        Self {
            progress: 0.0,
            duration_ms: 4000.0,
            elapsed_ms: 0.0,
            easing: Easing::Organic,
            playing: false,
        }
    }
}

impl GrowthAnimation {
    /// Create a growth animation with the given duration
    pub fn new(duration_ms: f32) -> Self {
        Self {
            duration_ms,
            ..Default::default()
        }
    }

    /// Create a growth that is already complete
    pub fn instant() -> Self {
        Self {
            progress: 1.0,
            ..Default::default()
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn start(&mut self) {
        if !self.is_complete() {
            self.playing = true;
        }
    }

    /// Advance by `dt_ms` milliseconds
    pub fn update(&mut self, dt_ms: f32) {
        if !self.playing || !dt_ms.is_finite() || dt_ms <= 0.0 {
            return;
        }

        self.elapsed_ms += dt_ms;
        let raw = if self.duration_ms > 0.0 {
            self.elapsed_ms / self.duration_ms
        } else {
            1.0
        };
        self.progress = self.progress.max(raw.min(1.0));

        if self.progress >= 1.0 {
            self.progress = 1.0;
            self.playing = false;
        }
    }

    /// Jump to fully grown
    pub fn complete_instantly(&mut self) {
        self.progress = 1.0;
        self.elapsed_ms = self.duration_ms;
        self.playing = false;
    }

    /// Raw linear progress in [0, 1]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Progress after easing, the value branch reveal is based on
    pub fn eased_progress(&self) -> f32 {
        ease(self.progress, self.easing)
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Reveal fraction for the branch at `rank` among `count` branches
    pub fn branch_reveal(&self, rank: usize, count: usize) -> f32 {
        if self.is_complete() {
            return 1.0;
        }
        branch_reveal(rank, count, self.eased_progress())
    }
}

/// Visible fraction of the branch at `rank` (generation order) for a global
/// progress value. Earlier ranks start earlier; everything is at 1.0 when
/// `progress` is 1.0.
pub fn branch_reveal(rank: usize, count: usize, progress: f32) -> f32 {
    if count == 0 {
        return 1.0;
    }
    let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    let start = rank.min(count - 1) as f32 / count as f32 * (1.0 - STAGGER_WINDOW);
    ((progress - start) / STAGGER_WINDOW).clamp(0.0, 1.0)
}
