use crate::growth::BranchId;
use crate::math::Vec2;
use super::palette::PaletteColor;

/// Lifecycle state of a leaf. `Falling` is terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LeafState {
    /// Hanging from a branch and swaying around `anchor`
    Attached {
        branch: BranchId,
        anchor: Vec2,
        /// Rotation the sway oscillates around
        rest_rotation: f32,
    },
    /// Free fall under wind and gravity
    Falling,
}

/// A single simulated leaf
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    /// Unique for the lifetime of the population, also seeds per-leaf phase
    pub id: u64,
    /// Viewport percent; may leave [0, 100] before retirement
    pub position: Vec2,
    /// Viewport percent per tick
    pub velocity: Vec2,
    /// Degrees, unbounded
    pub rotation: f32,
    /// Degrees per tick before damping
    pub rotation_speed: f32,
    pub scale: f32,
    pub color: PaletteColor,
    /// In [0, 1]; only ever decreases
    pub opacity: f32,
    /// Phase offset in [0, 2π) for wind and sway
    pub swing_phase: f32,
    /// Sway amplitude while attached, viewport percent
    pub sway_amplitude: f32,
    /// Remaining ticks of life once falling; None never expires
    pub life_time: Option<f32>,
    /// Per-tick probability of letting go while attached
    pub detachment_chance: f32,
    state: LeafState,
}

impl Leaf {
    /// A leaf already in free fall with neutral attributes
    pub fn falling(id: u64, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            position,
            velocity,
            rotation: 0.0,
            rotation_speed: 0.0,
            scale: 1.0,
            color: PaletteColor::default(),
            opacity: 1.0,
            swing_phase: 0.0,
            sway_amplitude: 0.0,
            life_time: None,
            detachment_chance: 0.0,
            state: LeafState::Falling,
        }
    }

    /// A leaf hanging from `branch` at `anchor`
    pub fn attached(id: u64, branch: BranchId, anchor: Vec2, rotation: f32) -> Self {
        Self {
            state: LeafState::Attached {
                branch,
                anchor,
                rest_rotation: rotation,
            },
            rotation,
            ..Self::falling(id, anchor, Vec2::ZERO)
        }
    }

    pub fn state(&self) -> LeafState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, LeafState::Attached { .. })
    }

    pub fn attached_branch(&self) -> Option<BranchId> {
        match self.state {
            LeafState::Attached { branch, .. } => Some(branch),
            LeafState::Falling => None,
        }
    }

    /// Let go of the branch. There is no way back to `Attached`.
    pub fn detach(&mut self, initial_velocity: Vec2) {
        if self.is_attached() {
            self.state = LeafState::Falling;
            self.velocity = initial_velocity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attached_leaf() {
        let leaf = Leaf::attached(3, BranchId(7), Vec2::new(40.0, 30.0), 12.0);
        assert!(leaf.is_attached());
        assert_eq!(leaf.attached_branch(), Some(BranchId(7)));
        assert_eq!(leaf.position, Vec2::new(40.0, 30.0));
        assert_eq!(leaf.opacity, 1.0);
    }

    #[test]
    fn test_detach_is_one_way() {
        let mut leaf = Leaf::attached(1, BranchId(0), Vec2::new(10.0, 10.0), 0.0);
        leaf.detach(Vec2::new(0.0, 0.01));
        assert!(!leaf.is_attached());
        assert_eq!(leaf.attached_branch(), None);
        assert_eq!(leaf.velocity.y, 0.01);

        // Detaching again leaves velocity alone
        leaf.detach(Vec2::new(5.0, 5.0));
        assert_eq!(leaf.state(), LeafState::Falling);
        assert_eq!(leaf.velocity.y, 0.01);
    }

    #[test]
    fn test_falling_leaf_defaults() {
        let leaf = Leaf::falling(9, Vec2::new(50.0, -10.0), Vec2::new(0.0, 0.02));
        assert!(!leaf.is_attached());
        assert_eq!(leaf.life_time, None);
        assert_eq!(leaf.scale, 1.0);
    }
}
