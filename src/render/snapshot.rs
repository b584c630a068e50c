//! Pure per-frame render output
//!
//! A [`FrameSnapshot`] is built from read-only views of the tree, the growth
//! animation and the leaves. It owns no simulation state and can be drawn by
//! any presentation layer.

use crate::animation::GrowthAnimation;
use crate::growth::{BranchId, TreeStructure};
use crate::math::{Vec2, split_quadratic};
use crate::particles::{Leaf, PaletteColor};
use super::shape::{Rgb, bark_color, leaf_brightness};

/// Floats per leaf in [`FrameSnapshot::leaf_data`]
pub const LEAF_STRIDE: usize = 6;

/// Floats per branch in [`FrameSnapshot::branch_data`]
pub const BRANCH_STRIDE: usize = 8;

/// A visible, possibly partially grown branch
#[derive(Debug, Clone, PartialEq)]
pub struct BranchStroke {
    pub id: BranchId,
    pub level: u32,
    pub start: Vec2,
    /// Control and end of the grown part of the curve
    pub control: Vec2,
    pub end: Vec2,
    /// Stroke width in pixels
    pub width: f32,
    pub color: Rgb,
    /// Grown fraction in (0, 1]
    pub reveal: f32,
}

/// A visible leaf: transform, look and opacity
#[derive(Debug, Clone, PartialEq)]
pub struct LeafSprite {
    pub id: u64,
    /// Viewport percent
    pub x: f32,
    pub y: f32,
    /// Degrees
    pub rotation: f32,
    pub scale: f32,
    /// In (0, 1]
    pub opacity: f32,
    pub color: PaletteColor,
    pub brightness: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSnapshot {
    pub branches: Vec<BranchStroke>,
    pub leaves: Vec<LeafSprite>,
    pub shadows: bool,
}

impl FrameSnapshot {
    /// Everything that should be on screen right now. Invisible shapes are
    /// left out.
    pub fn build(
        tree: &TreeStructure,
        growth: &GrowthAnimation,
        leaves: &[Leaf],
        shadows: bool,
        time_ms: f64,
    ) -> Self {
        let count = tree.len();
        let max_level = tree.max_level();

        let branches = tree
            .branches()
            .iter()
            .filter_map(|branch| {
                let reveal = growth.branch_reveal(branch.id.index(), count);
                if reveal <= 0.0 {
                    return None;
                }
                let (control, end) = split_quadratic(branch.start, branch.control, branch.end, reveal);
                Some(BranchStroke {
                    id: branch.id,
                    level: branch.level,
                    start: branch.start,
                    control,
                    end,
                    width: branch.width * (0.4 + 0.6 * reveal),
                    color: bark_color(branch.level, max_level),
                    reveal,
                })
            })
            .collect();

        let leaves = leaves
            .iter()
            .filter_map(|leaf| {
                // Leaves on a branch fade in with it
                let reveal = leaf
                    .attached_branch()
                    .map_or(1.0, |id| growth.branch_reveal(id.index(), count));
                let opacity = (leaf.opacity * reveal).clamp(0.0, 1.0);
                if opacity <= 0.0 || !leaf.position.is_finite() {
                    return None;
                }
                Some(LeafSprite {
                    id: leaf.id,
                    x: leaf.position.x,
                    y: leaf.position.y,
                    rotation: leaf.rotation,
                    scale: leaf.scale,
                    opacity,
                    color: leaf.color,
                    brightness: leaf_brightness(time_ms, leaf.id),
                })
            })
            .collect();

        Self {
            branches,
            leaves,
            shadows,
        }
    }

    /// Flat leaf export: x, y, rotation, scale, opacity, palette index
    pub fn leaf_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.leaves.len() * LEAF_STRIDE);
        for leaf in &self.leaves {
            data.extend_from_slice(&[
                leaf.x,
                leaf.y,
                leaf.rotation,
                leaf.scale,
                leaf.opacity,
                leaf.color.index() as f32,
            ]);
        }
        data
    }

    /// Flat branch export: start, control, end (x, y each), width, level
    pub fn branch_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.branches.len() * BRANCH_STRIDE);
        for stroke in &self.branches {
            data.extend_from_slice(&[
                stroke.start.x,
                stroke.start.y,
                stroke.control.x,
                stroke.control.y,
                stroke.end.x,
                stroke.end.y,
                stroke.width,
                stroke.level as f32,
            ]);
        }
        data
    }
}
