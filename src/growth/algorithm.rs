use serde::Deserialize;
use crate::math::{Vec2, seeded_random, child_seed};
use super::branch::{Branch, BranchId, TreeStructure};

/// Recursion never goes deeper than this, whatever `max_depth` says.
/// Branch count grows as 3^depth.
pub const MAX_TREE_DEPTH: u32 = 8;

/// Parameters controlling the tree skeleton
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GrowthParams {
    /// Base of the trunk in viewport percent
    pub origin: Vec2,
    /// Trunk direction in radians (-π/2 points up the screen)
    pub start_angle: f32,
    /// Trunk length in viewport percent
    pub trunk_length: f32,
    /// Trunk stroke width in pixels
    pub trunk_width: f32,
    /// Deepest recursion level (trunk is level 0)
    pub max_depth: u32,
    /// Branches shorter than this are not grown
    pub min_length: f32,
    /// Child length as a fraction of the parent's
    pub length_decay: f32,
    /// Child width as a fraction of the parent's
    pub width_decay: f32,
    /// Total fan angle across a node's children (radians)
    pub branch_spread: f32,
    /// Seeded jitter added to each child angle (radians, peak to peak)
    pub angle_variance: f32,
    /// Sideways bend of each segment relative to its length
    pub bend: f32,
    /// Chance that a node grows a third child
    pub third_child_chance: f32,
    /// Shallowest level that carries leaves
    pub min_leaf_level: u32,
    pub seed: u32,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            origin: Vec2::new(50.0, 102.0),
            start_angle: -std::f32::consts::FRAC_PI_2,
            trunk_length: 24.0,
            trunk_width: 14.0,
            max_depth: 5,
            min_length: 2.5,
            length_decay: 0.74,
            width_decay: 0.66,
            branch_spread: 0.9,
            angle_variance: 0.45,
            bend: 0.18,
            third_child_chance: 0.4,
            min_leaf_level: 3,
            seed: 42,
        }
    }
}

/// Recursive subdivision state for one segment, kept in f64 until recorded
#[derive(Clone, Copy)]
struct Segment {
    start: (f64, f64),
    angle: f64,
    length: f64,
    width: f64,
    level: u32,
    seed: f64,
}

/// Deterministic tree skeleton generator
pub struct TreeGrowth {
    pub params: GrowthParams,
}

impl TreeGrowth {
    pub fn new(params: GrowthParams) -> Self {
        Self { params }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.params.seed = seed;
        self
    }

    /// Grow the full branch set. Pure function of the parameters.
    pub fn grow(&self) -> TreeStructure {
        let p = &self.params;
        let mut branches = Vec::new();
        let trunk = Segment {
            start: (p.origin.x as f64, p.origin.y as f64),
            angle: p.start_angle as f64,
            length: p.trunk_length as f64,
            width: p.trunk_width as f64,
            level: 0,
            seed: p.seed as f64,
        };
        self.grow_branch(&mut branches, None, trunk);
        TreeStructure::new(branches)
    }

    fn grow_branch(&self, out: &mut Vec<Branch>, parent: Option<BranchId>, seg: Segment) {
        let p = &self.params;
        let (dir_x, dir_y) = (libm::cos(seg.angle), libm::sin(seg.angle));
        let end = (seg.start.0 + dir_x * seg.length, seg.start.1 + dir_y * seg.length);

        // Control point: midpoint pushed sideways along the normal
        let offset = (seeded_random(seg.seed * 1.7 + 0.3) - 0.5) * seg.length * p.bend as f64;
        let control = (
            (seg.start.0 + end.0) * 0.5 - dir_y * offset,
            (seg.start.1 + end.1) * 0.5 + dir_x * offset,
        );

        let id = BranchId(out.len() as u32);
        out.push(Branch {
            id,
            parent,
            start: to_vec2(seg.start),
            control: to_vec2(control),
            end: to_vec2(end),
            width: seg.width as f32,
            level: seg.level,
            angle: seg.angle as f32,
        });

        if seg.level >= p.max_depth.min(MAX_TREE_DEPTH) {
            return;
        }
        let child_length = seg.length * p.length_decay as f64;
        if child_length < p.min_length as f64 {
            return;
        }

        let count = if seeded_random(seg.seed + 0.5) < p.third_child_chance as f64 { 3 } else { 2 };
        let spread = p.branch_spread as f64;

        for i in 0..count {
            let seed = child_seed(seg.seed, i);
            let fan = -spread / 2.0 + spread * i as f64 / (count - 1) as f64;
            let jitter = (seeded_random(seed) - 0.5) * p.angle_variance as f64;

            self.grow_branch(
                out,
                Some(id),
                Segment {
                    start: end,
                    angle: seg.angle + fan + jitter,
                    length: child_length,
                    width: seg.width * p.width_decay as f64,
                    level: seg.level + 1,
                    seed,
                },
            );
        }
    }
}

fn to_vec2((x, y): (f64, f64)) -> Vec2 {
    Vec2::new(x as f32, y as f32)
}
