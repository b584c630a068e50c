//! Leaf population manager
//!
//! Owns every live leaf and decides when leaves are born and when they are
//! retired. Membership only changes through the spawn calls and `step`.

use std::f32::consts::TAU;
use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;
use serde::Deserialize;
use crate::growth::{BranchId, TreeStructure};
use crate::math::Vec2;
use super::leaf::Leaf;
use super::palette::PaletteColor;
use super::physics::{PhysicsParams, StepContext, step_leaf, should_retire};

/// Ranges and rates for newly spawned leaves
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnParams {
    /// Initial downward speed of sky leaves (percent per tick)
    pub fall_speed: (f32, f32),
    /// Peak initial sideways speed
    pub drift: f32,
    /// Peak rotation speed (degrees per tick)
    pub rotation_speed: f32,
    pub scale: (f32, f32),
    pub sway_amplitude: (f32, f32),
    /// Per-tick chance of an attached leaf letting go
    pub detachment_chance: (f32, f32),
    /// Fraction of canopy leaves that never let go
    pub evergreen_fraction: f32,
    /// Ticks of life given to a leaf when it detaches
    pub detached_lifetime: (f32, f32),
    /// Height of the band above the viewport sky leaves start in
    pub sky_spread: f32,
    /// Ticks between trickle spawn rolls before the scene settles
    pub trickle_interval: f32,
    pub settled_trickle_interval: f32,
    pub trickle_probability: f32,
    pub settled_trickle_probability: f32,
    /// Chance that a settled trickle spawn is a gust cluster
    pub cluster_probability: f32,
    /// Inclusive leaf count range of a cluster
    pub cluster_size: (u32, u32),
    /// Horizontal scatter around the cluster anchor
    pub cluster_spread: f32,
    /// How far above the anchor cluster leaves may start
    pub cluster_rise: f32,
    /// Extra sideways speed given to cluster leaves
    pub cluster_drift: f32,
    /// Fraction of the initial particle count that starts on the tree
    pub canopy_share: f32,
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            fall_speed: (0.001, 0.03),
            drift: 0.01,
            rotation_speed: 1.5,
            scale: (0.7, 1.3),
            sway_amplitude: (0.5, 1.5),
            detachment_chance: (0.0004, 0.003),
            evergreen_fraction: 0.15,
            detached_lifetime: (600.0, 900.0),
            sky_spread: 100.0,
            trickle_interval: 180.0,
            settled_trickle_interval: 600.0,
            trickle_probability: 1.0,
            settled_trickle_probability: 0.3,
            cluster_probability: 0.2,
            cluster_size: (2, 4),
            cluster_spread: 7.5,
            cluster_rise: 20.0,
            cluster_drift: 0.05,
            canopy_share: 0.6,
        }
    }
}

/// Where an initial burst places its leaves
#[derive(Debug, Clone, Copy)]
pub enum BurstDistribution<'a> {
    /// Already falling, scattered over a band above the viewport
    Sky { spread: f32 },
    /// Hanging near the tips of branches at or below `min_level`
    Canopy { tree: &'a TreeStructure, min_level: u32 },
}

/// What happened during one population step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub detached: usize,
    pub retired: usize,
}

/// Owner of the live leaf set
pub struct LeafPopulation {
    leaves: Vec<Leaf>,
    pub spawn: SpawnParams,
    pub physics: PhysicsParams,
    max_population: usize,
    next_id: u64,
    rng: SmallRng,
    trickle_ticks: f32,
    detachment_scale: f32,
}

impl LeafPopulation {
    pub fn new(spawn: SpawnParams, physics: PhysicsParams, max_population: usize, seed: u64) -> Self {
        Self {
            leaves: Vec::new(),
            spawn,
            physics,
            max_population: max_population.max(1),
            next_id: 0,
            rng: SmallRng::seed_from_u64(seed),
            trickle_ticks: 0.0,
            detachment_scale: physics.detachment_scale,
        }
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn max_population(&self) -> usize {
        self.max_population
    }

    /// Multiplier on detachment chance; 0 keeps every leaf on its branch
    pub fn set_detachment_scale(&mut self, scale: f32) {
        self.detachment_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }

    pub fn detachment_scale(&self) -> f32 {
        self.detachment_scale
    }

    /// Add a prepared leaf. Returns false when the population is full.
    pub fn insert(&mut self, leaf: Leaf) -> bool {
        if self.leaves.len() >= self.max_population {
            return false;
        }
        self.next_id = self.next_id.max(leaf.id + 1);
        self.leaves.push(leaf);
        true
    }

    /// Spawn up to `count` leaves placed by `distribution`. Returns how many
    /// were actually added.
    pub fn spawn_initial_burst(&mut self, count: usize, distribution: BurstDistribution) -> usize {
        let mut spawned = 0;
        match distribution {
            BurstDistribution::Sky { spread } => {
                for _ in 0..count {
                    let x = self.rng.gen_range(0.0..=100.0);
                    let y = -10.0 - self.rng.gen::<f32>() * spread.max(0.0);
                    let leaf = self.new_sky_leaf(Vec2::new(x, y));
                    if !self.insert(leaf) {
                        break;
                    }
                    spawned += 1;
                }
            }
            BurstDistribution::Canopy { tree, min_level } => {
                let eligible: Vec<_> = tree.leaf_bearing(min_level).collect();
                if eligible.is_empty() {
                    log::debug!("canopy burst skipped: no branch at level {} or deeper", min_level);
                    return 0;
                }
                for _ in 0..count {
                    let branch = eligible[self.rng.gen_range(0..eligible.len())];
                    let anchor = branch.point_at(self.rng.gen_range(0.75..=1.0));
                    let rest = branch.angle.to_degrees() + 90.0 + self.rng.gen_range(-25.0..=25.0);
                    let leaf = self.new_canopy_leaf(branch.id, anchor, rest);
                    if !self.insert(leaf) {
                        break;
                    }
                    spawned += 1;
                }
            }
        }
        self.warn_if_capped(count, spawned);
        spawned
    }

    /// Trickle spawn. Accumulates `elapsed_ticks` and rolls once every time the
    /// interval is crossed. Returns the number of leaves added.
    pub fn maybe_spawn_more(&mut self, elapsed_ticks: f32, is_settled: bool) -> usize {
        if !elapsed_ticks.is_finite() || elapsed_ticks <= 0.0 {
            return 0;
        }
        let (interval, probability) = if is_settled {
            (self.spawn.settled_trickle_interval, self.spawn.settled_trickle_probability)
        } else {
            (self.spawn.trickle_interval, self.spawn.trickle_probability)
        };

        self.trickle_ticks += elapsed_ticks;
        if self.trickle_ticks < interval {
            return 0;
        }
        self.trickle_ticks = 0.0;

        if self.rng.gen::<f32>() >= probability {
            return 0;
        }

        let wanted = if is_settled && self.rng.gen::<f32>() < self.spawn.cluster_probability {
            let (lo, hi) = self.spawn.cluster_size;
            self.rng.gen_range(lo.min(hi)..=hi.max(lo)) as usize
        } else {
            1
        };

        let spawned = if wanted > 1 {
            self.spawn_cluster(wanted)
        } else {
            let x = self.rng.gen_range(0.0..=100.0);
            let y = self.rng.gen_range(-20.0..=-10.0);
            let leaf = self.new_sky_leaf(Vec2::new(x, y));
            usize::from(self.insert(leaf))
        };
        self.warn_if_capped(wanted, spawned);
        if spawned > 0 {
            log::debug!("trickle spawned {} leaves (settled: {})", spawned, is_settled);
        }
        spawned
    }

    /// Advance every leaf by `delta_ticks`, then drop the ones that are done
    pub fn step(&mut self, delta_ticks: f32, time_ms: f64) -> StepReport {
        let ctx = StepContext {
            delta_ticks,
            time_ms,
            detachment_scale: self.detachment_scale,
        };
        let lifetime = self.spawn.detached_lifetime;
        let physics = self.physics;
        let rng = &mut self.rng;
        let mut report = StepReport::default();

        for leaf in self.leaves.iter_mut() {
            if step_leaf(leaf, &physics, &ctx, rng) {
                leaf.life_time = Some(sample(rng, lifetime));
                report.detached += 1;
            }
        }

        let before = self.leaves.len();
        self.leaves.retain(|leaf| !should_retire(leaf, &physics));
        report.retired = before - self.leaves.len();
        report
    }

    fn spawn_cluster(&mut self, count: usize) -> usize {
        let anchor = Vec2::new(self.rng.gen_range(10.0..=90.0), -10.0);
        let mut spawned = 0;
        for _ in 0..count {
            let offset = Vec2::new(
                spread(&mut self.rng, self.spawn.cluster_spread),
                -sample(&mut self.rng, (0.0, self.spawn.cluster_rise)),
            );
            let mut leaf = self.new_sky_leaf(anchor + offset);
            leaf.velocity.x += spread(&mut self.rng, self.spawn.cluster_drift);
            if !self.insert(leaf) {
                break;
            }
            spawned += 1;
        }
        spawned
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn new_sky_leaf(&mut self, position: Vec2) -> Leaf {
        let id = self.next_id();
        let fall = sample(&mut self.rng, self.spawn.fall_speed);
        let drift = spread(&mut self.rng, self.spawn.drift);

        let mut leaf = Leaf::falling(id, position, Vec2::new(drift, fall));
        self.randomize_look(&mut leaf);
        leaf
    }

    fn new_canopy_leaf(&mut self, branch: BranchId, anchor: Vec2, rest: f32) -> Leaf {
        let id = self.next_id();
        let mut leaf = Leaf::attached(id, branch, anchor, rest);
        self.randomize_look(&mut leaf);
        leaf.sway_amplitude = sample(&mut self.rng, self.spawn.sway_amplitude);
        leaf.detachment_chance = if self.rng.gen::<f32>() < self.spawn.evergreen_fraction {
            0.0
        } else {
            sample(&mut self.rng, self.spawn.detachment_chance)
        };
        leaf
    }

    fn randomize_look(&mut self, leaf: &mut Leaf) {
        if !leaf.is_attached() {
            leaf.rotation = self.rng.gen_range(0.0..360.0);
        }
        leaf.rotation_speed = spread(&mut self.rng, self.spawn.rotation_speed);
        leaf.scale = sample(&mut self.rng, self.spawn.scale);
        leaf.color = PaletteColor::random(&mut self.rng);
        leaf.swing_phase = self.rng.gen_range(0.0..TAU);
    }

    fn warn_if_capped(&self, wanted: usize, spawned: usize) {
        if spawned < wanted {
            log::warn!(
                "population cap {} reached, dropped {} of {} spawns",
                self.max_population,
                wanted - spawned,
                wanted
            );
        }
    }
}

/// Uniform sample from an inclusive range given in either order
fn sample<R: Rng + ?Sized>(rng: &mut R, (a, b): (f32, f32)) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if lo == hi {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}

/// Uniform sample from `[-half, half]`
fn spread<R: Rng + ?Sized>(rng: &mut R, half: f32) -> f32 {
    sample(rng, (-half, half))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::{GrowthParams, TreeGrowth};

    fn population(seed: u64) -> LeafPopulation {
        LeafPopulation::new(SpawnParams::default(), PhysicsParams::default(), 600, seed)
    }

    fn sky() -> BurstDistribution<'static> {
        BurstDistribution::Sky { spread: 100.0 }
    }

    #[test]
    fn test_sky_burst_ranges() {
        let mut pop = population(1);
        assert_eq!(pop.spawn_initial_burst(200, sky()), 200);

        for leaf in pop.leaves() {
            assert!(!leaf.is_attached());
            assert!((0.0..=100.0).contains(&leaf.position.x));
            assert!(leaf.position.y <= -10.0 && leaf.position.y >= -110.0);
            assert!((0.001..=0.03).contains(&leaf.velocity.y));
            assert!(leaf.velocity.x.abs() <= 0.01);
            assert!(leaf.rotation_speed.abs() <= 1.5);
            assert!((0.7..=1.3).contains(&leaf.scale));
            assert!((0.0..TAU).contains(&leaf.swing_phase));
            assert_eq!(leaf.life_time, None);
        }
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut pop = population(2);
        pop.spawn_initial_burst(50, sky());
        let ids: Vec<u64> = pop.leaves().iter().map(|l| l.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_canopy_burst_attaches_to_deep_branches() {
        let tree = TreeGrowth::new(GrowthParams::default()).grow();
        let mut pop = population(3);
        let spawned = pop.spawn_initial_burst(60, BurstDistribution::Canopy { tree: &tree, min_level: 3 });
        assert_eq!(spawned, 60);

        let mut evergreen = 0;
        for leaf in pop.leaves() {
            let branch = leaf.attached_branch().and_then(|id| tree.get(id)).unwrap();
            assert!(branch.level >= 3);
            assert!((0.5..=1.5).contains(&leaf.sway_amplitude));
            if leaf.detachment_chance == 0.0 {
                evergreen += 1;
            } else {
                assert!((0.0004..=0.003).contains(&leaf.detachment_chance));
            }
        }
        assert!(evergreen < 60);
    }

    #[test]
    fn test_canopy_burst_without_eligible_branches() {
        let tree = TreeGrowth::new(GrowthParams::default()).grow();
        let mut pop = population(4);
        let spawned = pop.spawn_initial_burst(10, BurstDistribution::Canopy { tree: &tree, min_level: 99 });
        assert_eq!(spawned, 0);
        assert!(pop.is_empty());
    }

    #[test]
    fn test_hard_cap() {
        let mut pop = LeafPopulation::new(SpawnParams::default(), PhysicsParams::default(), 25, 5);
        assert_eq!(pop.spawn_initial_burst(100, sky()), 25);
        assert_eq!(pop.len(), 25);
        assert_eq!(pop.maybe_spawn_more(10_000.0, false), 0);
        assert_eq!(pop.len(), 25);
    }

    #[test]
    fn test_negative_spreads_do_not_panic() {
        let spawn = SpawnParams {
            drift: -0.01,
            rotation_speed: -1.5,
            cluster_spread: -7.5,
            cluster_rise: -20.0,
            cluster_drift: -0.05,
            cluster_probability: 1.0,
            settled_trickle_probability: 1.0,
            ..Default::default()
        };
        let mut pop = LeafPopulation::new(spawn, PhysicsParams::default(), 600, 17);
        assert_eq!(pop.spawn_initial_burst(20, sky()), 20);
        assert!(pop.maybe_spawn_more(600.0, true) >= 2);
        for leaf in pop.leaves() {
            assert!(leaf.velocity.x.abs() <= 0.06);
            assert!(leaf.rotation_speed.abs() <= 1.5);
        }
    }

    #[test]
    fn test_trickle_waits_for_interval() {
        let mut pop = population(6);
        assert_eq!(pop.maybe_spawn_more(100.0, false), 0);
        assert_eq!(pop.maybe_spawn_more(79.0, false), 0);
        // Crossing 180 ticks with probability 1.0 always spawns one leaf
        assert_eq!(pop.maybe_spawn_more(1.0, false), 1);
        assert_eq!(pop.maybe_spawn_more(1.0, false), 0);
    }

    #[test]
    fn test_trickle_ignores_degenerate_elapsed() {
        let mut pop = population(7);
        assert_eq!(pop.maybe_spawn_more(f32::NAN, false), 0);
        assert_eq!(pop.maybe_spawn_more(-500.0, false), 0);
        assert_eq!(pop.maybe_spawn_more(179.0, false), 0);
    }

    #[test]
    fn test_settled_trickle_is_sparser() {
        let mut unsettled = population(8);
        let mut settled = population(8);
        let mut a = 0;
        let mut b = 0;
        for _ in 0..6000 {
            a += unsettled.maybe_spawn_more(1.0, false);
            b += settled.maybe_spawn_more(1.0, true);
        }
        // 33 rolls at p=1.0 versus 10 rolls at p=0.3 with occasional clusters
        assert_eq!(a, 33);
        assert!(b < a);
    }

    #[test]
    fn test_opacity_bounds_and_monotonic_fade() {
        let mut pop = population(9);
        pop.spawn_initial_burst(100, sky());
        let mut last: std::collections::HashMap<u64, f32> = Default::default();

        for step in 0..1500 {
            pop.step(1.0, step as f64 * 16.67);
            for leaf in pop.leaves() {
                assert!((0.0..=1.0).contains(&leaf.opacity));
                if let Some(prev) = last.get(&leaf.id) {
                    assert!(leaf.opacity <= *prev);
                }
                last.insert(leaf.id, leaf.opacity);
            }
        }
    }

    #[test]
    fn test_detachment_is_one_way() {
        let tree = TreeGrowth::new(GrowthParams::default()).grow();
        let mut pop = population(10);
        pop.spawn_initial_burst(80, BurstDistribution::Canopy { tree: &tree, min_level: 3 });
        pop.set_detachment_scale(20.0);

        let mut fallen = std::collections::HashSet::new();
        let mut detached_total = 0;
        for step in 0..400 {
            detached_total += pop.step(1.0, step as f64 * 16.67).detached;
            for leaf in pop.leaves() {
                if fallen.contains(&leaf.id) {
                    assert!(!leaf.is_attached());
                }
                if !leaf.is_attached() {
                    fallen.insert(leaf.id);
                    assert!(leaf.life_time.is_some());
                }
            }
        }
        assert!(detached_total > 0);
    }

    #[test]
    fn test_no_detachment_at_zero_scale() {
        let tree = TreeGrowth::new(GrowthParams::default()).grow();
        let mut pop = population(11);
        pop.spawn_initial_burst(40, BurstDistribution::Canopy { tree: &tree, min_level: 3 });
        pop.set_detachment_scale(0.0);
        for step in 0..600 {
            assert_eq!(pop.step(1.0, step as f64 * 16.67).detached, 0);
        }
        assert_eq!(pop.len(), 40);
    }

    #[test]
    fn test_frame_rate_independence() {
        let mut fast = population(12);
        let mut slow = population(12);
        fast.spawn_initial_burst(30, BurstDistribution::Sky { spread: 20.0 });
        slow.spawn_initial_burst(30, BurstDistribution::Sky { spread: 20.0 });

        for i in 0..60 {
            fast.step(1.0, i as f64 * 1000.0 / 60.0);
        }
        for i in 0..30 {
            slow.step(2.0, i as f64 * 1000.0 / 30.0);
        }

        assert_eq!(fast.len(), slow.len());
        for (a, b) in fast.leaves().iter().zip(slow.leaves()) {
            assert_eq!(a.id, b.id);
            assert!(a.position.distance(&b.position) < 1.0, "leaf {} diverged", a.id);
        }
    }

    #[test]
    fn test_faint_leaf_retired_in_one_step() {
        let mut pop = population(13);
        let mut leaf = Leaf::falling(0, Vec2::new(50.0, 50.0), Vec2::ZERO);
        leaf.opacity = 0.04;
        assert!(pop.insert(leaf));

        let report = pop.step(1.0, 0.0);
        assert_eq!(report.retired, 1);
        assert!(pop.is_empty());
    }

    #[test]
    fn test_burst_of_440_converges_to_zero() {
        let mut pop = population(14);
        assert_eq!(pop.spawn_initial_burst(440, sky()), 440);

        let mut steps = 0;
        while !pop.is_empty() && steps < 5000 {
            pop.step(1.0, steps as f64 * 16.67);
            steps += 1;
        }
        assert!(pop.is_empty(), "{} leaves left after {} steps", pop.len(), steps);
    }

    #[test]
    fn test_single_leaf_scenario() {
        let mut pop = LeafPopulation::new(SpawnParams::default(), PhysicsParams::still_air(), 600, 15);
        pop.insert(Leaf::falling(0, Vec2::new(50.0, -10.0), Vec2::new(0.0, 0.02)));

        let mut prev_y = -10.0;
        for step in 0..100 {
            pop.step(1.0, step as f64 * 16.67);
            let leaf = &pop.leaves()[0];
            assert!(leaf.position.y > prev_y);
            prev_y = leaf.position.y;
        }

        // Keeps falling until it fades out near the bottom or crosses 110
        let mut steps = 100;
        while !pop.is_empty() && steps < 2000 {
            pop.step(1.0, steps as f64 * 16.67);
            if let Some(leaf) = pop.leaves().first() {
                assert!(leaf.position.y > prev_y);
                assert!(leaf.position.y < 110.0);
                prev_y = leaf.position.y;
            }
            steps += 1;
        }
        assert!(pop.is_empty());
        assert!(prev_y > 95.0);
    }

    #[test]
    fn test_nan_time_does_not_poison_positions() {
        let mut pop = population(16);
        pop.spawn_initial_burst(20, sky());
        pop.step(1.0, f64::NAN);
        // Leaves with NaN positions are retired instead of kept
        for leaf in pop.leaves() {
            assert!(leaf.position.is_finite());
        }
    }
}
