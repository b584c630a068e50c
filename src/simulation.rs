//! The long-lived leaf simulation
//!
//! Owns the tree, its growth reveal, the leaf population and the frame pacer.
//! Everything it needs from the host (timestamps, viewport, overrides) is
//! passed in explicitly.

use crate::animation::GrowthAnimation;
use crate::config::{DeviceTier, Environment, HostOverrides, SceneConfig, TierSettings};
use crate::growth::{TreeGrowth, TreeStructure};
use crate::particles::{BurstDistribution, LeafPopulation, StepReport};
use crate::render::FrameSnapshot;
use crate::timing::{FramePacer, clamp_delta_ticks, FRAME_MS};

pub struct LeafSimulation {
    config: SceneConfig,
    environment: Environment,
    overrides: HostOverrides,
    settings: TierSettings,
    tree: TreeStructure,
    growth: GrowthAnimation,
    population: LeafPopulation,
    pacer: FramePacer,
    /// Simulated milliseconds since creation
    elapsed_ms: f64,
    settled: bool,
}

impl LeafSimulation {
    pub fn new(config: SceneConfig, environment: Environment, overrides: HostOverrides, seed: u64) -> Self {
        let settings = config.resolve(&environment, &overrides);
        let tree = TreeGrowth::new(config.tree).grow();

        let mut growth = GrowthAnimation::new(config.growth_duration_ms).with_easing(config.growth_easing);
        growth.start();

        let mut population = LeafPopulation::new(config.spawn, config.physics, config.max_population, seed);
        // Nothing falls off a tree that is still growing
        population.set_detachment_scale(0.0);

        // The particle count is the whole initial burst, shared between the
        // tree and the sky. Canopy leaves with nowhere to hang fall from the sky.
        let count = settings.particle_count;
        let canopy_wanted = (count as f32 * config.spawn.canopy_share).round() as usize;
        let canopy = population.spawn_initial_burst(
            canopy_wanted.min(count),
            BurstDistribution::Canopy {
                tree: &tree,
                min_level: config.tree.min_leaf_level,
            },
        );
        let sky = population.spawn_initial_burst(
            count - canopy,
            BurstDistribution::Sky {
                spread: config.spawn.sky_spread,
            },
        );

        log::info!(
            "scene ready: {} branches, {} tier, {} canopy + {} sky leaves",
            tree.len(),
            settings.tier.name(),
            canopy,
            sky
        );

        Self {
            pacer: FramePacer::new(settings.update_divisor),
            config,
            environment,
            overrides,
            settings,
            tree,
            growth,
            population,
            elapsed_ms: 0.0,
            settled: false,
        }
    }

    /// Feed one scheduling callback. Returns true if physics stepped.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> bool {
        match self.pacer.on_callback(timestamp_ms) {
            Some(delta_ticks) => {
                self.step_ticks(delta_ticks, timestamp_ms);
                true
            }
            None => false,
        }
    }

    /// Forget the last timestamp so the next stepping callback advances one
    /// nominal tick instead of the whole pause
    pub fn reset_clock(&mut self) {
        self.pacer.clock.reset();
    }

    /// Advance by `delta_ticks` (clamped) with `time_ms` as the wall clock
    pub fn step_ticks(&mut self, delta_ticks: f32, time_ms: f64) -> StepReport {
        let dt = clamp_delta_ticks(delta_ticks as f64);
        let dt_ms = dt as f64 * FRAME_MS;
        self.elapsed_ms += dt_ms;

        if !self.growth.is_complete() {
            self.growth.update(dt_ms as f32);
            if self.growth.is_complete() {
                log::debug!("tree fully grown after {:.0} ms", self.elapsed_ms);
                self.population.set_detachment_scale(self.config.physics.detachment_scale);
            }
        }

        if !self.settled && self.elapsed_ms >= self.config.settle_after_ms {
            self.mark_settled();
        }

        self.population.maybe_spawn_more(dt, self.settled);
        self.population.step(dt, time_ms)
    }

    /// Switch to the calmer spawn rate. Cannot be undone.
    pub fn mark_settled(&mut self) {
        if !self.settled {
            log::debug!("scene settled at {:.0} ms", self.elapsed_ms);
            self.settled = true;
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::build(
            &self.tree,
            &self.growth,
            self.population.leaves(),
            self.settings.enable_shadow_effects,
            self.elapsed_ms,
        )
    }

    /// New viewport or user agent; re-resolves the tier
    pub fn update_environment(&mut self, environment: Environment) {
        self.environment = environment;
        self.apply_settings();
    }

    pub fn set_overrides(&mut self, overrides: HostOverrides) {
        self.overrides = overrides;
        self.apply_settings();
    }

    pub fn overrides(&self) -> &HostOverrides {
        &self.overrides
    }

    fn apply_settings(&mut self) {
        let previous = self.settings;
        self.settings = self.config.resolve(&self.environment, &self.overrides);

        if previous.tier != self.settings.tier {
            log::debug!("device tier {} -> {}", previous.tier.name(), self.settings.tier.name());
        }
        self.pacer.gate.set_divisor(self.settings.update_divisor);

        // A larger count tops the sky up now; a smaller one lets attrition shrink it
        if self.settings.particle_count > previous.particle_count {
            let extra = self.settings.particle_count - previous.particle_count;
            self.population.spawn_initial_burst(
                extra,
                BurstDistribution::Sky {
                    spread: self.config.spawn.sky_spread,
                },
            );
        }
    }

    pub fn tree(&self) -> &TreeStructure {
        &self.tree
    }

    pub fn growth(&self) -> &GrowthAnimation {
        &self.growth
    }

    pub fn population(&self) -> &LeafPopulation {
        &self.population
    }

    pub fn settings(&self) -> &TierSettings {
        &self.settings
    }

    pub fn tier(&self) -> DeviceTier {
        self.settings.tier
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn leaf_count(&self) -> usize {
        self.population.len()
    }

    pub fn branch_count(&self) -> usize {
        self.tree.len()
    }

    pub fn growth_progress(&self) -> f32 {
        self.growth.progress()
    }
}
