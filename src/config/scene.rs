use serde::Deserialize;
use crate::animation::Easing;
use crate::growth::{GrowthParams, MAX_TREE_DEPTH};
use crate::particles::{PhysicsParams, SpawnParams};
use super::error::{ConfigError, Result};
use super::tier::{DeviceTier, Environment, HostOverrides, TierPreset, TierSettings};

/// Everything needed to build a scene. Every section is optional in YAML;
/// missing sections and fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub tree: GrowthParams,
    pub physics: PhysicsParams,
    pub spawn: SpawnParams,
    pub desktop: TierPreset,
    pub mobile: TierPreset,
    /// Viewports narrower than this use the mobile tier
    pub mobile_max_width: f32,
    /// Hard ceiling on live leaves
    pub max_population: usize,
    /// Simulated time after which the scene settles on its own
    pub settle_after_ms: f64,
    pub growth_duration_ms: f32,
    pub growth_easing: Easing,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tree: GrowthParams::default(),
            physics: PhysicsParams::default(),
            spawn: SpawnParams::default(),
            desktop: TierPreset::desktop(),
            mobile: TierPreset::mobile(),
            mobile_max_width: 768.0,
            max_population: 600,
            settle_after_ms: 18_000.0,
            growth_duration_ms: 4000.0,
            growth_easing: Easing::Organic,
        }
    }
}

impl SceneConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document means "all defaults"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SceneConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let tree = &self.tree;
        let physics = &self.physics;

        if tree.max_depth == 0 || tree.max_depth > MAX_TREE_DEPTH {
            return Err(ConfigError::invalid(
                "tree.max_depth",
                format!("{} is outside [1, {}]", tree.max_depth, MAX_TREE_DEPTH),
            ));
        }
        if tree.min_leaf_level > tree.max_depth {
            return Err(ConfigError::invalid(
                "tree.min_leaf_level",
                format!("{} is deeper than max_depth {}", tree.min_leaf_level, tree.max_depth),
            ));
        }
        check_range("tree.length_decay", tree.length_decay, 0.6, 0.85)?;
        check_range("tree.width_decay", tree.width_decay, 0.6, 0.85)?;
        check_positive("tree.min_length", tree.min_length)?;
        check_positive("tree.trunk_length", tree.trunk_length)?;
        check_positive("tree.trunk_width", tree.trunk_width)?;
        for (field, value) in [
            ("tree.branch_spread", tree.branch_spread),
            ("tree.angle_variance", tree.angle_variance),
            ("tree.bend", tree.bend),
            ("tree.start_angle", tree.start_angle),
        ] {
            check_finite(field, value)?;
        }
        if !tree.origin.is_finite() {
            return Err(ConfigError::invalid("tree.origin", "must be finite"));
        }

        if !(physics.air_resistance > 0.0 && physics.air_resistance <= 1.0) {
            return Err(ConfigError::invalid(
                "physics.air_resistance",
                format!("{} is outside (0, 1]", physics.air_resistance),
            ));
        }
        check_positive("physics.max_fall_speed", physics.max_fall_speed)?;
        for (field, value) in [
            ("physics.gravity", physics.gravity),
            ("physics.wind_amplitude", physics.wind_amplitude),
            ("physics.gust_amplitude", physics.gust_amplitude),
            ("physics.spiral_amplitude", physics.spiral_amplitude),
            ("physics.horizontal_noise", physics.horizontal_noise),
            ("physics.vertical_noise", physics.vertical_noise),
            ("physics.rotation_damping", physics.rotation_damping),
            ("physics.sway_coupling", physics.sway_coupling),
            ("physics.detachment_scale", physics.detachment_scale),
            ("physics.bottom_fade_rate", physics.bottom_fade_rate),
            ("physics.side_fade_rate", physics.side_fade_rate),
            ("physics.lifetime_fade_rate", physics.lifetime_fade_rate),
            ("physics.retire_opacity", physics.retire_opacity),
        ] {
            check_finite(field, value)?;
        }

        let spawn = &self.spawn;
        for (field, (lo, hi)) in [
            ("spawn.fall_speed", spawn.fall_speed),
            ("spawn.scale", spawn.scale),
            ("spawn.sway_amplitude", spawn.sway_amplitude),
            ("spawn.detachment_chance", spawn.detachment_chance),
            ("spawn.detached_lifetime", spawn.detached_lifetime),
        ] {
            check_finite(field, lo)?;
            check_finite(field, hi)?;
        }
        check_range("spawn.evergreen_fraction", spawn.evergreen_fraction, 0.0, 1.0)?;
        check_range("spawn.trickle_probability", spawn.trickle_probability, 0.0, 1.0)?;
        check_range("spawn.settled_trickle_probability", spawn.settled_trickle_probability, 0.0, 1.0)?;
        check_range("spawn.cluster_probability", spawn.cluster_probability, 0.0, 1.0)?;
        check_range("spawn.canopy_share", spawn.canopy_share, 0.0, 1.0)?;
        for (field, value) in [
            ("spawn.drift", spawn.drift),
            ("spawn.rotation_speed", spawn.rotation_speed),
            ("spawn.sky_spread", spawn.sky_spread),
            ("spawn.cluster_spread", spawn.cluster_spread),
            ("spawn.cluster_rise", spawn.cluster_rise),
            ("spawn.cluster_drift", spawn.cluster_drift),
        ] {
            check_non_negative(field, value)?;
        }

        for (field, preset) in [("desktop", &self.desktop), ("mobile", &self.mobile)] {
            if preset.update_divisor == 0 {
                return Err(ConfigError::invalid(field, "update_divisor must be at least 1"));
            }
        }
        if self.max_population == 0 {
            return Err(ConfigError::invalid("max_population", "must be at least 1"));
        }
        check_finite("mobile_max_width", self.mobile_max_width)?;
        if !self.settle_after_ms.is_finite() || self.settle_after_ms < 0.0 {
            return Err(ConfigError::invalid("settle_after_ms", "must be a non-negative number"));
        }
        if !self.growth_duration_ms.is_finite() || self.growth_duration_ms < 0.0 {
            return Err(ConfigError::invalid("growth_duration_ms", "must be a non-negative number"));
        }
        Ok(())
    }

    pub fn preset(&self, tier: DeviceTier) -> TierPreset {
        match tier {
            DeviceTier::Desktop => self.desktop,
            DeviceTier::Mobile => self.mobile,
        }
    }

    pub fn detect_tier(&self, env: &Environment) -> DeviceTier {
        DeviceTier::detect(env.viewport.width(), env.user_agent.as_deref(), self.mobile_max_width)
    }

    /// Settings in effect for a device, after host overrides
    pub fn resolve(&self, env: &Environment, overrides: &HostOverrides) -> TierSettings {
        let tier = self.detect_tier(env);
        TierSettings::resolve(tier, self.preset(tier), overrides)
    }
}

fn check_finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be a finite number"))
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<()> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} must be positive", value)))
    }
}

/// Half-widths of symmetric ranges; a negative one would invert the range
fn check_non_negative(field: &'static str, value: f32) -> Result<()> {
    check_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} must not be negative", value)))
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} is outside [{}, {}]", value, min, max)))
    }
}
