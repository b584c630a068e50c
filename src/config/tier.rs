//! Device tiers and the knobs they select

use serde::Deserialize;

/// User agent fragments that mark a constrained device
const MOBILE_AGENTS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Coarse device capability class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceTier {
    #[default]
    Desktop,
    Mobile,
}

impl DeviceTier {
    /// Classify from viewport width and an optional user agent string
    pub fn detect(viewport_width: f32, user_agent: Option<&str>, mobile_max_width: f32) -> Self {
        if Viewport::clamp_dimension(viewport_width) < mobile_max_width {
            return DeviceTier::Mobile;
        }
        match user_agent {
            Some(agent) if is_mobile_agent(agent) => DeviceTier::Mobile,
            _ => DeviceTier::Desktop,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceTier::Desktop => "desktop",
            DeviceTier::Mobile => "mobile",
        }
    }
}

fn is_mobile_agent(agent: &str) -> bool {
    let agent = agent.to_ascii_lowercase();
    MOBILE_AGENTS.iter().any(|token| agent.contains(token))
}

/// Defaults a tier applies before host overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TierPreset {
    pub particle_count: usize,
    /// Physics runs on every n-th scheduling callback
    pub update_divisor: u32,
    pub enable_shadow_effects: bool,
}

impl TierPreset {
    pub fn desktop() -> Self {
        Self {
            particle_count: 50,
            update_divisor: 1,
            enable_shadow_effects: true,
        }
    }

    pub fn mobile() -> Self {
        Self {
            particle_count: 20,
            update_divisor: 2,
            enable_shadow_effects: false,
        }
    }
}

impl Default for TierPreset {
    fn default() -> Self {
        Self::desktop()
    }
}

/// Optional knobs set by the host; each one replaces the tier's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct HostOverrides {
    pub particle_count: Option<usize>,
    pub update_divisor: Option<u32>,
    pub enable_shadow_effects: Option<bool>,
}

/// The knobs actually in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSettings {
    pub tier: DeviceTier,
    pub particle_count: usize,
    pub update_divisor: u32,
    pub enable_shadow_effects: bool,
}

impl TierSettings {
    pub fn resolve(tier: DeviceTier, preset: TierPreset, overrides: &HostOverrides) -> Self {
        Self {
            tier,
            particle_count: overrides.particle_count.unwrap_or(preset.particle_count),
            update_divisor: overrides.update_divisor.unwrap_or(preset.update_divisor).max(1),
            enable_shadow_effects: overrides
                .enable_shadow_effects
                .unwrap_or(preset.enable_shadow_effects),
        }
    }
}

/// Viewport size in CSS pixels, never smaller than 1x1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: Self::clamp_dimension(width),
            height: Self::clamp_dimension(height),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    fn clamp_dimension(value: f32) -> f32 {
        if value.is_nan() {
            1.0
        } else {
            value.max(1.0)
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Device signals supplied by the host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    pub viewport: Viewport,
    pub user_agent: Option<String>,
}

impl Environment {
    pub fn new(width: f32, height: f32, user_agent: Option<String>) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            user_agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
    const FIREFOX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

    #[test]
    fn test_detect_by_width() {
        assert_eq!(DeviceTier::detect(500.0, None, 768.0), DeviceTier::Mobile);
        assert_eq!(DeviceTier::detect(767.9, None, 768.0), DeviceTier::Mobile);
        assert_eq!(DeviceTier::detect(768.0, None, 768.0), DeviceTier::Desktop);
    }

    #[test]
    fn test_detect_by_user_agent() {
        assert_eq!(DeviceTier::detect(1920.0, Some(IPHONE), 768.0), DeviceTier::Mobile);
        assert_eq!(DeviceTier::detect(1920.0, Some(FIREFOX), 768.0), DeviceTier::Desktop);
        assert_eq!(DeviceTier::detect(1920.0, Some("OPERA MINI/9"), 768.0), DeviceTier::Mobile);
    }

    #[test]
    fn test_degenerate_width_is_mobile() {
        assert_eq!(DeviceTier::detect(0.0, None, 768.0), DeviceTier::Mobile);
        assert_eq!(DeviceTier::detect(f32::NAN, None, 768.0), DeviceTier::Mobile);
    }

    #[test]
    fn test_presets() {
        assert_eq!(TierPreset::desktop().particle_count, 50);
        assert_eq!(TierPreset::mobile().particle_count, 20);
        assert_eq!(TierPreset::mobile().update_divisor, 2);
        assert!(!TierPreset::mobile().enable_shadow_effects);
    }

    #[test]
    fn test_overrides_win() {
        let overrides = HostOverrides {
            particle_count: Some(7),
            update_divisor: None,
            enable_shadow_effects: Some(true),
        };
        let settings = TierSettings::resolve(DeviceTier::Mobile, TierPreset::mobile(), &overrides);
        assert_eq!(settings.particle_count, 7);
        assert_eq!(settings.update_divisor, 2);
        assert!(settings.enable_shadow_effects);
    }

    #[test]
    fn test_zero_divisor_clamped() {
        let overrides = HostOverrides {
            update_divisor: Some(0),
            ..Default::default()
        };
        let settings = TierSettings::resolve(DeviceTier::Desktop, TierPreset::desktop(), &overrides);
        assert_eq!(settings.update_divisor, 1);
    }

    #[test]
    fn test_viewport_clamped() {
        let v = Viewport::new(0.0, -20.0);
        assert_eq!((v.width(), v.height()), (1.0, 1.0));
        let v = Viewport::new(f32::NAN, 600.0);
        assert_eq!((v.width(), v.height()), (1.0, 600.0));
    }
}
