//! Scene configuration: YAML loading, validation and device tiers

pub mod error;
pub mod scene;
pub mod tier;

pub use error::ConfigError;
pub use scene::SceneConfig;
pub use tier::{DeviceTier, Environment, HostOverrides, TierPreset, TierSettings, Viewport};
