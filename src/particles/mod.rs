//! Leaves: state, look, physics and the population that owns them

pub mod leaf;
pub mod palette;
pub mod physics;
pub mod population;

pub use leaf::{Leaf, LeafState};
pub use palette::{PaletteColor, AUTUMN_PALETTE, palette_json};
pub use physics::{PhysicsParams, StepContext, step_leaf, should_retire, sway_offset};
pub use population::{LeafPopulation, SpawnParams, BurstDistribution, StepReport};
