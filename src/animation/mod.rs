//! Growth reveal for the tree skeleton
//!
//! A single monotonic scalar drives how much of each branch is drawn,
//! staggered by generation order so the trunk appears before the twigs.

mod growth_animation;
mod easing;

pub use growth_animation::{GrowthAnimation, branch_reveal};
pub use easing::{Easing, ease};
