pub mod vec2;
pub mod bezier;
pub mod seeded;

pub use vec2::Vec2;
pub use bezier::{quadratic_point, split_quadratic};
pub use seeded::{seeded_random, child_seed};
