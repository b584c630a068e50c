pub mod algorithm;
pub mod branch;

pub use algorithm::{TreeGrowth, GrowthParams, MAX_TREE_DEPTH};
pub use branch::{Branch, BranchId, TreeStructure};
