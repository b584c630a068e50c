use serde::Serialize;
use crate::math::{Vec2, quadratic_point};

/// Index of a branch inside its [`TreeStructure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BranchId(pub u32);

impl BranchId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One immutable segment of the tree skeleton
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub id: BranchId,
    /// Parent branch (None for the trunk)
    pub parent: Option<BranchId>,
    pub start: Vec2,
    /// Quadratic control point giving the segment its bend
    pub control: Vec2,
    pub end: Vec2,
    /// Stroke thickness in pixels
    pub width: f32,
    /// Recursion depth, 0 = trunk
    pub level: u32,
    /// Generating angle in radians
    pub angle: f32,
}

impl Branch {
    /// Point along the curved segment (t in [0, 1])
    pub fn point_at(&self, t: f32) -> Vec2 {
        quadratic_point(self.start, self.control, self.end, t)
    }

    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }
}

/// The full branch set in generation (pre-order) order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeStructure {
    branches: Vec<Branch>,
}

impl TreeStructure {
    pub fn new(branches: Vec<Branch>) -> Self {
        Self { branches }
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn get(&self, id: BranchId) -> Option<&Branch> {
        self.branches.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Deepest level present in the tree
    pub fn max_level(&self) -> u32 {
        self.branches.iter().map(|b| b.level).max().unwrap_or(0)
    }

    /// Branches deep enough to carry foliage
    pub fn leaf_bearing(&self, min_level: u32) -> impl Iterator<Item = &Branch> {
        self.branches.iter().filter(move |b| b.level >= min_level)
    }

    /// Direct children of a branch, in generation order
    pub fn children_of(&self, id: BranchId) -> impl Iterator<Item = &Branch> {
        self.branches.iter().filter(move |b| b.parent == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_structure() -> TreeStructure {
        TreeStructure::new(vec![
            Branch {
                id: BranchId(0),
                parent: None,
                start: Vec2::new(50.0, 100.0),
                control: Vec2::new(50.0, 90.0),
                end: Vec2::new(50.0, 80.0),
                width: 10.0,
                level: 0,
                angle: -std::f32::consts::FRAC_PI_2,
            },
            Branch {
                id: BranchId(1),
                parent: Some(BranchId(0)),
                start: Vec2::new(50.0, 80.0),
                control: Vec2::new(45.0, 75.0),
                end: Vec2::new(40.0, 70.0),
                width: 6.0,
                level: 1,
                angle: -2.3,
            },
        ])
    }

    #[test]
    fn test_lookup_by_id() {
        let tree = create_test_structure();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(BranchId(1)).map(|b| b.level), Some(1));
        assert!(tree.get(BranchId(7)).is_none());
    }

    #[test]
    fn test_leaf_bearing_filter() {
        let tree = create_test_structure();
        assert_eq!(tree.leaf_bearing(1).count(), 1);
        assert_eq!(tree.leaf_bearing(0).count(), 2);
        assert_eq!(tree.max_level(), 1);
    }

    #[test]
    fn test_children_of() {
        let tree = create_test_structure();
        let kids: Vec<_> = tree.children_of(BranchId(0)).map(|b| b.id).collect();
        assert_eq!(kids, vec![BranchId(1)]);
    }

    #[test]
    fn test_point_at_endpoints() {
        let tree = create_test_structure();
        let trunk = &tree.branches()[0];
        assert_eq!(trunk.point_at(0.0), trunk.start);
        assert_eq!(trunk.point_at(1.0), trunk.end);
        assert!((trunk.length() - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_json_export() {
        let tree = create_test_structure();
        let value = serde_json::to_value(&tree).unwrap();
        let branches = value["branches"].as_array().unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0]["parent"], serde_json::Value::Null);
        assert_eq!(branches[1]["parent"], 0);
        assert_eq!(branches[1]["end"]["x"], 40.0);
        assert_eq!(branches[1]["level"], 1);
    }
}
