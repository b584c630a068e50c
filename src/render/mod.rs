pub mod canvas;
pub mod shape;
pub mod snapshot;

pub use canvas::CanvasPainter;
pub use shape::{Rgb, bark_color};
pub use snapshot::{BranchStroke, FrameSnapshot, LeafSprite, LEAF_STRIDE, BRANCH_STRIDE};
