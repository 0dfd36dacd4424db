pub mod geometry;
pub mod handler;
pub mod hit;
pub mod paint;
pub mod status_overlay;
pub mod svg;
pub mod tabular;
pub mod tree;

pub use geometry::{Geometry, Outline};
pub use handler::{Capabilities, ResizeScale, ShapeHandler, ShapeRegistry};
pub use hit::{hit_test, hit_test_rect};
pub use paint::paint_tree;
pub use status_overlay::StatusOverlayHandler;
pub use svg::{render_svg, tree_to_svg};
pub use tabular::TabularDataHandler;
pub use tree::{Def, Fill, StrokeStyle, TextAlign, UiAction, VisualNode, VisualTree};
