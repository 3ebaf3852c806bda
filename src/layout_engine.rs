//! Layout contracts and the per-window constraint math shared by every
//! tiling policy.

mod frame_assignment;
pub mod resize;
pub mod systems;

pub use frame_assignment::{FrameAssignment, finalize_frame};
pub use resize::{ResizeRules, UnconstrainedDimension};
pub use systems::{
    Change, Layout, LayoutWindow, PanedLayout, StatefulLayout, WindowOrder, clamp_main_pane_ratio,
};
