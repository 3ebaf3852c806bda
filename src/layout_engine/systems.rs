use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::FrameAssignment;
use crate::common::config::SettingsProvider;
use crate::reflow::{FrameAssigner, ReflowOperation};
use crate::sys::geometry::Rect;
use crate::sys::screen::ScreenInfo;
use crate::sys::window::WindowId;

mod paned;
mod stateful;

pub use paned::{PanedLayout, clamp_main_pane_ratio};
pub use stateful::{Change, StatefulLayout, WindowOrder};

/// What a layout knows about a window when it computes frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutWindow {
    pub id: WindowId,
    pub frame: Rect,
    pub is_focused: bool,
}

impl LayoutWindow {
    pub fn new(id: WindowId, frame: Rect, is_focused: bool) -> Self {
        Self { id, frame, is_focused }
    }
}

/// A tiling policy.
///
/// Implementations only compute frames; scheduling and applying them is
/// handled by [`ReflowOperation`] and [`FrameAssigner`]. Layouts are shared
/// with reflow workers, so any mutable state lives behind interior
/// mutability.
pub trait Layout: Send + Sync {
    /// Human readable name.
    fn layout_name(&self) -> &'static str;

    /// Stable identifier used for persistence and selection.
    fn layout_key(&self) -> &'static str;

    /// Computes one assignment per window, or `None` to decline the reflow
    /// (for example when there is nothing to lay out).
    fn frame_assignments(
        &self,
        windows: &[LayoutWindow],
        screen: &ScreenInfo,
        settings: &dyn SettingsProvider,
    ) -> Option<Vec<FrameAssignment>>;

    /// Layouts that never move windows (floating) return false.
    fn reflows(&self) -> bool { true }
}

impl dyn Layout {
    /// Packages a reflow of `windows` on `screen` under this layout.
    ///
    /// The window list and screen are snapshotted into the operation; the
    /// frames themselves are computed when the operation runs.
    pub fn reflow(
        self: Arc<Self>,
        windows: Vec<LayoutWindow>,
        screen: ScreenInfo,
        frame_assigner: FrameAssigner,
    ) -> Option<ReflowOperation> {
        if !self.reflows() {
            return None;
        }
        Some(ReflowOperation::for_layout(screen, windows, self, frame_assigner))
    }
}
