use serde::{Deserialize, Serialize};

use crate::common::config::SettingsProvider;
use crate::sys::geometry::Rect;

/// The axis of a window's frame that a layout's ratio math is free to vary.
///
/// The other axis is fully determined by screen and pane geometry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnconstrainedDimension {
    Horizontal,
    Vertical,
}

/// Per-window policy describing how a tiled frame relates to the main pane
/// ratio that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeRules {
    /// The window belongs to the main pane group.
    pub is_main: bool,
    pub unconstrained_dimension: UnconstrainedDimension,
    /// Extent of the tiled region along the unconstrained axis divided by the
    /// extent of this window's pane, so that `dimension / pane / scale_factor`
    /// is a fraction of the whole region. Must be positive.
    pub scale_factor: f64,
}

impl ResizeRules {
    pub fn new(
        is_main: bool,
        unconstrained_dimension: UnconstrainedDimension,
        scale_factor: f64,
    ) -> Self {
        debug_assert!(scale_factor > 0.0, "scale factor must be positive: {scale_factor}");
        Self {
            is_main,
            unconstrained_dimension,
            scale_factor,
        }
    }

    /// Size of `frame` along the unconstrained axis.
    ///
    /// With `negate_padding`, the margin padding that
    /// [`FrameAssignment::final_frame`](super::FrameAssignment::final_frame)
    /// removed is added back, so a frame observed on screen can be compared
    /// against the ideal frame it was derived from.
    pub fn scaled_dimension(
        &self,
        frame: Rect,
        negate_padding: bool,
        settings: &dyn SettingsProvider,
    ) -> f64 {
        let dimension = match self.unconstrained_dimension {
            UnconstrainedDimension::Horizontal => frame.width(),
            UnconstrainedDimension::Vertical => frame.height(),
        };
        if negate_padding {
            dimension + margin_padding(settings)
        } else {
            dimension
        }
    }
}

/// Total margin removed from a tiled frame along one axis: half the margin
/// (rounded down) on each of the two edges.
pub(crate) fn margin_padding(settings: &dyn SettingsProvider) -> f64 {
    if settings.margins_enabled() {
        2.0 * (settings.margin_size() / 2.0).floor()
    } else {
        0.0
    }
}
