use tracing::warn;

use super::Layout;
use crate::common::config::SettingsProvider;
use crate::layout_engine::FrameAssignment;
use crate::sys::geometry::Rect;

/// A layout with a main pane whose share of the screen is a ratio in
/// `[0, 1]`.
///
/// Implementors provide storage for the ratio and the main pane count; the
/// ratio adjustments are built on top of those.
pub trait PanedLayout: Layout {
    fn main_pane_ratio(&self) -> f64;

    /// Stores `ratio` verbatim. Use
    /// [`recommend_main_pane_ratio`](Self::recommend_main_pane_ratio) instead
    /// of calling this directly.
    fn set_main_pane_raw_ratio(&self, ratio: f64);

    fn increase_main_pane_count(&self);

    fn decrease_main_pane_count(&self);

    /// Sets the main pane ratio, clamping out-of-range values into `[0, 1]`.
    /// A NaN ratio is ignored.
    fn recommend_main_pane_ratio(&self, ratio: f64) {
        if ratio.is_nan() {
            warn!(layout = self.layout_key(), "ignoring NaN main pane ratio");
            return;
        }
        self.set_main_pane_raw_ratio(clamp_main_pane_ratio(ratio));
    }

    fn expand_main_pane(&self, settings: &dyn SettingsProvider) {
        self.recommend_main_pane_ratio(self.main_pane_ratio() + settings.resize_step());
    }

    fn shrink_main_pane(&self, settings: &dyn SettingsProvider) {
        self.recommend_main_pane_ratio(self.main_pane_ratio() - settings.resize_step());
    }

    /// Adopts the ratio implied by the user resizing the window behind
    /// `assignment` to `observed_frame`.
    fn apply_manual_resize(
        &self,
        assignment: &FrameAssignment,
        observed_frame: Rect,
        settings: &dyn SettingsProvider,
    ) {
        self.recommend_main_pane_ratio(assignment.implied_main_pane_ratio(observed_frame, settings));
    }
}

pub fn clamp_main_pane_ratio(ratio: f64) -> f64 {
    if (0.0..=1.0).contains(&ratio) {
        return ratio;
    }
    let clamped = ratio.clamp(0.0, 1.0);
    warn!(ratio, clamped, "main pane ratio out of range");
    clamped
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::common::config::Settings;
    use crate::layout_engine::{LayoutWindow, ResizeRules, UnconstrainedDimension};
    use crate::sys::screen::{ScreenId, ScreenInfo};
    use crate::sys::window::WindowId;
    use crate::testing::TallLayout;

    #[test]
    fn recommended_ratio_is_clamped() {
        let layout = TallLayout::new();

        layout.recommend_main_pane_ratio(1.5);
        assert_eq!(layout.main_pane_ratio(), 1.0);

        layout.recommend_main_pane_ratio(-0.2);
        assert_eq!(layout.main_pane_ratio(), 0.0);

        layout.recommend_main_pane_ratio(0.5);
        assert_eq!(layout.main_pane_ratio(), 0.5);
    }

    #[test]
    fn nan_ratio_is_ignored() {
        let layout = TallLayout::new();
        layout.recommend_main_pane_ratio(0.3);
        layout.recommend_main_pane_ratio(f64::NAN);
        assert_eq!(layout.main_pane_ratio(), 0.3);
    }

    #[test]
    fn expand_and_shrink_move_by_resize_step() {
        let settings = Settings {
            window_resize_step: 0.25,
            ..Settings::default()
        };
        let layout = TallLayout::new();
        layout.recommend_main_pane_ratio(0.5);

        layout.expand_main_pane(&settings);
        assert_eq!(layout.main_pane_ratio(), 0.75);
        layout.expand_main_pane(&settings);
        layout.expand_main_pane(&settings);
        assert_eq!(layout.main_pane_ratio(), 1.0);

        layout.shrink_main_pane(&settings);
        assert_eq!(layout.main_pane_ratio(), 0.75);
    }

    #[test]
    fn manual_resize_of_secondary_window_grows_main_pane() {
        let settings = Settings::default();
        let layout = TallLayout::new();
        layout.recommend_main_pane_ratio(0.5);

        // The secondary pane was half the screen and the user shrank it to 400.
        let frame = Rect::from_xywh(500.0, 0.0, 500.0, 1000.0);
        let assignment = FrameAssignment::new(
            frame,
            WindowId::new(1, 2),
            false,
            Rect::from_xywh(0.0, 0.0, 1000.0, 1000.0),
            ResizeRules::new(false, UnconstrainedDimension::Horizontal, 2.0),
        );
        layout.apply_manual_resize(&assignment, Rect::from_xywh(600.0, 0.0, 400.0, 1000.0), &settings);

        assert!((layout.main_pane_ratio() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn main_pane_count_moves_windows_between_panes() {
        let settings = Settings::default();
        let layout = TallLayout::new();
        let screen = ScreenInfo::new(
            ScreenId(1),
            Rect::from_xywh(0.0, 0.0, 1000.0, 1000.0),
            Rect::from_xywh(0.0, 0.0, 1000.0, 1000.0),
        );
        let windows: Vec<_> = (1..=3)
            .map(|i| LayoutWindow::new(WindowId::new(1, i), Rect::default(), i == 1))
            .collect();

        layout.increase_main_pane_count();
        assert_eq!(layout.main_count(), 2);
        let assignments = layout.frame_assignments(&windows, &screen, &settings).unwrap();
        let main: Vec<_> = assignments.iter().filter(|a| a.resize_rules.is_main).collect();
        assert_eq!(main.len(), 2);
        assert_eq!(main[1].frame, Rect::from_xywh(0.0, 500.0, 500.0, 500.0));

        layout.decrease_main_pane_count();
        layout.decrease_main_pane_count();
        assert_eq!(layout.main_count(), 1);
    }

    #[test]
    fn clamp_passes_through_in_range_values() {
        assert_eq!(clamp_main_pane_ratio(0.0), 0.0);
        assert_eq!(clamp_main_pane_ratio(1.0), 1.0);
        assert_eq!(clamp_main_pane_ratio(2.0), 1.0);
    }
}
