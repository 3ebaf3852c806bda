use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::resize::{ResizeRules, margin_padding};
use crate::common::config::SettingsProvider;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::enforce_minimum_size;
use crate::sys::window::{FRAME_CHANGE_THRESHOLD, WindowId, WindowSystem};

/// Applies margins and minimum sizes to a tiled frame. See
/// [`FrameAssignment::final_frame`].
pub fn finalize_frame(mut frame: Rect, settings: &dyn SettingsProvider) -> Rect {
    if settings.margins_enabled() {
        let padding = (settings.margin_size() / 2.0).floor();
        frame.origin.x += padding;
        frame.origin.y += padding;
        frame.size.width -= 2.0 * padding;
        frame.size.height -= 2.0 * padding;
    }

    enforce_minimum_size(&mut frame, settings);
    frame
}

/// One window paired with the frame a layout wants it to occupy.
///
/// Built fresh by a layout on every reflow pass and consumed once by a
/// [`FrameAssigner`](crate::reflow::FrameAssigner). The layout is responsible
/// for keeping `frame` inside `screen_frame`; nothing here checks it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameAssignment {
    /// Ideal tiled frame, before margins and minimum sizes are applied.
    pub frame: Rect,
    pub window: WindowId,
    /// Whether the window had focus when the assignment was built.
    pub focused: bool,
    /// Usable screen region the frame was tiled into.
    pub screen_frame: Rect,
    pub resize_rules: ResizeRules,
}

impl FrameAssignment {
    pub fn new(
        frame: Rect,
        window: WindowId,
        focused: bool,
        screen_frame: Rect,
        resize_rules: ResizeRules,
    ) -> Self {
        Self {
            frame,
            window,
            focused,
            screen_frame,
            resize_rules,
        }
    }

    /// The frame actually written to the window.
    ///
    /// First the half margin is taken off every edge (the screen region was
    /// grown by the same amount, so neighbours end up one full margin apart),
    /// then each axis is grown back to the configured minimum, centred on the
    /// shrunk frame.
    pub fn final_frame(&self, settings: &dyn SettingsProvider) -> Rect {
        finalize_frame(self.frame, settings)
    }

    /// The main pane ratio implied by the window now occupying
    /// `observed_frame` instead of [`frame`](Self::frame).
    ///
    /// `observed_frame` is what the window system reports after a manual
    /// resize, so the margin padding is added back before comparing. The
    /// result is not clamped.
    pub fn implied_main_pane_ratio(
        &self,
        observed_frame: Rect,
        settings: &dyn SettingsProvider,
    ) -> f64 {
        let rules = &self.resize_rules;
        let old_dimension = rules.scaled_dimension(self.frame, false, settings);
        let new_dimension = rules.scaled_dimension(observed_frame, true, settings);
        let implied = new_dimension / old_dimension / rules.scale_factor;

        if rules.is_main { implied } else { 1.0 - implied }
    }

    /// Writes the final frame to the live window.
    ///
    /// A focused window is first resized in place and measured, because
    /// applications may refuse sizes below their own minimums. Its origin is
    /// then pulled back so the measured frame stays entirely on screen.
    ///
    /// Window system errors are logged and otherwise ignored; the window may
    /// have disappeared since the batch was checked. Returns whether the final
    /// frame was written.
    pub fn perform(&self, windows: &dyn WindowSystem, settings: &dyn SettingsProvider) -> bool {
        let mut final_frame = self.final_frame(settings);
        let mut final_origin = final_frame.origin;

        if self.focused {
            if let Some(size) = self.measure_size(windows, final_frame.size) {
                final_frame.size = size;
            }
            final_origin = clamp_origin(final_origin, final_frame.size, self.screen_frame);
        }

        final_frame.origin = final_origin;
        trace!(wid = ?self.window, frame = %final_frame, "setting frame");
        match windows.set_frame(self.window, final_frame, FRAME_CHANGE_THRESHOLD) {
            Ok(()) => true,
            Err(e) => {
                debug!(wid = ?self.window, "failed to set frame: {e}");
                false
            }
        }
    }

    /// Resizes the window to `requested` at its current origin and returns the
    /// larger of the requested and resulting size on each axis.
    fn measure_size(&self, windows: &dyn WindowSystem, requested: Size) -> Option<Size> {
        let current = match windows.frame(self.window) {
            Ok(frame) => frame,
            Err(e) => {
                debug!(wid = ?self.window, "could not read frame before peeking: {e}");
                return None;
            }
        };

        let probe = Rect::new(current.origin, requested);
        if let Err(e) = windows.set_frame(self.window, probe, FRAME_CHANGE_THRESHOLD) {
            debug!(wid = ?self.window, "failed to resize before peeking: {e}");
            return None;
        }

        let actual = match windows.frame(self.window) {
            Ok(frame) => frame.size,
            Err(e) => {
                debug!(wid = ?self.window, "could not measure window after resize: {e}");
                return None;
            }
        };

        Some(Size::new(
            actual.width.max(requested.width),
            actual.height.max(requested.height),
        ))
    }
}

/// Moves `origin` so a frame of `size` fits inside `screen`. When the frame is
/// larger than the screen its top-left corner is pinned to the screen's.
fn clamp_origin(origin: Point, size: Size, screen: Rect) -> Point {
    let (min, max) = (screen.min(), screen.max());
    Point::new(
        min.x.max(origin.x.min(max.x - size.width)),
        min.y.max(origin.y.min(max.y - size.height)),
    )
}
