use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::common::config::SettingsProvider;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ScreenId(pub u32);

/// Snapshot of a physical display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenInfo {
    pub id: ScreenId,
    /// The whole display, menu bar and dock included.
    pub frame: Rect,
    /// The display with the menu bar and dock excluded.
    pub visible_frame: Rect,
}

impl ScreenInfo {
    pub fn new(id: ScreenId, frame: Rect, visible_frame: Rect) -> Self {
        Self { id, frame, visible_frame }
    }

    pub fn full_frame(&self) -> Rect { self.frame }

    pub fn frame_excluding_dock_and_menu(&self) -> Rect { self.visible_frame }

    /// Returns the rectangle windows on this screen may be tiled into.
    pub fn adjusted_frame(&self, settings: &dyn SettingsProvider) -> Rect {
        self.adjusted_frame_with(settings, false)
    }

    /// Like [`adjusted_frame`](Self::adjusted_frame), optionally skipping the
    /// half-margin inset for layouts that fill the region edge to edge.
    ///
    /// The steps run in a fixed order: base frame, half-margin inset,
    /// minimum-size floor, explicit per-edge padding. Padding always comes
    /// last so the floor never eats into it.
    pub fn adjusted_frame_with(
        &self,
        settings: &dyn SettingsProvider,
        disable_window_margins: bool,
    ) -> Rect {
        let mut frame = if settings.ignore_menu_bar() {
            self.full_frame()
        } else {
            self.frame_excluding_dock_and_menu()
        };

        if settings.margins_enabled() && !disable_window_margins {
            // Each window insets itself by the other half at shared edges.
            let padding = (settings.margin_size() / 2.0).floor();
            frame.origin.x += padding;
            frame.origin.y += padding;
            frame.size.width -= 2.0 * padding;
            frame.size.height -= 2.0 * padding;
        }

        enforce_minimum_size(&mut frame, settings);

        let (top, bottom) = (settings.screen_padding_top(), settings.screen_padding_bottom());
        let (left, right) = (settings.screen_padding_left(), settings.screen_padding_right());
        frame.origin.x += left;
        frame.origin.y += top;
        frame.size.width -= left + right;
        frame.size.height -= top + bottom;

        frame
    }
}

/// Grows `frame` back out to the configured minimum size on each axis,
/// keeping the growth centred on the original rectangle.
pub(crate) fn enforce_minimum_size(frame: &mut Rect, settings: &dyn SettingsProvider) {
    let min_width = settings.minimum_window_width();
    if min_width > frame.size.width {
        frame.origin.x -= (min_width - frame.size.width) / 2.0;
        frame.size.width = min_width;
    }

    let min_height = settings.minimum_window_height();
    if min_height > frame.size.height {
        frame.origin.y -= (min_height - frame.size.height) / 2.0;
        frame.size.height = min_height;
    }
}
