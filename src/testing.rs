//! Fakes for the window system and a small main-pane layout used by the unit
//! tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::common::collections::HashMap;
use crate::common::config::SettingsProvider;
use crate::layout_engine::{
    Change, FrameAssignment, Layout, LayoutWindow, PanedLayout, ResizeRules, StatefulLayout,
    UnconstrainedDimension, WindowOrder,
};
use crate::sys::geometry::{Rect, Size};
use crate::sys::screen::ScreenInfo;
use crate::sys::window::{WindowActivityCache, WindowError, WindowId, WindowSystem};

#[derive(Debug, Clone, Copy)]
struct FakeWindow {
    frame: Rect,
    min_size: Size,
}

/// A window system that records every successful write and, like some real
/// applications, refuses to shrink a window below its own minimum size.
#[derive(Default)]
pub struct FakeWindows {
    windows: Mutex<HashMap<WindowId, FakeWindow>>,
    writes: Mutex<Vec<(WindowId, Rect)>>,
}

impl FakeWindows {
    pub fn new() -> Self { Self::default() }

    pub fn add(&self, wid: WindowId, frame: Rect) {
        self.windows.lock().insert(wid, FakeWindow { frame, min_size: Size::ZERO });
    }

    pub fn set_minimum_size(&self, wid: WindowId, min_size: Size) {
        if let Some(window) = self.windows.lock().get_mut(&wid) {
            window.min_size = min_size;
        }
    }

    pub fn frame_of(&self, wid: WindowId) -> Option<Rect> {
        self.windows.lock().get(&wid).map(|w| w.frame)
    }

    /// Requested frames, in the order they were written.
    pub fn writes(&self) -> Vec<(WindowId, Rect)> { self.writes.lock().clone() }
}

impl WindowSystem for FakeWindows {
    fn frame(&self, wid: WindowId) -> Result<Rect, WindowError> {
        self.frame_of(wid).ok_or(WindowError::Gone(wid))
    }

    fn set_frame(&self, wid: WindowId, frame: Rect, threshold: Size) -> Result<(), WindowError> {
        let mut windows = self.windows.lock();
        let window = windows.get_mut(&wid).ok_or(WindowError::Gone(wid))?;

        let moved = (frame.origin.x - window.frame.origin.x).abs() >= threshold.width
            || (frame.origin.y - window.frame.origin.y).abs() >= threshold.height;
        if moved {
            window.frame.origin = frame.origin;
        }
        window.frame.size = Size::new(
            frame.size.width.max(window.min_size.width),
            frame.size.height.max(window.min_size.height),
        );

        self.writes.lock().push((wid, frame));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeActivity {
    active: Mutex<HashMap<WindowId, bool>>,
}

impl FakeActivity {
    pub fn new() -> Self { Self::default() }

    pub fn set_active(&self, wid: WindowId, active: bool) { self.active.lock().insert(wid, active); }
}

impl WindowActivityCache for FakeActivity {
    fn window_is_active(&self, wid: WindowId) -> bool {
        self.active.lock().get(&wid).copied().unwrap_or(false)
    }
}

/// Main pane on the left, remaining windows stacked on the right.
pub struct TallLayout {
    ratio: Mutex<f64>,
    main_count: AtomicUsize,
    order: Mutex<WindowOrder>,
    assignment_calls: AtomicUsize,
    reflows: bool,
}

impl TallLayout {
    pub fn new() -> Self {
        Self {
            ratio: Mutex::new(0.5),
            main_count: AtomicUsize::new(1),
            order: Mutex::new(WindowOrder::new()),
            assignment_calls: AtomicUsize::new(0),
            reflows: true,
        }
    }

    pub fn floating() -> Self { Self { reflows: false, ..Self::new() } }

    pub fn assignment_calls(&self) -> usize { self.assignment_calls.load(Ordering::SeqCst) }

    pub fn main_count(&self) -> usize { self.main_count.load(Ordering::SeqCst) }
}

impl Layout for TallLayout {
    fn layout_name(&self) -> &'static str { "Tall" }

    fn layout_key(&self) -> &'static str { "tall" }

    fn frame_assignments(
        &self,
        windows: &[LayoutWindow],
        screen: &ScreenInfo,
        settings: &dyn SettingsProvider,
    ) -> Option<Vec<FrameAssignment>> {
        self.assignment_calls.fetch_add(1, Ordering::SeqCst);
        if windows.is_empty() {
            return None;
        }

        let region = screen.adjusted_frame(settings);
        let main_count = self.main_count().min(windows.len());
        let secondary_count = windows.len() - main_count;
        let main_width = if secondary_count == 0 {
            region.width()
        } else {
            (region.width() * self.main_pane_ratio()).round()
        };
        let secondary_width = region.width() - main_width;

        let assignments = windows
            .iter()
            .enumerate()
            .map(|(i, window)| {
                let is_main = i < main_count;
                let (x, width, count, slot) = if is_main {
                    (region.origin.x, main_width, main_count, i)
                } else {
                    (region.origin.x + main_width, secondary_width, secondary_count, i - main_count)
                };
                let height = region.height() / count as f64;
                let frame = Rect::from_xywh(x, region.origin.y + height * slot as f64, width, height);
                let rules = ResizeRules::new(
                    is_main,
                    UnconstrainedDimension::Horizontal,
                    region.width() / width,
                );
                FrameAssignment::new(frame, window.id, window.is_focused, region, rules)
            })
            .collect();
        Some(assignments)
    }

    fn reflows(&self) -> bool { self.reflows }
}

impl PanedLayout for TallLayout {
    fn main_pane_ratio(&self) -> f64 { *self.ratio.lock() }

    fn set_main_pane_raw_ratio(&self, ratio: f64) { *self.ratio.lock() = ratio; }

    fn increase_main_pane_count(&self) { self.main_count.fetch_add(1, Ordering::SeqCst); }

    fn decrease_main_pane_count(&self) {
        let _ = self
            .main_count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1).max(1)));
    }
}

impl StatefulLayout for TallLayout {
    fn update_with_change(&self, change: &Change) { self.order.lock().apply(change); }

    fn next_window_id_clockwise(&self) -> Option<WindowId> { self.order.lock().next_clockwise() }

    fn next_window_id_counter_clockwise(&self) -> Option<WindowId> {
        self.order.lock().next_counter_clockwise()
    }
}
