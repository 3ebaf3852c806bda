use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Layout, LayoutWindow};
use crate::sys::window::WindowId;

/// Something that happened to the window set a layout is tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    Add(WindowId),
    Remove(WindowId),
    FocusChanged(WindowId),
    WindowSwap(WindowId, WindowId),
    ApplicationActivate,
    ApplicationDeactivate,
    SpaceChange,
    LayoutChange,
    Unknown,
}

/// A layout that tracks window identity across reflows, e.g. to support
/// directional navigation.
pub trait StatefulLayout: Layout {
    fn update_with_change(&self, change: &Change);

    fn next_window_id_clockwise(&self) -> Option<WindowId>;

    fn next_window_id_counter_clockwise(&self) -> Option<WindowId>;
}

/// Ordered window list with a focus cursor, for stateful layouts to embed.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowOrder {
    windows: Vec<WindowId>,
    focused: Option<WindowId>,
}

impl WindowOrder {
    pub fn new() -> Self { Self::default() }

    pub fn windows(&self) -> &[WindowId] { &self.windows }

    pub fn focused(&self) -> Option<WindowId> { self.focused }

    pub fn apply(&mut self, change: &Change) {
        trace!(?change, "window order change");
        match *change {
            Change::Add(wid) => self.insert(wid),
            Change::Remove(wid) => {
                self.windows.retain(|&w| w != wid);
                if self.focused == Some(wid) {
                    self.focused = None;
                }
            }
            Change::FocusChanged(wid) => {
                self.insert(wid);
                self.focused = Some(wid);
            }
            Change::WindowSwap(a, b) => {
                let pos_a = self.position(a);
                let pos_b = self.position(b);
                if let (Some(i), Some(j)) = (pos_a, pos_b) {
                    self.windows.swap(i, j);
                }
            }
            Change::ApplicationActivate
            | Change::ApplicationDeactivate
            | Change::SpaceChange
            | Change::LayoutChange
            | Change::Unknown => {}
        }
    }

    /// Reconciles the order with a freshly enumerated window list: windows
    /// that disappeared are dropped, new ones are appended in list order, and
    /// the focus follows whichever window is marked focused.
    pub fn sync(&mut self, windows: &[LayoutWindow]) {
        self.windows.retain(|wid| windows.iter().any(|w| w.id == *wid));
        for window in windows {
            self.insert(window.id);
        }
        self.focused = windows.iter().find(|w| w.is_focused).map(|w| w.id);
    }

    pub fn next_clockwise(&self) -> Option<WindowId> { self.step(1) }

    pub fn next_counter_clockwise(&self) -> Option<WindowId> { self.step(-1) }

    fn step(&self, delta: isize) -> Option<WindowId> {
        let len = self.windows.len();
        if len == 0 {
            return None;
        }
        let index = match self.focused.and_then(|wid| self.position(wid)) {
            Some(current) => (current as isize + delta).rem_euclid(len as isize) as usize,
            None if delta > 0 => 0,
            None => len - 1,
        };
        Some(self.windows[index])
    }

    fn insert(&mut self, wid: WindowId) {
        if self.position(wid).is_none() {
            self.windows.push(wid);
        }
    }

    fn position(&self, wid: WindowId) -> Option<usize> { self.windows.iter().position(|&w| w == wid) }
}
