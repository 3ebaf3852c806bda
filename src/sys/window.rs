//! The narrow slice of the live window system the reflow core talks to.
//!
//! Windows are owned by the window system; the core only ever holds a
//! [`WindowId`] and resolves it through these traits when it needs to read or
//! write a frame.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::{Rect, Size};

#[allow(non_camel_case_types)]
pub type pid_t = i32;

/// Stable identity of a window: the owning process plus a per-process index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId {
    pub pid: pid_t,
    pub idx: NonZeroU32,
}

impl WindowId {
    #[cfg(test)]
    pub(crate) fn new(pid: pid_t, idx: u32) -> WindowId {
        WindowId {
            pid,
            idx: NonZeroU32::new(idx).unwrap(),
        }
    }
}

impl fmt::Debug for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowId({}, {})", self.pid, self.idx)
    }
}

/// Positional slack passed to [`WindowSystem::set_frame`] so that moves
/// smaller than a pixel are skipped by the window system.
pub const FRAME_CHANGE_THRESHOLD: Size = Size::new(1.0, 1.0);

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("window {0:?} no longer exists")]
    Gone(WindowId),
    #[error("window system error: {0}")]
    Backend(String),
}

/// Read and write access to live window frames.
///
/// `set_frame` is allowed to silently clamp the requested size; callers that
/// care about the resulting size must read it back with `frame`.
pub trait WindowSystem: Send + Sync {
    fn frame(&self, wid: WindowId) -> Result<Rect, WindowError>;
    fn set_frame(&self, wid: WindowId, frame: Rect, threshold: Size) -> Result<(), WindowError>;
}

/// Answers whether a window is still alive and eligible for layout.
pub trait WindowActivityCache: Send + Sync {
    fn window_is_active(&self, wid: WindowId) -> bool;
}
