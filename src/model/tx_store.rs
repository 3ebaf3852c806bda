use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};

use crate::common::collections::BuildHasher;
use crate::layout_engine::FrameAssignment;
use crate::sys::geometry::Rect;
use crate::sys::window::WindowId;

/// A per-window counter that increases every time a frame assignment is
/// applied to the window.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(u32);

#[derive(Clone, Copy, Debug)]
pub struct TxRecord {
    pub txid: TransactionId,
    pub assignment: FrameAssignment,
}

/// Thread-safe cache of the last assignment applied to each window.
///
/// Reflow workers write to it; the owner reads it to interpret frame change
/// events (our own write, or the user dragging a tiled window).
#[derive(Clone, Default, Debug)]
pub struct AssignmentStore(Arc<DashMap<WindowId, TxRecord, BuildHasher>>);

impl AssignmentStore {
    pub fn new() -> Self { Self::default() }

    /// Records `assignment` as the latest one for its window and returns the
    /// transaction id it was given.
    pub fn record(&self, assignment: FrameAssignment) -> TransactionId {
        match self.0.entry(assignment.window) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.txid.0 += 1;
                record.assignment = assignment;
                record.txid
            }
            Entry::Vacant(entry) => {
                let txid = TransactionId(1);
                entry.insert(TxRecord { txid, assignment });
                txid
            }
        }
    }

    pub fn get(&self, wid: &WindowId) -> Option<TxRecord> { self.0.get(wid).map(|entry| *entry) }

    /// The ideal frame last assigned to `wid`, before margins and minimum
    /// sizes.
    pub fn target_frame(&self, wid: &WindowId) -> Option<Rect> {
        self.get(wid).map(|record| record.assignment.frame)
    }

    pub fn remove(&self, wid: &WindowId) { self.0.remove(wid); }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}
