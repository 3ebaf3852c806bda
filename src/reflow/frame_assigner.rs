use std::sync::Arc;

use tracing::{debug, instrument};

use crate::common::config::{SettingsProvider, SharedSettings};
use crate::layout_engine::FrameAssignment;
use crate::model::AssignmentStore;
use crate::sys::window::{WindowActivityCache, WindowId, WindowSystem};

/// Result of applying one batch of frame assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every assignment was performed.
    Applied { count: usize },
    /// The batch was dropped untouched because a target window was gone.
    Skipped { inactive: WindowId },
}

/// Applies batches of frame assignments to live windows.
#[derive(Clone)]
pub struct FrameAssigner {
    windows: Arc<dyn WindowSystem>,
    activity: Arc<dyn WindowActivityCache>,
    settings: SharedSettings,
    store: Option<AssignmentStore>,
}

impl FrameAssigner {
    pub fn new(
        windows: Arc<dyn WindowSystem>,
        activity: Arc<dyn WindowActivityCache>,
        settings: SharedSettings,
    ) -> Self {
        Self {
            windows,
            activity,
            settings,
            store: None,
        }
    }

    /// Records every performed assignment in `store`.
    pub fn with_store(mut self, store: AssignmentStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn settings(&self) -> &SharedSettings { &self.settings }

    pub fn store(&self) -> Option<&AssignmentStore> { self.store.as_ref() }

    /// Applies `assignments` in order, or none of them.
    ///
    /// Every target window is checked for liveness before anything is moved,
    /// so a window set that changed since the layout ran never produces a
    /// half-applied layout. The check is advisory: a window closing between
    /// the check and its own write is tolerated and not retried.
    ///
    /// `settings` must be the snapshot the assignments were computed from.
    /// Only frames that reached the window are recorded in the store.
    #[instrument(skip_all, fields(count = assignments.len()))]
    pub fn perform_frame_assignments(
        &self,
        assignments: &[FrameAssignment],
        settings: &dyn SettingsProvider,
    ) -> BatchOutcome {
        if let Some(inactive) = assignments
            .iter()
            .map(|a| a.window)
            .find(|&wid| !self.activity.window_is_active(wid))
        {
            debug!(?inactive, "window is no longer active, skipping batch");
            return BatchOutcome::Skipped { inactive };
        }

        for assignment in assignments {
            let written = assignment.perform(&*self.windows, settings);
            if let (true, Some(store)) = (written, &self.store) {
                store.record(*assignment);
            }
        }

        BatchOutcome::Applied { count: assignments.len() }
    }
}
