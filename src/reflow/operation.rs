use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::frame_assigner::{BatchOutcome, FrameAssigner};
use super::queue::{EnqueueResult, ReflowQueue};
use crate::common::config::SettingsProvider;
use crate::layout_engine::{FrameAssignment, Layout, LayoutWindow};
use crate::sys::screen::ScreenInfo;
use crate::sys::window::WindowId;

type Completion = Box<dyn FnOnce() + Send + 'static>;

/// How a reflow operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflowOutcome {
    /// Cancelled before it started; nothing was computed or moved.
    Cancelled,
    /// The layout declined to produce assignments.
    NoAssignments,
    /// A target window was gone, so the batch was dropped.
    Skipped { inactive: WindowId },
    Applied { count: usize },
}

enum AssignmentSource {
    Layout(Arc<dyn Layout>),
    Precomputed(Vec<FrameAssignment>),
}

/// A single, cancellable reflow of one screen's windows.
///
/// Runs at most once, normally on a [`ReflowQueue`] worker. Cancellation is
/// checked once when the operation starts; an operation that is already
/// applying frames finishes its batch.
pub struct ReflowOperation {
    screen: ScreenInfo,
    windows: Vec<LayoutWindow>,
    source: AssignmentSource,
    frame_assigner: FrameAssigner,
    token: CancellationToken,
    /// Callbacks in registration order.
    completions: Vec<Completion>,
    /// Index into `completions` of the current reflow completion.
    reflow_completion: Option<usize>,
}

impl ReflowOperation {
    /// An operation that asks `layout` for assignments when it runs.
    pub fn for_layout(
        screen: ScreenInfo,
        windows: Vec<LayoutWindow>,
        layout: Arc<dyn Layout>,
        frame_assigner: FrameAssigner,
    ) -> Self {
        Self::new(screen, windows, AssignmentSource::Layout(layout), frame_assigner)
    }

    /// An operation that applies an already computed list of assignments.
    pub fn with_assignments(
        screen: ScreenInfo,
        windows: Vec<LayoutWindow>,
        assignments: Vec<FrameAssignment>,
        frame_assigner: FrameAssigner,
    ) -> Self {
        Self::new(
            screen,
            windows,
            AssignmentSource::Precomputed(assignments),
            frame_assigner,
        )
    }

    fn new(
        screen: ScreenInfo,
        windows: Vec<LayoutWindow>,
        source: AssignmentSource,
        frame_assigner: FrameAssigner,
    ) -> Self {
        Self {
            screen,
            windows,
            source,
            frame_assigner,
            token: CancellationToken::new(),
            completions: Vec::new(),
            reflow_completion: None,
        }
    }

    pub fn screen(&self) -> &ScreenInfo { &self.screen }

    pub fn windows(&self) -> &[LayoutWindow] { &self.windows }

    /// A handle that cancels this operation, usable after it is enqueued.
    pub fn cancellation_token(&self) -> CancellationToken { self.token.clone() }

    pub fn cancel(&self) { self.token.cancel() }

    pub fn is_cancelled(&self) -> bool { self.token.is_cancelled() }

    /// Registers a callback that runs when the operation finishes, whether or
    /// not it was cancelled.
    pub fn add_completion_listener(&mut self, f: impl FnOnce() + Send + 'static) {
        self.completions.push(Box::new(f));
    }

    /// Sets the reflow completion callback.
    ///
    /// A previously set reflow completion stays chained as a plain listener.
    /// Every callback runs in registration order; only the one set last is
    /// skipped when the operation was cancelled.
    pub fn set_completion(&mut self, f: impl FnOnce() + Send + 'static) {
        self.reflow_completion = Some(self.completions.len());
        self.completions.push(Box::new(f));
    }

    /// The assignments this operation will apply, or `None` if there is
    /// nothing to do.
    pub fn frame_assignments(&self) -> Option<Vec<FrameAssignment>> {
        let settings = self.frame_assigner.settings().snapshot();
        self.frame_assignments_with(&*settings)
    }

    fn frame_assignments_with(
        &self,
        settings: &dyn SettingsProvider,
    ) -> Option<Vec<FrameAssignment>> {
        match &self.source {
            AssignmentSource::Layout(layout) => {
                layout.frame_assignments(&self.windows, &self.screen, settings)
            }
            AssignmentSource::Precomputed(assignments) => Some(assignments.clone()),
        }
    }

    /// Computes and applies the frames. Completion callbacks are not fired
    /// here; [`run`](Self::run) is the full operation and what queue workers
    /// call.
    ///
    /// Layout and frame assigner read the same settings snapshot, so a
    /// reload in the middle of the batch takes effect on the next reflow.
    #[instrument(name = "reflow", skip_all, fields(screen = ?self.screen.id, windows = self.windows.len()))]
    pub fn main(&self) -> ReflowOutcome {
        if self.is_cancelled() {
            debug!("reflow cancelled before it started");
            return ReflowOutcome::Cancelled;
        }

        let settings = self.frame_assigner.settings().snapshot();
        let Some(assignments) = self.frame_assignments_with(&*settings) else {
            debug!("no frame assignments");
            return ReflowOutcome::NoAssignments;
        };

        match self.frame_assigner.perform_frame_assignments(&assignments, &*settings) {
            BatchOutcome::Applied { count } => ReflowOutcome::Applied { count },
            BatchOutcome::Skipped { inactive } => ReflowOutcome::Skipped { inactive },
        }
    }

    /// Runs the operation to completion on the current thread and fires its
    /// completion callbacks. This is the entry point queue workers use.
    pub fn run(self) -> ReflowOutcome {
        let outcome = self.main();
        self.finish();
        outcome
    }

    /// Hands the operation to `queue` to be run on a worker thread.
    pub fn enqueue(self, queue: &ReflowQueue) -> EnqueueResult { queue.enqueue(self) }

    fn finish(self) {
        let skip = if self.is_cancelled() { self.reflow_completion } else { None };
        for (i, completion) in self.completions.into_iter().enumerate() {
            if Some(i) == skip {
                debug!("skipping reflow completion of cancelled operation");
                continue;
            }
            completion();
        }
    }
}

impl fmt::Debug for ReflowOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            AssignmentSource::Layout(layout) => layout.layout_key(),
            AssignmentSource::Precomputed(_) => "precomputed",
        };
        f.debug_struct("ReflowOperation")
            .field("screen", &self.screen.id)
            .field("windows", &self.windows.len())
            .field("source", &source)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

static_assertions::assert_impl_all!(ReflowOperation: Send);
static_assertions::assert_impl_all!(FrameAssigner: Send, Sync);
