use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, error, trace};

use super::operation::ReflowOperation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueResult {
    Enqueued,
    ChannelClosed,
}

/// Parallel queue that runs reflow operations on a pool of worker threads.
///
/// Operations for different screens may run concurrently. Nothing here orders
/// operations that target the same screen; callers that need strict ordering
/// must wait for one operation's completion before enqueueing the next.
///
/// Dropping the queue lets the workers finish what is already queued and
/// then exit.
pub struct ReflowQueue {
    sender: Sender<ReflowOperation>,
    in_flight: Arc<AtomicUsize>,
}

impl ReflowQueue {
    pub fn new() -> io::Result<Self> {
        let worker_count = thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(2)
            .clamp(2, 6);
        Self::with_workers(worker_count)
    }

    pub fn with_workers(worker_count: usize) -> io::Result<Self> {
        let (tx, rx) = unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        for i in 0..worker_count.max(1) {
            let rx = rx.clone();
            let in_flight = in_flight.clone();
            thread::Builder::new()
                .name(format!("reflow-worker-{i}"))
                .spawn(move || worker_loop(rx, in_flight))?;
        }

        Ok(Self { sender: tx, in_flight })
    }

    pub fn enqueue(&self, op: ReflowOperation) -> EnqueueResult {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        trace!(?op, "enqueueing reflow");
        if self.sender.send(op).is_ok() {
            EnqueueResult::Enqueued
        } else {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            EnqueueResult::ChannelClosed
        }
    }

    /// Operations enqueued but not yet finished.
    pub fn in_flight(&self) -> usize { self.in_flight.load(Ordering::Acquire) }
}

fn worker_loop(rx: Receiver<ReflowOperation>, in_flight: Arc<AtomicUsize>) {
    while let Ok(op) = rx.recv() {
        // A panicking layout or callback must not take the worker down with it.
        let result = panic::catch_unwind(AssertUnwindSafe(move || op.run()));
        in_flight.fetch_sub(1, Ordering::AcqRel);
        match result {
            Ok(outcome) => debug!(?outcome, "reflow finished"),
            Err(payload) => error!(reason = panic_message(&*payload), "reflow panicked"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::common::config::{Settings, SettingsProvider, SharedSettings};
    use crate::layout_engine::{FrameAssignment, Layout, LayoutWindow};
    use crate::reflow::FrameAssigner;
    use crate::sys::geometry::Rect;
    use crate::sys::screen::{ScreenId, ScreenInfo};
    use crate::sys::window::WindowId;
    use crate::testing::{FakeActivity, FakeWindows, TallLayout};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn screen(id: u32, x: f64) -> ScreenInfo {
        let frame = Rect::from_xywh(x, 0.0, 1000.0, 1000.0);
        ScreenInfo::new(ScreenId(id), frame, frame)
    }

    #[test]
    fn runs_operations_for_several_screens() {
        let windows = Arc::new(FakeWindows::new());
        let activity = Arc::new(FakeActivity::new());
        let assigner = FrameAssigner::new(
            windows.clone(),
            activity.clone(),
            SharedSettings::new(Settings::default()),
        );
        let queue = ReflowQueue::with_workers(2).unwrap();
        let (done_tx, done_rx) = crossbeam_channel::unbounded();

        for screen_idx in 0..3u32 {
            let wid = WindowId::new(10 + screen_idx as i32, 1);
            let frame = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
            windows.add(wid, frame);
            activity.set_active(wid, true);

            let layout: Arc<dyn Layout> = Arc::new(TallLayout::new());
            let screen = screen(screen_idx, 1000.0 * screen_idx as f64);
            let mut op = layout
                .reflow(vec![LayoutWindow::new(wid, frame, false)], screen, assigner.clone())
                .unwrap();
            let done_tx = done_tx.clone();
            op.set_completion(move || done_tx.send(wid).unwrap());
            assert_eq!(op.enqueue(&queue), EnqueueResult::Enqueued);
        }

        let mut finished: Vec<WindowId> =
            (0..3).map(|_| done_rx.recv_timeout(TIMEOUT).unwrap()).collect();
        finished.sort();
        assert_eq!(finished, vec![
            WindowId::new(10, 1),
            WindowId::new(11, 1),
            WindowId::new(12, 1)
        ]);
        assert_eq!(
            windows.frame_of(WindowId::new(12, 1)),
            Some(Rect::from_xywh(2000.0, 0.0, 1000.0, 1000.0))
        );
    }

    #[test]
    fn cancelling_after_enqueue_suppresses_reflow_completion() {
        let windows = Arc::new(FakeWindows::new());
        let activity = Arc::new(FakeActivity::new());
        let assigner =
            FrameAssigner::new(windows.clone(), activity, SharedSettings::default());
        let queue = ReflowQueue::with_workers(1).unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();

        // Hold the only worker so the second operation is still pending when
        // it is cancelled.
        let (release_tx, release_rx) = crossbeam_channel::bounded::<()>(0);
        let mut blocker = ReflowOperation::with_assignments(
            screen(1, 0.0),
            Vec::new(),
            Vec::new(),
            assigner.clone(),
        );
        blocker.add_completion_listener(move || {
            let _ = release_rx.recv_timeout(TIMEOUT);
        });
        blocker.enqueue(&queue);

        let mut op = ReflowOperation::with_assignments(
            screen(2, 0.0),
            Vec::new(),
            Vec::new(),
            assigner,
        );
        let token = op.cancellation_token();
        let listener_tx = tx.clone();
        op.add_completion_listener(move || listener_tx.send("listener").unwrap());
        op.set_completion(move || tx.send("reflow").unwrap());
        op.enqueue(&queue);

        token.cancel();
        release_tx.send(()).unwrap();

        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), "listener");
        // The reflow completion never fires, and the sender is dropped with it.
        assert!(rx.recv_timeout(TIMEOUT).is_err());
        assert!(windows.writes().is_empty());
    }

    struct PanickingLayout;

    impl Layout for PanickingLayout {
        fn layout_name(&self) -> &'static str { "Panicking" }

        fn layout_key(&self) -> &'static str { "panicking" }

        fn frame_assignments(
            &self,
            _windows: &[LayoutWindow],
            _screen: &ScreenInfo,
            _settings: &dyn SettingsProvider,
        ) -> Option<Vec<FrameAssignment>> {
            panic!("layout failed");
        }
    }

    #[test]
    fn worker_survives_a_panicking_layout() {
        let windows = Arc::new(FakeWindows::new());
        let activity = Arc::new(FakeActivity::new());
        let assigner = FrameAssigner::new(windows, activity, SharedSettings::default());
        let queue = ReflowQueue::with_workers(1).unwrap();

        let layout: Arc<dyn Layout> = Arc::new(PanickingLayout);
        let doomed = layout.reflow(Vec::new(), screen(1, 0.0), assigner.clone()).unwrap();
        assert_eq!(doomed.enqueue(&queue), EnqueueResult::Enqueued);

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut op =
            ReflowOperation::with_assignments(screen(2, 0.0), Vec::new(), Vec::new(), assigner);
        op.set_completion(move || tx.send(()).unwrap());
        assert_eq!(op.enqueue(&queue), EnqueueResult::Enqueued);

        // The same single worker picks up the next operation.
        rx.recv_timeout(TIMEOUT).unwrap();

        let deadline = std::time::Instant::now() + TIMEOUT;
        while queue.in_flight() > 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(queue.in_flight(), 0);
    }
}
