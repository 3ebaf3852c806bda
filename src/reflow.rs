//! Scheduling and application of layout results.
//!
//! A [`ReflowOperation`] captures one screen's windows, obtains frame
//! assignments (from a layout or precomputed), and hands them to a
//! [`FrameAssigner`], which writes them to the live windows. Operations run
//! on a [`ReflowQueue`].

mod frame_assigner;
mod operation;
mod queue;

pub use frame_assigner::{BatchOutcome, FrameAssigner};
pub use operation::{ReflowOperation, ReflowOutcome};
pub use queue::{EnqueueResult, ReflowQueue};
