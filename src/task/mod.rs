//! This module defines the architecture of duet, which we call
//! "orchestrator-worker". Since we're working with [`tokio`], processing
//! units are tasks, which are defined at [`tokio::task`] and scheduled in
//! parallel on the multi-thread runtime. The orchestrator spawns one task
//! per worker, joins them back in a fixed order and reports the outcome.
//! Shared state is limited to the two output sinks and the cancellation
//! flag; everything else a worker needs is handed to it at construction.
//! See [`orchestrator`], [`frequency`] and [`cpu`] for more details.

pub mod cpu;
pub mod frequency;
pub mod orchestrator;

pub use cpu::CpuLoadWorker;
pub use frequency::FrequencyWorker;
pub use orchestrator::Orchestrator;

use std::fmt;

/// Where a worker currently is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed but not yet running.
    Created,

    /// Main loop in progress.
    Running,

    /// Observed the cancellation token and unwound cleanly.
    Cancelled,

    /// Finished all useful work.
    Completed,

    /// Gave up after a reported error.
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleState::Created => "Created",
            LifecycleState::Running => "Running",
            LifecycleState::Cancelled => "Cancelled",
            LifecycleState::Completed => "Completed",
            LifecycleState::Failed => "Failed",
        })
    }
}

/// One per worker. Owned exclusively by the worker while it runs and
/// returned as the join value, so the orchestrator only ever reads lifecycle
/// state after the worker is gone.
#[derive(Clone, Debug)]
pub struct WorkerDescriptor {
    /// Name used in log records and operator messages.
    pub display_name: &'static str,

    /// Current lifecycle state.
    pub state: LifecycleState,
}

impl WorkerDescriptor {
    pub fn new(display_name: &'static str) -> Self {
        Self {
            display_name,
            state: LifecycleState::Created,
        }
    }
}
