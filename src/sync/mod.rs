//! Synchronization primitives shared by the orchestrator and the workers.

pub mod cancel;
