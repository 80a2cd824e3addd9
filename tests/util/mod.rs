//! Some nice utilities for exercising workers and sinks on the same tokio
//! runtime.

pub mod console;
pub mod fs;
