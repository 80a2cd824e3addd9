//! Shared, lock-protected output sinks. The console and the log file are
//! independent resources with independent locks, and no operation ever holds
//! both locks at the same time, so at most one lock is held by any task at
//! any instant. Writes to one sink are totally ordered by its lock; nothing
//! is guaranteed about the relative order of console and log writes.

mod console;
mod log;

pub use console::Console;
pub use log::LogFile;
