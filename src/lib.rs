//! Duet runs two independent long-running workers side by side: a
//! letter-frequency tally over a text file and a delta-based CPU utilization
//! sampler over the kernel's counter table. Both serialize all their output
//! through two lock-protected shared sinks, and both shut down cooperatively
//! when the process receives SIGUSR1 or SIGUSR2. See [`task`] for the
//! architecture and [`sink`] for the mutual-exclusion discipline.

pub mod config;
pub mod signal;
pub mod sink;
pub mod sync;
pub mod task;

use std::{fmt, io, process::ExitCode};

pub use config::Config;
pub use task::Orchestrator;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors that abort the whole program. Worker-local failures (a missing
/// input file, a malformed counter line) are reported by the worker itself
/// and never surface here.
#[derive(Debug)]
pub enum Error {
    /// Configuration or orchestration-level I/O failure.
    Io(io::Error),

    /// The configuration file exists but does not parse.
    Config(toml::de::Error),

    /// A worker could not be joined, most likely because it panicked.
    Join(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "{err}"),
            Error::Config(err) => write!(f, "{err}"),
            Error::Join(worker) => write!(f, "could not join {worker}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err)
    }
}

impl Error {
    /// Process exit status: 1 for anything that prevented the workers from
    /// starting or being orchestrated, 2 for a join failure.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::Io(_) | Error::Config(_) => ExitCode::from(1),
            Error::Join(_) => ExitCode::from(2),
        }
    }
}
