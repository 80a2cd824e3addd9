//! OS signal plumbing. The actual handlers installed here (through
//! [`tokio::signal`]) do nothing but mark a stream ready; recording the
//! event in the log and cancelling the workers happen later on a regular
//! task. No lock is ever acquired in signal-handler context, so a signal
//! interrupting a task that holds a sink lock cannot deadlock.

use std::{io, sync::Arc};

use tokio::signal::unix::{signal, Signal, SignalKind};

use crate::sink::Console;

/// External notification that requests cooperative shutdown of the workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    UserDefined1,
    UserDefined2,
}

impl Interrupt {
    /// Signal name as recorded in the log file.
    pub fn name(self) -> &'static str {
        match self {
            Interrupt::UserDefined1 => "SIGUSR1",
            Interrupt::UserDefined2 => "SIGUSR2",
        }
    }
}

/// The set of signal streams this program listens on. Registration can fail,
/// and that failure has to be known before any worker is spawned, so it is
/// separated from the listening loop.
pub struct Signals {
    user_defined1: Signal,
    user_defined2: Signal,
    interrupt: Signal,
}

impl Signals {
    /// Registers handlers for SIGUSR1, SIGUSR2 and SIGINT.
    pub fn register() -> io::Result<Self> {
        Ok(Self {
            user_defined1: signal(SignalKind::user_defined1())?,
            user_defined2: signal(SignalKind::user_defined2())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }

    /// Resolves when SIGUSR1 or SIGUSR2 arrives. SIGINT does not shut the
    /// workers down; it only gets a console notice and the program keeps
    /// running.
    pub async fn next_interrupt(mut self, console: Arc<Console>) -> Interrupt {
        loop {
            tokio::select! {
                _ = self.user_defined1.recv() => return Interrupt::UserDefined1,
                _ = self.user_defined2.recv() => return Interrupt::UserDefined2,
                _ = self.interrupt.recv() => {
                    if let Err(err) = console.write_line("SIGINT").await {
                        eprintln!("signals => console write failed: {err}");
                    }
                }
            }
        }
    }
}
