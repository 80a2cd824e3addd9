use std::{
    future::{self, Future},
    pin::Pin,
    sync::Arc,
};

use super::{cpu::CpuLoadWorker, frequency::FrequencyWorker};
use crate::{
    config::Config,
    signal::Interrupt,
    sink::{Console, LogFile},
    sync::cancel::{self, CancelToken, Canceller},
    Error,
};

/// Log name of the controller itself.
const MAIN_NAME: &str = "Thread Main";

/// The orchestrator is responsible for creating the shared resources,
/// spawning both workers and the cancellation watcher, and joining
/// everything back in a fixed order. Cancellation flows in one direction
/// only:
///
/// ```text
///                      +--------------+
///                      | Orchestrator |
///                      +--------------+
///                             |
///              +--------------+--------------+
///              v              v              v
///       +-----------+    +---------+    +---------+
///       | Frequency |    | CpuLoad |    | Watcher |
///       |  worker   |    |  worker |    +---------+
///       +-----------+    +---------+         |
///              ^              ^              | cancel()
///              +--------------+--------------+
/// ```
///
/// The watcher polls the shutdown future; when it resolves it writes one log
/// record naming the interrupt and sets the cancellation flag. Both workers
/// observe the flag at their next checkpoint and unwind cleanly, which makes
/// the two join calls below return with `Cancelled` descriptors instead of
/// blocking forever.
pub struct Orchestrator {
    /// File paths for the workers and the log sink.
    config: Config,

    /// Interactive sink shared by every task.
    console: Arc<Console>,

    /// Log sink shared by every task.
    log: Arc<LogFile>,

    /// Trigger half of the cancellation flag, handed to the watcher task.
    canceller: Canceller,

    /// Observer half, cloned into each worker.
    token: CancelToken,

    /// Shutdown future. When it resolves, the watcher records which
    /// interrupt arrived and cancels both workers. This can be any future,
    /// which allows integration tests to trigger cancellation without
    /// raising real signals.
    shutdown: Pin<Box<dyn Future<Output = Interrupt> + Send>>,
}

impl Orchestrator {
    /// Builds the shared sinks and the cancellation pair. Nothing is
    /// spawned yet; [`Orchestrator::run`] does that.
    pub fn init(config: Config) -> Self {
        let (canceller, token) = cancel::pair();
        let log = Arc::new(LogFile::new(&config.log_file));

        Self {
            console: Arc::new(Console::stdout()),
            log,
            canceller,
            token,
            shutdown: Box::pin(future::pending()),
            config,
        }
    }

    /// Replaces the console sink. Tests use this to capture worker output
    /// in memory.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = Arc::new(console);
        self
    }

    /// The orchestrator will poll the given `future` and whenever it
    /// completes, the cancellation process starts. Production passes
    /// [`crate::signal::Signals::next_interrupt`] here, but it can be any
    /// [`Future`] with the right output.
    pub fn shutdown_on(mut self, future: impl Future<Output = Interrupt> + Send + 'static) -> Self {
        self.shutdown = Box::pin(future);
        self
    }

    /// Shared console handle, mainly for wiring the signal listener.
    pub fn console(&self) -> Arc<Console> {
        Arc::clone(&self.console)
    }

    /// This is the entry point. Spawns both workers and blocks joining them
    /// in a fixed order: the frequency worker first, then the CPU worker.
    pub async fn run(self) -> Result<(), Error> {
        let Self {
            config,
            console,
            log,
            canceller,
            token,
            shutdown,
        } = self;

        log.write(MAIN_NAME, MAIN_NAME).await?;
        log.write_identity(MAIN_NAME).await?;

        let watcher = {
            let log = Arc::clone(&log);

            tokio::spawn(async move {
                let interrupt = shutdown.await;
                let message = format!("Received {}", interrupt.name());

                if let Err(err) = log.write(MAIN_NAME, &message).await {
                    eprintln!("{MAIN_NAME} => log write failed: {err}");
                }

                canceller.cancel();
            })
        };

        console.timetag("FrequencyWorker start").await?;
        let frequency = FrequencyWorker::new(
            config.input_file.clone(),
            Arc::clone(&console),
            Arc::clone(&log),
            token.clone(),
        );
        let frequency = tokio::spawn(frequency.run());

        console.timetag("CpuLoadWorker start").await?;
        let cpu = CpuLoadWorker::new(
            config.stat_file.clone(),
            Arc::clone(&console),
            Arc::clone(&log),
            token,
        );
        let cpu = tokio::spawn(cpu.run());

        let mut first_error = None;

        for (name, handle) in [(FrequencyWorker::NAME, frequency), (CpuLoadWorker::NAME, cpu)] {
            match handle.await {
                Ok(descriptor) => {
                    log.write(name, "Successfully joined").await?;
                    console.timetag(&format!("Exiting {name}")).await?;
                    println!("{name} => {}", descriptor.state);
                }
                Err(err) => {
                    eprintln!("{name} => join failed: {err}");

                    if let Err(err) = log.write(name, "Joining error").await {
                        eprintln!("{name} => log write failed: {err}");
                    }

                    first_error.get_or_insert(Error::Join(name));
                }
            }
        }

        // The watcher outlives both workers when no interrupt ever fires.
        watcher.abort();

        match first_error {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}
