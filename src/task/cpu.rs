use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tokio::{fs, time};

use super::{LifecycleState, WorkerDescriptor};
use crate::{
    sink::{Console, LogFile},
    sync::cancel::CancelToken,
};

/// Time between the two samples of each reading.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Cumulative tick counters captured at one instant. All four fields count
/// time since boot and never decrease on a well-behaved source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuSample {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
}

impl CpuSample {
    /// Reads and parses one sample from the counter file. Only the first
    /// line matters: its leading token is ignored and the next four numeric
    /// fields are the user, nice, system and idle tick counts.
    pub async fn read(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path).await?;
        let line = contents.lines().next().unwrap_or("");

        Self::parse(line).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("malformed counter line: {line:?}"),
            )
        })
    }

    fn parse(line: &str) -> Option<Self> {
        let mut fields = line
            .split_whitespace()
            .skip(1)
            .map(|field| field.parse::<u64>());

        let mut next = || fields.next()?.ok();

        Some(Self {
            user: next()?,
            nice: next()?,
            system: next()?,
            idle: next()?,
        })
    }

    /// Ticks spent doing work.
    pub fn active(&self) -> u64 {
        self.user + self.nice + self.system
    }

    /// All accounted ticks.
    pub fn total(&self) -> u64 {
        self.active() + self.idle
    }

    /// Percentage of ticks spent active between `earlier` and `self`.
    ///
    /// Returns `None` when the two samples cover zero elapsed ticks, or when
    /// the total went backwards. The caller skips such a reading; no NaN or
    /// division fault can come out of here.
    pub fn utilization_since(&self, earlier: &CpuSample) -> Option<f64> {
        let total = self
            .total()
            .checked_sub(earlier.total())
            .filter(|&ticks| ticks > 0)?;

        let active = self.active().saturating_sub(earlier.active());

        Some(100.0 * active as f64 / total as f64)
    }
}

/// Periodically estimates CPU utilization from two counter snapshots taken
/// [`SAMPLE_INTERVAL`] apart. The estimator is a pure delta; history is
/// discarded between iterations. The loop has no natural exit and only
/// terminates through the cancellation token, or by giving up on a counter
/// source that cannot be read.
pub struct CpuLoadWorker {
    /// Lifecycle record, returned to the orchestrator through the join
    /// handle.
    descriptor: WorkerDescriptor,

    /// Counter file to sample.
    path: PathBuf,

    /// Interactive sink for the utilization lines.
    console: Arc<Console>,

    /// Log sink for the startup records.
    log: Arc<LogFile>,

    /// Observed at the top of each iteration and raced against the sleep.
    token: CancelToken,
}

impl CpuLoadWorker {
    pub const NAME: &'static str = "CpuLoadWorker";

    pub fn new(
        path: PathBuf,
        console: Arc<Console>,
        log: Arc<LogFile>,
        token: CancelToken,
    ) -> Self {
        Self {
            descriptor: WorkerDescriptor::new(Self::NAME),
            path,
            console,
            log,
            token,
        }
    }

    /// Entry point. Always returns the descriptor; errors are reported to
    /// the sinks as they occur.
    pub async fn run(mut self) -> WorkerDescriptor {
        self.descriptor.state = LifecycleState::Running;

        if let Err(err) = self.announce().await {
            eprintln!("{} => log write failed: {err}", Self::NAME);
        }

        self.descriptor.state = self.sample_loop().await;

        self.descriptor
    }

    /// Startup records: one lifecycle entry plus the identity entry.
    async fn announce(&self) -> io::Result<()> {
        self.log.write(Self::NAME, Self::NAME).await?;
        self.log.write_identity(Self::NAME).await
    }

    /// The sampling loop. Returns the terminal state.
    async fn sample_loop(&mut self) -> LifecycleState {
        loop {
            if self.token.is_cancelled() {
                return LifecycleState::Cancelled;
            }

            let first = match CpuSample::read(&self.path).await {
                Ok(sample) => sample,
                Err(err) => return self.fail(err).await,
            };

            tokio::select! {
                _ = time::sleep(SAMPLE_INTERVAL) => {}
                _ = self.token.cancelled() => return LifecycleState::Cancelled,
            }

            let second = match CpuSample::read(&self.path).await {
                Ok(sample) => sample,
                Err(err) => return self.fail(err).await,
            };

            // A zero-tick delta has no defined percentage. The reading is
            // skipped and the loop moves on.
            if let Some(utilization) = second.utilization_since(&first) {
                self.report(&format!("CPU: {utilization:.2}")).await;
            }
        }
    }

    /// Reports an unusable counter source and gives up.
    async fn fail(&self, err: io::Error) -> LifecycleState {
        let path = self.path.display();
        self.report(&format!("cannot sample {path}: {err}")).await;

        LifecycleState::Failed
    }

    /// Console write that cannot fail the worker. A broken console is
    /// reported on stderr instead.
    async fn report(&self, line: &str) {
        if let Err(err) = self.console.write_line(line).await {
            eprintln!("{} => console write failed: {err}", Self::NAME);
        }
    }
}
