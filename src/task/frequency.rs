use std::{io, path::PathBuf, sync::Arc};

use tokio::{
    fs::File,
    io::{AsyncReadExt, BufReader},
};

use super::{LifecycleState, WorkerDescriptor};
use crate::{
    sink::{Console, LogFile},
    sync::cancel::CancelToken,
};

/// Letters seen exactly this many times make it into the console report.
/// This is a strict equality match, not a minimum: a letter with two or four
/// occurrences never appears.
const REPORTED_COUNT: u32 = 3;

/// Fixed-size tally of ASCII letters, case-folded to uppercase.
#[derive(Debug)]
pub struct FrequencyTable {
    /// One bin per letter, `bins[0]` is A.
    bins: [u32; 26],
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self { bins: [0; 26] }
    }

    /// Records one character. Lowercase ASCII letters are folded to
    /// uppercase first. Returns whether the character landed in a bin;
    /// anything outside A-Z is simply not tracked.
    pub fn record(&mut self, ch: char) -> bool {
        let folded = ch.to_ascii_uppercase();

        if folded.is_ascii_uppercase() {
            self.bins[(folded as u8 - b'A') as usize] += 1;
            true
        } else {
            false
        }
    }

    /// Total number of recorded characters.
    pub fn total(&self) -> u32 {
        self.bins.iter().sum()
    }

    /// Count for one letter, case-insensitively. Characters outside A-Z
    /// have no bin and always count zero.
    pub fn count(&self, letter: char) -> u32 {
        let folded = letter.to_ascii_uppercase();

        if folded.is_ascii_uppercase() {
            self.bins[(folded as u8 - b'A') as usize]
        } else {
            0
        }
    }

    /// Letters whose final tally equals `count` exactly, in alphabetical
    /// order.
    pub fn with_exact_count(&self, count: u32) -> impl Iterator<Item = (char, u32)> + '_ {
        self.bins
            .iter()
            .enumerate()
            .filter(move |(_, &tally)| tally == count)
            .map(|(index, &tally)| ((b'A' + index as u8) as char, tally))
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads the configured text file once, character by character, tallying
/// letters as it goes, then reports every letter seen exactly
/// [`REPORTED_COUNT`] times. Terminal states: `Completed` when end of stream
/// was reached cleanly, `Failed` when the file could not be opened or a read
/// failed halfway, `Cancelled` when the token fired first.
pub struct FrequencyWorker {
    /// Lifecycle record, returned to the orchestrator through the join
    /// handle.
    descriptor: WorkerDescriptor,

    /// Text file to tally.
    path: PathBuf,

    /// Interactive sink for the report lines.
    console: Arc<Console>,

    /// Log sink for the startup records.
    log: Arc<LogFile>,

    /// Observed once per read iteration and raced against the read itself.
    token: CancelToken,
}

impl FrequencyWorker {
    pub const NAME: &'static str = "FrequencyWorker";

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

    /// Entry point. Always returns the descriptor, whatever happened along
    /// the way; errors are reported to the sinks as they occur.
    pub async fn run(mut self) -> WorkerDescriptor {
        self.descriptor.state = LifecycleState::Running;

        if let Err(err) = self.announce().await {
            eprintln!("{} => log write failed: {err}", Self::NAME);
        }

        self.descriptor.state = self.tally().await;

        self.descriptor
    }

    /// Startup records: one lifecycle entry plus the identity entry.
    async fn announce(&self) -> io::Result<()> {
        self.log.write(Self::NAME, Self::NAME).await?;
        self.log.write_identity(Self::NAME).await
    }

    /// The tally pass itself. Returns the terminal state.
    async fn tally(&mut self) -> LifecycleState {
        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(err) => {
                let path = self.path.display();
                self.report(&format!("cannot open {path}: {err}")).await;

                return LifecycleState::Failed;
            }
        };

        let mut reader = BufReader::new(file);
        let mut table = FrequencyTable::new();

        let outcome = loop {
            if self.token.is_cancelled() {
                break LifecycleState::Cancelled;
            }

            let read = tokio::select! {
                read = reader.read_u8() => read,
                _ = self.token.cancelled() => break LifecycleState::Cancelled,
            };

            match read {
                Ok(byte) => {
                    table.record(byte as char);
                }
                Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    break LifecycleState::Completed;
                }
                Err(err) => {
                    self.report(&format!("read failed: {err}")).await;
                    break LifecycleState::Failed;
                }
            }
        };

        match outcome {
            LifecycleState::Completed => {
                for (letter, count) in table.with_exact_count(REPORTED_COUNT) {
                    self.report(&format!("{letter} {count}")).await;
                }

                self.report("End of file reached.").await;
            }
            LifecycleState::Failed => {
                self.report("Something went wrong.").await;
            }
            _ => {}
        }

        outcome
    }

    /// Console write that cannot fail the worker. A broken console is
    /// reported on stderr instead.
    async fn report(&self, line: &str) {
        if let Err(err) = self.console.write_line(line).await {
            eprintln!("{} => console write failed: {err}", Self::NAME);
        }
    }
}
