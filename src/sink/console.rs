use std::io;

use chrono::Local;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};

/// Shared handle to the interactive output stream. Every writer goes through
/// [`Console::write_line`], which holds the lock for the duration of one
/// line, so concurrent tasks can never interleave characters within a line.
/// The lock is released when the guard drops, including on I/O errors.
pub struct Console {
    /// Destination stream. Boxed so that tests can swap stdout for an
    /// in-memory writer and inspect what the workers printed.
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl Console {
    /// Console backed by an arbitrary writer. Production code uses
    /// [`Console::stdout`], tests usually pass a shared memory buffer.
    pub fn new(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Console attached to the standard output of the process.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    /// Emits `line` terminated by exactly one line break, as a single locked
    /// write.
    pub async fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().await;

        writer.write_all(format!("{line}\n").as_bytes()).await?;
        writer.flush().await
    }

    /// Emits a lifecycle event tagged with the current wall-clock time,
    /// formatted as `<msg>: <MM/DD/YYYY HH:MM:SS>`.
    pub async fn timetag(&self, msg: &str) -> io::Result<()> {
        let stamp = Local::now().format("%m/%d/%Y %H:%M:%S");

        self.write_line(&format!("{msg}: {stamp}")).await
    }
}
