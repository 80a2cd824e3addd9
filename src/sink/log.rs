use std::{
    io,
    path::{Path, PathBuf},
};

use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

/// Shared handle to the append-only log file. Like the console, a single
/// mutex serializes writers so records never interleave. There is no
/// persistent file handle: every record opens the file, appends, flushes and
/// closes again, which makes each individual entry durable even if the
/// process dies right after writing it.
pub struct LogFile {
    /// Destination file, created on first write.
    path: PathBuf,

    /// Guards the whole open-append-close cycle of one record.
    lock: Mutex<()>,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Appends one `<name> : <message>` record terminated by exactly one
    /// line break.
    pub async fn write(&self, name: &str, message: &str) -> io::Result<()> {
        let _guard = self.lock.lock().await;

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await?;

        file.write_all(format!("{name} : {message}\n").as_bytes())
            .await?;

        file.flush().await
    }

    /// Appends the identity record written once per task at startup. The
    /// first id is the kernel thread currently running the task, the second
    /// is the process id, kept under its historical label.
    pub async fn write_identity(&self, name: &str) -> io::Result<()> {
        let tid = unsafe { libc::gettid() };
        let pid = std::process::id();

        self.write(
            name,
            &format!("Linux Thread ID: {tid} POSIX Thread ID: {pid}"),
        )
        .await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
