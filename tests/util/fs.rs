//! Scratch files for worker inputs and log outputs.

use std::{io::Write, path::PathBuf};

use tempfile::{NamedTempFile, TempDir};

/// Text file with the given contents. The handle keeps the file alive, so
/// hold on to it for the duration of the test.
pub fn text_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();

    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();

    file
}

/// Counter file shaped like the first line of `/proc/stat`.
pub fn stat_file(user: u64, nice: u64, system: u64, idle: u64) -> NamedTempFile {
    text_file(&stat_line(user, nice, system, idle))
}

/// Overwrites a counter file in place with new totals.
pub fn rewrite_stat(file: &NamedTempFile, user: u64, nice: u64, system: u64, idle: u64) {
    std::fs::write(file.path(), stat_line(user, nice, system, idle)).unwrap();
}

fn stat_line(user: u64, nice: u64, system: u64, idle: u64) -> String {
    format!("cpu  {user} {nice} {system} {idle} 0 0 0 0 0 0\n")
}

/// Fresh directory plus a log file path inside it. The log file itself is
/// created by the first record written to it.
pub fn log_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");

    (dir, path)
}
