//! Structs derived from the config file using [`serde`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Optional configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "duet.toml";

/// This struct represents the entire configuration file. Every field has a
/// default, so a missing or empty file yields a fully usable configuration:
///
/// ```toml
/// input_file = "random.txt"
/// log_file = "log.txt"
/// stat_file = "/proc/stat"
/// ```
///
/// Only file locations can be configured. The number of workers and the
/// sampling interval are fixed.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// Text file that the frequency worker tallies.
    #[serde(default = "default::input_file")]
    pub input_file: PathBuf,

    /// Append-only log file shared by all tasks.
    #[serde(default = "default::log_file")]
    pub log_file: PathBuf,

    /// Counter table that the CPU worker samples. The expected layout is the
    /// first line of Linux's `/proc/stat`.
    #[serde(default = "default::stat_file")]
    pub stat_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: default::input_file(),
            log_file: default::log_file(),
            stat_file: default::stat_file(),
        }
    }
}

impl Config {
    /// Reads [`CONFIG_FILE`] if it exists, otherwise falls back to the
    /// defaults. A file that exists but does not parse is an error.
    pub fn load() -> Result<Self, crate::Error> {
        match std::fs::read_to_string(CONFIG_FILE) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(crate::Error::Io(err)),
        }
    }
}

mod default {
    //! Default values for the configuration options.

    use std::path::PathBuf;

    pub fn input_file() -> PathBuf {
        PathBuf::from("random.txt")
    }

    pub fn log_file() -> PathBuf {
        PathBuf::from("log.txt")
    }

    pub fn stat_file() -> PathBuf {
        PathBuf::from("/proc/stat")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.input_file, PathBuf::from("random.txt"));
        assert_eq!(config.log_file, PathBuf::from("log.txt"));
        assert_eq!(config.stat_file, PathBuf::from("/proc/stat"));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config: Config = toml::from_str(r#"input_file = "words.txt""#).unwrap();

        assert_eq!(config.input_file, PathBuf::from("words.txt"));
        assert_eq!(config.log_file, PathBuf::from("log.txt"));
        assert_eq!(config.stat_file, PathBuf::from("/proc/stat"));
    }

    #[test]
    fn unparsable_file_is_rejected() {
        assert!(toml::from_str::<Config>("input_file = 3").is_err());
    }
}
