// fileref-check/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Raised when a referenced file exists but cannot be turned into text.
/// Missing files are not errors; their tokens stay in the output.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to read referenced file {path} (depth {depth})")]
    Read {
        path: PathBuf,
        depth: usize,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
