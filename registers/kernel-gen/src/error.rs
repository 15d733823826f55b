// Licensed under the Apache-2.0 license

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while scanning encodings or loading configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// The input file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading failed part way through the input.
    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    /// The encoding file references a kernel the caller did not supply.
    #[error("line {line}: kernel index {index} out of range (table holds {len} kernels)")]
    IndexOutOfRange { index: usize, line: usize, len: usize },

    /// The scan configuration produced an invalid pattern.
    #[error("invalid encoding pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The generator configuration could not be parsed.
    #[error("invalid generator config: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Returns true for errors caused by the underlying file I/O.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Open { .. } | Error::Read { .. })
    }
}

/// Result type for kernel register generation.
pub type Result<T> = std::result::Result<T, Error>;
