// SPDX-License-Identifier: MPL-2.0
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),
    #[error("Config Error: {0}")]
    Config(String),
    #[error("Runtime Error: {0}")]
    Runtime(String),
}

/// Why an asset could not be loaded.
///
/// Surfaced through the render snapshot's error flag; the screen never
/// retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    /// No URL (or a blank one) was supplied.
    #[error("No media URL available")]
    MissingUrl,

    /// The engine reported a failure while loading.
    #[error("{0}")]
    Engine(String),
}

impl LoadFailure {
    /// Returns true if re-issuing the same load could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoadFailure::Engine(_))
    }
}

/// Failure to produce a single preview frame. Recovered locally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThumbnailError {
    #[error("No frame near {0:.3}s")]
    NoFrame(f64),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
