//! Error type definitions for relay-scout

use std::fmt;

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Filesystem errors outside the catalog (output writing)
    #[error("I/O error: {path} - {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Classification of a failed probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProbeErrorKind {
    /// DNS, connection refused, TLS or body read failure
    Transport,
    /// The probe exceeded its timeout
    Timeout,
    /// Streaming response status outside the accepted set
    Status,
    /// Stream ended or stayed empty within the read cap
    NoData,
    /// URL could not be parsed or has no usable host
    MalformedUrl,
    /// Socket-level failure on the UDP path
    Socket,
}

impl ProbeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeErrorKind::Transport => "transport",
            ProbeErrorKind::Timeout => "timeout",
            ProbeErrorKind::Status => "status",
            ProbeErrorKind::NoData => "no_data",
            ProbeErrorKind::MalformedUrl => "malformed_url",
            ProbeErrorKind::Socket => "socket",
        }
    }
}

impl fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single probe's negative verdict
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ProbeFailure {
    pub kind: ProbeErrorKind,
    pub message: String,
}

impl ProbeFailure {
    pub fn new<S: Into<String>>(kind: ProbeErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Map a reqwest error onto the probe taxonomy
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            ProbeErrorKind::Timeout
        } else if error.is_builder() {
            ProbeErrorKind::MalformedUrl
        } else {
            ProbeErrorKind::Transport
        };
        Self::new(kind, error.to_string())
    }
}

/// Channel catalog errors
///
/// `Missing` and `Empty` are input conditions that short-circuit the run with
/// an empty playlist; `Unreadable` is the structural case (permissions,
/// invalid UTF-8).
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog file not found: {path}")]
    Missing { path: String },

    #[error("Catalog file contains no channel lines: {path}")]
    Empty { path: String },

    #[error("Catalog file unreadable: {path} - {message}")]
    Unreadable { path: String, message: String },
}

/// Candidate source errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// All fetch attempts failed; `message` is the last attempt's error
    #[error("Fetch failed after {attempts} attempt(s): {url} - {message}")]
    Fetch {
        url: String,
        attempts: u32,
        message: String,
    },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the path it concerns
    pub fn io<P: Into<String>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
