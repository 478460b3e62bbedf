//! Error taxonomy for a run.
//!
//! `StartupError` aborts before any worker is spawned. Everything else is
//! per-line: the worker logs it with the line number and moves on.

use std::io;
use std::path::PathBuf;

/// Conditions that abort the whole run before work begins.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("worker count must be at least 1 (got {0})")]
    InvalidWorkerCount(usize),
    #[error("output path {} exists but is not a directory", .0.display())]
    OutputNotDirectory(PathBuf),
    #[error("failed to inspect output path {}", .path.display())]
    InspectOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create output directory {}", .path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open input list {}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not spawn worker {id}")]
    SpawnWorker {
        id: usize,
        #[source]
        source: io::Error,
    },
}

/// Read fault reported by the line source. Delivered once; every later call
/// sees plain exhaustion.
#[derive(Debug, thiserror::Error)]
pub enum LineSourceError {
    #[error("failed to read input after line {line}")]
    Read {
        line: u64,
        #[source]
        source: io::Error,
    },
    #[error("input line {line} exceeds {limit} bytes")]
    LineTooLong { line: u64, limit: usize },
}

/// Why no output path could be reserved for a URL.
#[derive(Debug, thiserror::Error)]
pub enum ReserveError {
    /// The URL has no usable trailing segment. Not a fault; the line is skipped.
    #[error("no filename in URL")]
    NoFilename,
    #[error("could not create file {}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure of a single GET.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Handle configuration failed (bad URL syntax, unsupported option).
    #[error("request setup failed")]
    Setup(#[source] curl::Error),
    /// Connection, DNS, TLS or protocol error.
    #[error("transport error")]
    Transport(#[source] curl::Error),
    /// The body could not be written to the reserved file.
    #[error("write failed")]
    Sink(#[source] io::Error),
}

/// Displays an error followed by its `source()` chain, `: `-separated.
pub struct ErrorChain<'a>(pub &'a (dyn std::error::Error + 'static));

impl std::fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {}", cause)?;
            source = cause.source();
        }
        Ok(())
    }
}
