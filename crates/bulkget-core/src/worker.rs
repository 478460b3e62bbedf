//! Download worker: pull a line, reserve a path, fetch, stream to disk.
//!
//! Per-line failures are logged with the line number as `[#N]` and never end
//! the loop; only exhaustion of the line source does.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::allocator::FilenameAllocator;
use crate::error::{ErrorChain, FetchError, ReserveError};
use crate::fetch::Transport;
use crate::line_source::{InputLine, LineSource};

/// Components every worker of a run shares. Constructed once by the
/// coordinator and handed to each worker at spawn time.
pub struct Shared<R> {
    pub lines: LineSource<R>,
    pub allocator: FilenameAllocator,
    pub transport: Arc<dyn Transport>,
    pub output_dir: PathBuf,
}

/// What happened to one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line or no usable filename. Nothing touched on disk.
    Skipped,
    /// Reservation failed; no request was made.
    ReserveFailed,
    /// Request was made but the transfer or the write failed.
    FetchFailed,
    Completed,
}

/// Per-worker tallies, merged by the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub lines: u64,
    pub skipped: u64,
    pub reserve_failed: u64,
    pub fetch_failed: u64,
    pub completed: u64,
}

impl WorkerStats {
    fn record(&mut self, outcome: LineOutcome) {
        self.lines += 1;
        match outcome {
            LineOutcome::Skipped => self.skipped += 1,
            LineOutcome::ReserveFailed => self.reserve_failed += 1,
            LineOutcome::FetchFailed => self.fetch_failed += 1,
            LineOutcome::Completed => self.completed += 1,
        }
    }

    /// Lines that led to a network request.
    pub fn attempted(&self) -> u64 {
        self.fetch_failed + self.completed
    }

    pub fn merge(&mut self, other: &WorkerStats) {
        self.lines += other.lines;
        self.skipped += other.skipped;
        self.reserve_failed += other.reserve_failed;
        self.fetch_failed += other.fetch_failed;
        self.completed += other.completed;
    }
}

/// Runs the pull-resolve-fetch-write loop until the line source is exhausted.
pub fn run_worker<R: BufRead>(id: usize, shared: &Shared<R>) -> WorkerStats {
    let _span = tracing::info_span!("worker", id).entered();
    let mut stats = WorkerStats::default();

    loop {
        let line = match shared.lines.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                // Reported to this worker only; the others just see exhaustion.
                tracing::error!("input list unreadable, stopping: {}", ErrorChain(&e));
                break;
            }
        };
        stats.record(process_line(shared, &line));
    }

    tracing::debug!(?stats, "worker done");
    stats
}

/// Handles one line. Never fails: every problem is logged here.
pub fn process_line<R>(shared: &Shared<R>, line: &InputLine) -> LineOutcome {
    let n = line.number;
    let url = line.text.trim();
    if url.is_empty() {
        tracing::info!("[#{}] Skipping blank line", n);
        return LineOutcome::Skipped;
    }

    let path = match shared.allocator.reserve(&shared.output_dir, url) {
        Ok(path) => path,
        Err(ReserveError::NoFilename) => {
            tracing::info!("[#{}] Skipping `{}`: no filename in URL", n, url);
            return LineOutcome::Skipped;
        }
        Err(e) => {
            tracing::error!("[#{}] Skipping `{}`: {}", n, url, ErrorChain(&e));
            return LineOutcome::ReserveFailed;
        }
    };

    download(shared.transport.as_ref(), n, url, &path)
}

fn download(transport: &dyn Transport, n: u64, url: &str, path: &Path) -> LineOutcome {
    tracing::info!("[#{}] Downloading `{}` into `{}`", n, url, path.display());

    let mut sink = ReservedFile::new(path);
    let result = transport.get(url, &mut sink);
    let opened = sink.is_open();
    let written = sink.written();
    if let Err(e) = sink.close() {
        tracing::error!("[#{}] An error occurred closing `{}`: {}", n, path.display(), e);
    }

    match result {
        Ok(status) => {
            if !(200..300).contains(&status) {
                tracing::warn!(
                    "[#{}] `{}` answered HTTP {}; body saved as received",
                    n,
                    url,
                    status
                );
            }
            tracing::info!(
                "[#{}] Download complete for `{}` into `{}` ({} bytes)",
                n,
                url,
                path.display(),
                written
            );
            LineOutcome::Completed
        }
        Err(FetchError::Sink(e)) if !opened => {
            tracing::error!("[#{}] Could not open file `{}`: {}", n, path.display(), e);
            LineOutcome::FetchFailed
        }
        Err(e) => {
            tracing::error!(
                "[#{}] An error occurred while trying to download `{}`: {}",
                n,
                url,
                ErrorChain(&e)
            );
            LineOutcome::FetchFailed
        }
    }
}

/// Write handle for a reserved path, opened on the first body chunk.
///
/// The file already exists (empty) from the reservation, so a transfer that
/// fails before any data arrives leaves it untouched. The handle is released
/// when this value is dropped or closed, whichever way the download ends.
struct ReservedFile<'a> {
    path: &'a Path,
    file: Option<File>,
    written: u64,
}

impl<'a> ReservedFile<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            file: None,
            written: 0,
        }
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn written(&self) -> u64 {
        self.written
    }

    /// Releases the handle. Write-back errors that `drop` would swallow
    /// (full disk, NFS) surface here.
    fn close(mut self) -> io::Result<()> {
        match self.file.take() {
            Some(file) => file.sync_all(),
            None => Ok(()),
        }
    }
}

impl Write for ReservedFile<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.file.is_none() {
            let file = OpenOptions::new().write(true).truncate(true).open(self.path)?;
            self.file = Some(file);
        }
        let n = match self.file.as_mut() {
            Some(file) => file.write(buf)?,
            None => 0,
        };
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}
