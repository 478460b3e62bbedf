//! Collision-free output path reservation.
//!
//! A reservation is an empty file created before any byte is fetched. The
//! probe ("does `name` exist?") and the create run under one lock shared by
//! every worker, so two workers asking for the same base name never both see
//! it as free.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::ReserveError;
use crate::filename::{base_name, fit_name_max};

/// Reserves unique file paths inside a target directory.
#[derive(Debug, Default)]
pub struct FilenameAllocator {
    lock: Mutex<()>,
}

impl FilenameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a path in `dir` for `url` and returns it. The file exists and
    /// is empty (and closed) when this returns.
    ///
    /// Candidates are probed linearly: `name`, `name (1)`, `name (2)`, ...
    /// Returns [`ReserveError::NoFilename`] without touching the disk when the
    /// URL has no usable trailing segment.
    pub fn reserve(&self, dir: &Path, url: &str) -> Result<PathBuf, ReserveError> {
        let base = base_name(url).ok_or(ReserveError::NoFilename)?;

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut attempt = 0u64;
        loop {
            let name = candidate(&base, attempt);
            attempt += 1;

            let path = dir.join(&name);
            if fs::symlink_metadata(&path).is_ok() {
                continue;
            }
            match create_empty(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "reserved");
                    return Ok(path);
                }
                // Created by someone outside this process since the probe.
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(ReserveError::Create { path, source }),
            }
        }
    }
}

fn candidate(base: &str, attempt: u64) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        fit_name_max(base, &format!(" ({})", attempt))
    }
}

/// Exclusive create, so an existing file is never truncated.
fn create_empty(path: &Path) -> io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    opts.open(path).map(drop)
}
