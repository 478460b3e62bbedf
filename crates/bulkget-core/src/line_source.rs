//! Shared, lock-guarded reader over the URL list.
//!
//! Any number of workers call [`LineSource::next_line`]; each call hands out
//! the next unread line with its 1-based number, or reports exhaustion. The
//! underlying handle is dropped the first time end-of-file or a read fault is
//! observed, and every call after that reports exhaustion.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::error::{LineSourceError, StartupError};

/// Longest accepted line, terminator excluded.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// One line of the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    /// 1-based position in the input file.
    pub number: u64,
    /// Line content without its terminator.
    pub text: String,
}

struct Cursor<R> {
    /// `None` once closed.
    reader: Option<R>,
    line: u64,
}

impl<R: BufRead> Cursor<R> {
    fn advance(&mut self) -> Result<Option<InputLine>, LineSourceError> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        let mut buf = Vec::new();
        let read = reader
            .by_ref()
            .take(MAX_LINE_BYTES as u64 + 1)
            .read_until(b'\n', &mut buf);

        match read {
            Ok(0) => {
                self.close();
                Ok(None)
            }
            Ok(_) => {
                let number = self.line + 1;
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                } else if buf.len() > MAX_LINE_BYTES {
                    self.close();
                    return Err(LineSourceError::LineTooLong {
                        line: number,
                        limit: MAX_LINE_BYTES,
                    });
                }
                self.line = number;
                Ok(Some(InputLine {
                    number,
                    text: String::from_utf8_lossy(&buf).into_owned(),
                }))
            }
            Err(source) => {
                let line = self.line;
                self.close();
                Err(LineSourceError::Read { line, source })
            }
        }
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            tracing::debug!(lines = self.line, "input list closed");
        }
    }
}

/// Thread-safe sequential line reader shared by all workers of a run.
pub struct LineSource<R = BufReader<File>> {
    cursor: Mutex<Cursor<R>>,
}

impl LineSource<BufReader<File>> {
    /// Opens the URL list at `path` for reading.
    pub fn open(path: &Path) -> Result<Self, StartupError> {
        let file = File::open(path).map_err(|source| StartupError::OpenInput {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> LineSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            cursor: Mutex::new(Cursor {
                reader: Some(reader),
                line: 0,
            }),
        }
    }

    /// Returns the next unread line, `Ok(None)` on exhaustion, or the read
    /// fault that ended the input. A fault is returned to exactly one caller;
    /// all subsequent calls return `Ok(None)`.
    pub fn next_line(&self) -> Result<Option<InputLine>, LineSourceError> {
        // A worker that panicked while holding the lock left the cursor in a
        // consistent state: `advance` has no partial updates.
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        cursor.advance()
    }

    /// Number of lines handed out so far.
    pub fn lines_read(&self) -> u64 {
        self.cursor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .line
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reader
            .is_none()
    }
}
