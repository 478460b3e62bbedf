//! Run coordinator: validates startup conditions, spawns the worker pool and
//! waits for every worker to observe exhaustion.
//!
//! Workers share one [`LineSource`] and one [`FilenameAllocator`] through an
//! `Arc<Shared<_>>`; they never talk to each other. The coordinator only sees
//! completion, never per-line failure.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use crate::allocator::FilenameAllocator;
use crate::config::RunConfig;
use crate::error::StartupError;
use crate::fetch::Transport;
use crate::line_source::LineSource;
use crate::worker::{run_worker, Shared, WorkerStats};

/// Totals over all workers of a finished run. Diagnostic only: a run with
/// every download failed is still a successful run.
pub type RunSummary = WorkerStats;

/// Ensures `path` is a directory, creating it (mode 0700 on Unix) if absent.
pub fn prepare_output_dir(path: &Path) -> Result<(), StartupError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(StartupError::OutputNotDirectory(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(0o700);
            }
            builder
                .create(path)
                .map_err(|source| StartupError::CreateOutputDir {
                    path: path.to_path_buf(),
                    source,
                })?;
            tracing::info!("created output directory {}", path.display());
            Ok(())
        }
        Err(source) => Err(StartupError::InspectOutput {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Runs a full fetch of `cfg.input_file` into `cfg.output_dir` with
/// `cfg.workers` workers. Returns once every worker is done.
///
/// Fails before spawning anything if the worker count is zero, the input
/// list cannot be opened, or the output path is unusable.
pub fn run(cfg: &RunConfig, transport: Arc<dyn Transport>) -> Result<RunSummary, StartupError> {
    if cfg.workers == 0 {
        return Err(StartupError::InvalidWorkerCount(cfg.workers));
    }
    let lines = LineSource::open(&cfg.input_file)?;
    prepare_output_dir(&cfg.output_dir)?;

    tracing::info!("Downloading file list: {}", cfg.input_file.display());
    tracing::info!("Concurrent downloads {}", cfg.workers);

    let shared = Shared {
        lines,
        allocator: FilenameAllocator::new(),
        transport,
        output_dir: cfg.output_dir.clone(),
    };
    run_pool(shared, cfg.workers)
}

/// Spawns `workers` threads over already-constructed shared components and
/// joins them all.
pub fn run_pool<R>(shared: Shared<R>, workers: usize) -> Result<RunSummary, StartupError>
where
    R: BufRead + Send + 'static,
{
    if workers == 0 {
        return Err(StartupError::InvalidWorkerCount(workers));
    }
    let shared = Arc::new(shared);

    let mut handles = Vec::with_capacity(workers);
    for id in 0..workers {
        let shared = Arc::clone(&shared);
        let spawned = thread::Builder::new()
            .name(format!("bulkget-worker-{}", id))
            .spawn(move || run_worker(id, &shared));
        match spawned {
            Ok(handle) => handles.push(handle),
            Err(source) => {
                // Workers already running drain the input on their own.
                tracing::error!("could not spawn worker {}: {}", id, source);
                if handles.is_empty() {
                    return Err(StartupError::SpawnWorker { id, source });
                }
                break;
            }
        }
    }

    let mut summary = RunSummary::default();
    for handle in handles {
        match handle.join() {
            Ok(stats) => summary.merge(&stats),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    tracing::debug!(?summary, "all workers done");
    Ok(summary)
}
