//! CLI for bulkget.

use anyhow::{Context, Result};
use bulkget_core::config::{self, BulkgetConfig, Overrides};
use bulkget_core::coordinator;
use bulkget_core::fetch::CurlTransport;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Download every URL listed in a file using a pool of concurrent workers.
#[derive(Debug, Parser)]
#[command(name = "bulkget", version)]
#[command(about = "Download every URL listed in a file with concurrent workers", long_about = None)]
pub struct Cli {
    /// File containing the links to download, one per line (default: list.txt).
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Number of concurrent downloads (default: 1).
    #[arg(short = 't', long = "threads", visible_alias = "workers", value_name = "N")]
    pub threads: Option<usize>,

    /// Directory to save files into; created if missing (default: current directory).
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Read configuration from PATH instead of ~/.config/bulkget/config.toml.
    #[arg(long, value_name = "PATH", conflicts_with = "no_config")]
    pub config: Option<PathBuf>,

    /// Ignore any configuration file and use built-in defaults.
    #[arg(long)]
    pub no_config: bool,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        Cli::parse().run()
    }

    /// Flag values that take precedence over the config file.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            input_file: self.file.clone(),
            workers: self.threads,
            output_dir: self.output.clone(),
        }
    }

    fn load_config(&self) -> Result<BulkgetConfig> {
        if self.no_config {
            return Ok(BulkgetConfig::default());
        }
        match &self.config {
            Some(path) => config::load_or_init_at(path),
            None => config::load_or_init(),
        }
    }

    pub fn run(self) -> Result<()> {
        let cfg = self.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let run_cfg = cfg.resolve(self.overrides());
        let transport = Arc::new(CurlTransport::new(cfg.http.clone()));
        let summary = coordinator::run(&run_cfg, transport).context("cannot start run")?;
        tracing::debug!(?summary, "run finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
