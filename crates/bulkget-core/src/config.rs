use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default URL list file name.
pub const DEFAULT_INPUT_FILE: &str = "list.txt";

/// HTTP client options (optional `[http]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Follow 3xx redirects (up to 10 hops), as a default client would.
    pub follow_redirects: bool,
    /// Connect timeout in seconds. None = libcurl default. There is never an
    /// overall transfer timeout.
    pub connect_timeout_secs: Option<u64>,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            connect_timeout_secs: None,
            user_agent: concat!("bulkget/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/bulkget/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkgetConfig {
    /// Newline-delimited URL list.
    pub input_file: PathBuf,
    /// Number of concurrent download workers (>= 1).
    pub workers: usize,
    /// Directory receiving downloaded files; created if missing.
    pub output_dir: PathBuf,
    pub http: HttpConfig,
}

impl Default for BulkgetConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from(DEFAULT_INPUT_FILE),
            workers: 1,
            output_dir: PathBuf::from("."),
            http: HttpConfig::default(),
        }
    }
}

/// Per-run values after merging CLI flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input_file: PathBuf,
    pub workers: usize,
    pub output_dir: PathBuf,
}

/// Command-line values; `None` means "not given, use the config file".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub input_file: Option<PathBuf>,
    pub workers: Option<usize>,
    pub output_dir: Option<PathBuf>,
}

impl BulkgetConfig {
    /// Applies command-line overrides. Worker count is validated by the coordinator.
    pub fn resolve(&self, overrides: Overrides) -> RunConfig {
        RunConfig {
            input_file: overrides
                .input_file
                .unwrap_or_else(|| self.input_file.clone()),
            workers: overrides.workers.unwrap_or(self.workers),
            output_dir: overrides
                .output_dir
                .unwrap_or_else(|| self.output_dir.clone()),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bulkget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the default location, creating a default file if none exists.
pub fn load_or_init() -> Result<BulkgetConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<BulkgetConfig> {
    if !path.exists() {
        let default_cfg = BulkgetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("failed to write default config {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: BulkgetConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
