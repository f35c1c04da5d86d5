use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod duration_serde;

use defaults::*;
use duration_serde::duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Reachability probe tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Timeout applied to each HTTP request (HEAD and streaming GET)
    #[serde(default = "default_http_timeout", with = "duration")]
    pub http_timeout: Duration,
    /// Receive timeout on the UDP path; expiry counts as reachable
    #[serde(default = "default_udp_timeout", with = "duration")]
    pub udp_timeout: Duration,
    /// Fixed port every UDP probe targets
    #[serde(default = "default_udp_target_port")]
    pub udp_target_port: u16,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Body stream items read before giving up on a silent stream
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,
}

/// Ordering applied to the assembled playlist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistOrdering {
    /// Order in which probes finished (non-deterministic)
    #[default]
    Completion,
    /// Lexicographic by line
    Sorted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum probes in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Emit a progress log every N completed probes (0 disables)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    #[serde(default)]
    pub ordering: PlaylistOrdering,
    /// Drop repeated `name,url` lines, keeping the first
    #[serde(default = "default_dedupe")]
    pub dedupe: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Local file scanned for `http(s)://host[:port]` candidates
    #[serde(default = "default_seed_file")]
    pub seed_file: PathBuf,
    /// Remote document scanned for additional candidates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,
    /// Fixed delay between remote fetch attempts
    #[serde(default = "default_fetch_retry_delay", with = "duration")]
    pub fetch_retry_delay: Duration,
    #[serde(default = "default_fetch_timeout", with = "duration")]
    pub fetch_timeout: Duration,
    /// Filter candidates through the UDP probe before synthesizing channel URLs
    #[serde(default = "default_udp_prescreen")]
    pub udp_prescreen: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

// Probe defaults
fn default_http_timeout() -> Duration {
    Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)
}

fn default_udp_timeout() -> Duration {
    Duration::from_secs(DEFAULT_UDP_TIMEOUT_SECS)
}

fn default_udp_target_port() -> u16 {
    DEFAULT_UDP_TARGET_PORT
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_max_chunks() -> usize {
    DEFAULT_MAX_CHUNKS
}

fn default_follow_redirects() -> bool {
    DEFAULT_FOLLOW_REDIRECTS
}

// Validation defaults
fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_progress_interval() -> usize {
    DEFAULT_PROGRESS_INTERVAL
}

fn default_dedupe() -> bool {
    DEFAULT_DEDUPE
}

// Source defaults
fn default_seed_file() -> PathBuf {
    PathBuf::from(DEFAULT_SEED_FILE)
}

fn default_fetch_attempts() -> u32 {
    DEFAULT_FETCH_ATTEMPTS
}

fn default_fetch_retry_delay() -> Duration {
    Duration::from_secs(DEFAULT_FETCH_RETRY_DELAY_SECS)
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
}

fn default_udp_prescreen() -> bool {
    DEFAULT_UDP_PRESCREEN
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from(DEFAULT_CATALOG_PATH)
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            http_timeout: default_http_timeout(),
            udp_timeout: default_udp_timeout(),
            udp_target_port: default_udp_target_port(),
            user_agent: default_user_agent(),
            max_chunks: default_max_chunks(),
            follow_redirects: default_follow_redirects(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            progress_interval: default_progress_interval(),
            ordering: PlaylistOrdering::default(),
            dedupe: default_dedupe(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            seed_file: default_seed_file(),
            remote_url: None,
            fetch_attempts: default_fetch_attempts(),
            fetch_retry_delay: default_fetch_retry_delay(),
            fetch_timeout: default_fetch_timeout(),
            udp_prescreen: default_udp_prescreen(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the TOML file if present, then
    /// `RELAY_SCOUT_*` environment variables (nested keys split on `__`).
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        let path = config_file.as_ref();
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if path.exists() {
            figment = figment.merge(Toml::file(path));
            info!("Configuration loaded from: {}", path.display());
        } else {
            debug!(
                "Config file {} not found, using defaults and environment",
                path.display()
            );
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> AppResult<()> {
        if self.validation.concurrency == 0 {
            return Err(AppError::configuration(
                "validation.concurrency must be at least 1",
            ));
        }
        if self.probe.max_chunks == 0 {
            return Err(AppError::configuration(
                "probe.max_chunks must be at least 1",
            ));
        }
        if self.sources.fetch_attempts == 0 {
            return Err(AppError::configuration(
                "sources.fetch_attempts must be at least 1",
            ));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> AppResult<String> {
        toml::to_string_pretty(self).map_err(|e| AppError::internal(e.to_string()))
    }
}
