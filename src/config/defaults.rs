//! Configuration default values
//!
//! This module contains all the default values for configuration options,
//! making them easily changeable in one central location.

// Probe defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_UDP_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_UDP_TARGET_PORT: u16 = 5146;
pub const DEFAULT_MAX_CHUNKS: usize = 4;
pub const DEFAULT_FOLLOW_REDIRECTS: bool = true;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Validation defaults
pub const DEFAULT_CONCURRENCY: usize = 20;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 25;
pub const DEFAULT_DEDUPE: bool = false;

// Candidate source defaults
pub const DEFAULT_SEED_FILE: &str = "gdzb.txt";
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;
pub const DEFAULT_FETCH_RETRY_DELAY_SECS: u64 = 5;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UDP_PRESCREEN: bool = false;

// Catalog and output defaults
pub const DEFAULT_CATALOG_PATH: &str = "gdNet.txt";
pub const DEFAULT_OUTPUT_PATH: &str = "gdzb.txt";

// Loader
pub const DEFAULT_CONFIG_FILE: &str = "relay-scout.toml";
pub const ENV_PREFIX: &str = "RELAY_SCOUT_";
