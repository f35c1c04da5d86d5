use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relay_scout::{
    config::{Config, PlaylistOrdering, defaults::DEFAULT_CONFIG_FILE},
    playlist::{Playlist, PlaylistAssembler, write_playlist},
    prober::TransportProber,
    sources::discover_candidates,
    validation::{LogProgressObserver, ValidationDriver, prescreen_candidates},
};

/// Exit code for `--strict` runs that produced no valid entries
const EXIT_NO_VALID_ENTRIES: u8 = 2;
/// Exit code after Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "relay-scout")]
#[command(version)]
#[command(about = "Discovers live IPTV relays and builds a validated channel playlist")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Channel catalog file (overrides config file)
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Local candidate seed file
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,

    /// Playlist output file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Remote candidate list URL
    #[arg(long, value_name = "URL")]
    remote_url: Option<String>,

    /// Maximum probes in flight
    #[arg(short = 'j', long, value_name = "N")]
    concurrency: Option<usize>,

    /// Per-request HTTP timeout, e.g. "8s" or "1500ms"
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    http_timeout: Option<Duration>,

    /// Filter candidates through the UDP probe first
    #[arg(long)]
    udp_prescreen: bool,

    /// Playlist line ordering
    #[arg(long, value_enum)]
    ordering: Option<PlaylistOrdering>,

    /// Drop repeated playlist lines
    #[arg(long)]
    dedupe: bool,

    /// Exit with a non-zero status when no valid entries were found
    #[arg(long)]
    strict: bool,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Print the effective configuration and exit
    #[arg(long)]
    dump_config: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(catalog) = &self.catalog {
            config.catalog.path = catalog.clone();
        }
        if let Some(seed) = &self.seed {
            config.sources.seed_file = seed.clone();
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(remote_url) = &self.remote_url {
            config.sources.remote_url = Some(remote_url.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config.validation.concurrency = concurrency;
        }
        if let Some(timeout) = self.http_timeout {
            config.probe.http_timeout = timeout;
        }
        if let Some(ordering) = self.ordering {
            config.validation.ordering = ordering;
        }
        if self.udp_prescreen {
            config.sources.udp_prescreen = true;
        }
        if self.dedupe {
            config.validation.dedupe = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_filter = format!("relay_scout={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting relay-scout v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    if cli.dump_config {
        print!("{}", config.to_toml_string()?);
        return Ok(ExitCode::SUCCESS);
    }

    let playlist = tokio::select! {
        playlist = run(&config) => playlist?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, in-flight probes abandoned and no output written");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
    };

    write_playlist(&config.output.path, &playlist.lines).await?;
    log_summary(&playlist);

    if cli.strict && playlist.is_empty() {
        warn!("No valid entries produced");
        return Ok(ExitCode::from(EXIT_NO_VALID_ENTRIES));
    }
    Ok(ExitCode::SUCCESS)
}

async fn run(config: &Config) -> Result<Playlist> {
    let prober = TransportProber::from_config(&config.probe)?;

    let mut candidates = discover_candidates(&config.sources).await?;
    if config.sources.udp_prescreen && !candidates.is_empty() {
        candidates =
            prescreen_candidates(prober.udp(), candidates, config.validation.concurrency).await;
    }

    let driver = ValidationDriver::new(Arc::new(prober), config.validation.concurrency);
    let assembler = PlaylistAssembler::new(driver)
        .with_ordering(config.validation.ordering)
        .with_dedupe(config.validation.dedupe);

    let mut observer = LogProgressObserver::new(config.validation.progress_interval);
    Ok(assembler
        .assemble_from_file(&candidates, &config.catalog.path, &mut observer)
        .await)
}

fn log_summary(playlist: &Playlist) {
    if let Some(reason) = playlist.skip_reason {
        warn!("Nothing validated: {}", reason);
        return;
    }

    let stats = &playlist.stats;
    let elapsed = Duration::from_millis(stats.elapsed.as_millis() as u64);
    info!(
        "Checked {} URL(s) in {}: {} valid, {} failed",
        stats.processed,
        humantime::format_duration(elapsed),
        stats.valid_count,
        stats.failed_count()
    );
    for (kind, count) in &stats.failures {
        info!("  {}: {}", kind, count);
    }
    info!("Playlist contains {} entries", playlist.len());
}
