//! Playlist assembly and output
//!
//! Combines catalog channels with candidate relays, validates every pairing
//! and keeps the live ones as `name,url` lines.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use tracing::{error, info, warn};

use crate::catalog::load_catalog;
use crate::config::PlaylistOrdering;
use crate::errors::{AppError, AppResult, CatalogError};
use crate::models::{CandidateUrl, ChannelEntry, PlaylistLine, ValidationStats};
use crate::validation::{ProgressObserver, ValidationDriver};

/// Why a run stopped before probing anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoCandidates,
    CatalogMissing,
    CatalogEmpty,
    CatalogUnreadable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::NoCandidates => "no candidate relays",
            SkipReason::CatalogMissing => "channel catalog not found",
            SkipReason::CatalogEmpty => "channel catalog has no channel lines",
            SkipReason::CatalogUnreadable => "channel catalog unreadable",
        };
        f.write_str(text)
    }
}

impl From<&CatalogError> for SkipReason {
    fn from(err: &CatalogError) -> Self {
        match err {
            CatalogError::Missing { .. } => SkipReason::CatalogMissing,
            CatalogError::Empty { .. } => SkipReason::CatalogEmpty,
            CatalogError::Unreadable { .. } => SkipReason::CatalogUnreadable,
        }
    }
}

/// Result of one assembly run
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    pub lines: Vec<PlaylistLine>,
    pub stats: ValidationStats,
    /// Set when the run ended early on empty or unusable input
    pub skip_reason: Option<SkipReason>,
}

impl Playlist {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            skip_reason: Some(reason),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

pub struct PlaylistAssembler {
    driver: ValidationDriver,
    ordering: PlaylistOrdering,
    dedupe: bool,
}

impl PlaylistAssembler {
    pub fn new(driver: ValidationDriver) -> Self {
        Self {
            driver,
            ordering: PlaylistOrdering::default(),
            dedupe: false,
        }
    }

    pub fn with_ordering(mut self, ordering: PlaylistOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// Validate every (candidate, channel) pairing and collect the live ones
    ///
    /// Lines come out in probe completion order unless sorting or dedupe was
    /// requested.
    pub async fn assemble(
        &self,
        candidates: &[CandidateUrl],
        channels: &[ChannelEntry],
        observer: &mut dyn ProgressObserver,
    ) -> Playlist {
        if candidates.is_empty() {
            return Playlist::skipped(SkipReason::NoCandidates);
        }

        let report = self
            .driver
            .validate_all(candidates, channels, observer)
            .await;

        let lines = report
            .alive()
            .map(|result| PlaylistLine::new(&result.channel_name, &result.full_url))
            .collect();

        Playlist {
            lines: self.finish(lines),
            stats: report.stats,
            skip_reason: None,
        }
    }

    /// Load the catalog at `catalog_path`, then [`assemble`](Self::assemble)
    ///
    /// A missing, empty or unreadable catalog ends the run before any probe.
    pub async fn assemble_from_file(
        &self,
        candidates: &[CandidateUrl],
        catalog_path: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> Playlist {
        let channels = match load_catalog(catalog_path).await {
            Ok(channels) => channels,
            Err(err) => {
                match &err {
                    CatalogError::Unreadable { .. } => error!("{}", err),
                    _ => warn!("{}", err),
                }
                return Playlist::skipped(SkipReason::from(&err));
            }
        };

        self.assemble(candidates, &channels, observer).await
    }

    fn finish(&self, mut lines: Vec<PlaylistLine>) -> Vec<PlaylistLine> {
        if self.dedupe {
            let mut seen = HashSet::new();
            lines.retain(|line| seen.insert(line.clone()));
        }
        if self.ordering == PlaylistOrdering::Sorted {
            lines.sort();
        }
        lines
    }
}

/// Overwrite `path` with newline-joined lines
///
/// Nothing is written for an empty playlist; returns whether the file was
/// written.
pub async fn write_playlist(path: &Path, lines: &[PlaylistLine]) -> AppResult<bool> {
    if lines.is_empty() {
        info!("No valid entries, leaving {} untouched", path.display());
        return Ok(false);
    }

    let content = lines
        .iter()
        .map(PlaylistLine::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    tokio::fs::write(path, content)
        .await
        .map_err(|e| AppError::io(path.display().to_string(), e))?;

    info!("Wrote {} entries to {}", lines.len(), path.display());
    Ok(true)
}
