//! Core data types flowing through the validation pipeline
//!
//! Catalog Loader → [`ChannelEntry`] → Endpoint Synthesizer → [`SynthesizedUrl`]
//! → Validation Driver → [`ProbeResult`] → Playlist Assembler → [`PlaylistLine`].

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::errors::{ProbeErrorKind, ProbeFailure};

/// A named channel paired with its raw transport endpoint (`ip:port`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    pub name: String,
    pub raw_endpoint: String,
}

impl ChannelEntry {
    pub fn new<N: Into<String>, E: Into<String>>(name: N, raw_endpoint: E) -> Self {
        Self {
            name: name.into(),
            raw_endpoint: raw_endpoint.into(),
        }
    }
}

/// An unvalidated relay base address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateUrl {
    pub base_url: String,
}

impl CandidateUrl {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl fmt::Display for CandidateUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

impl From<&str> for CandidateUrl {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One (candidate, channel) pairing ready to be probed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedUrl {
    pub channel_name: String,
    pub full_url: String,
}

/// Why a probe decided an endpoint is alive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliveReason {
    /// Lightweight HEAD check returned a 2xx status
    HeadOk,
    /// Streaming response declared a video/audio content type
    MediaContentType,
    /// Streaming response produced at least one non-empty chunk
    BodyData,
    /// UDP datagram was sent without a socket error
    UdpReachable,
}

/// Verdict of a single probe
pub type ProbeOutcome = Result<AliveReason, ProbeFailure>;

/// A completed probe for one synthesized URL
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub channel_name: String,
    pub full_url: String,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn new(target: SynthesizedUrl, outcome: ProbeOutcome) -> Self {
        Self {
            channel_name: target.channel_name,
            full_url: target.full_url,
            outcome,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn failure_kind(&self) -> Option<ProbeErrorKind> {
        self.outcome.as_ref().err().map(|failure| failure.kind)
    }
}

/// Running counters for a validation batch
///
/// Updated serially by the driver as results arrive; purely observational.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationStats {
    /// Number of probes submitted for the batch
    pub total: usize,
    pub processed: usize,
    pub valid_count: usize,
    pub elapsed: Duration,
    pub failures: BTreeMap<ProbeErrorKind, usize>,
}

impl ValidationStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Fold one completed probe into the counters
    pub fn record(&mut self, result: &ProbeResult, elapsed: Duration) {
        self.processed += 1;
        self.elapsed = elapsed;
        match result.failure_kind() {
            None => self.valid_count += 1,
            Some(kind) => *self.failures.entry(kind).or_insert(0) += 1,
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Probes completed per second so far
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed_seconds();
        if secs > 0.0 {
            self.processed as f64 / secs
        } else {
            0.0
        }
    }

    pub fn failed_count(&self) -> usize {
        self.failures.values().sum()
    }
}

/// A single `name,url` playlist line
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaylistLine(String);

impl PlaylistLine {
    pub fn new(name: &str, url: &str) -> Self {
        Self(format!("{name},{url}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outcome: ProbeOutcome) -> ProbeResult {
        ProbeResult::new(
            SynthesizedUrl {
                channel_name: "CCTV1".to_string(),
                full_url: "http://relay.example/udp/239.0.0.1:5000".to_string(),
            },
            outcome,
        )
    }

    #[test]
    fn test_stats_record_counts_valid_and_failures() {
        let mut stats = ValidationStats::new(3);
        stats.record(&result(Ok(AliveReason::HeadOk)), Duration::from_secs(1));
        stats.record(
            &result(Err(ProbeFailure::new(ProbeErrorKind::Timeout, "slow"))),
            Duration::from_secs(2),
        );
        stats.record(
            &result(Err(ProbeFailure::new(ProbeErrorKind::Timeout, "slow"))),
            Duration::from_secs(4),
        );

        assert_eq!(stats.processed, 3);
        assert_eq!(stats.valid_count, 1);
        assert_eq!(stats.failed_count(), 2);
        assert_eq!(stats.failures.get(&ProbeErrorKind::Timeout), Some(&2));
        assert_eq!(stats.rate(), 0.75);
    }

    #[test]
    fn test_rate_is_zero_before_time_passes() {
        let stats = ValidationStats::new(10);
        assert_eq!(stats.rate(), 0.0);
    }

    #[test]
    fn test_playlist_line_format() {
        let line = PlaylistLine::new("ChannelA", "http://base/udp/10.0.0.1:9000");
        assert_eq!(line.as_str(), "ChannelA,http://base/udp/10.0.0.1:9000");
    }
}
