//! Concurrent validation driver
//!
//! Fans synthesized URLs out over a bounded pool of in-flight probes and
//! aggregates results on the calling task as they complete. Counters are
//! never shared with probe futures; every update happens in one place and is
//! handed to a [`ProgressObserver`] for display.

use std::sync::Arc;
use std::time::Instant;

use futures::{StreamExt, stream};
use tracing::{debug, info};

use crate::models::{CandidateUrl, ChannelEntry, ProbeResult, SynthesizedUrl, ValidationStats};
use crate::prober::{Prober, UdpReachabilityProber};
use crate::synthesizer::synthesize_all;
use crate::utils::UrlUtils;

/// Receives every completed probe together with the updated counters
pub trait ProgressObserver: Send {
    fn on_probe_complete(&mut self, result: &ProbeResult, stats: &ValidationStats);
}

impl<F> ProgressObserver for F
where
    F: FnMut(&ProbeResult, &ValidationStats) + Send,
{
    fn on_probe_complete(&mut self, result: &ProbeResult, stats: &ValidationStats) {
        self(result, stats)
    }
}

/// Observer that ignores progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_probe_complete(&mut self, _result: &ProbeResult, _stats: &ValidationStats) {}
}

/// Logs a progress line every `interval` completions and at the end of the batch
#[derive(Debug, Clone)]
pub struct LogProgressObserver {
    interval: usize,
}

impl LogProgressObserver {
    /// `interval == 0` only logs the final line
    pub fn new(interval: usize) -> Self {
        Self { interval }
    }

    fn should_report(&self, stats: &ValidationStats) -> bool {
        stats.processed == stats.total
            || (self.interval > 0 && stats.processed % self.interval == 0)
    }
}

impl ProgressObserver for LogProgressObserver {
    fn on_probe_complete(&mut self, result: &ProbeResult, stats: &ValidationStats) {
        match &result.outcome {
            Ok(reason) => debug!(
                "Valid [{}] {} ({:?})",
                result.channel_name,
                UrlUtils::obfuscate_credentials(&result.full_url),
                reason
            ),
            Err(failure) => debug!(
                "Invalid [{}] {}: {}",
                result.channel_name,
                UrlUtils::obfuscate_credentials(&result.full_url),
                failure
            ),
        }

        if self.should_report(stats) {
            info!(
                "Progress: {}/{} checked, {} valid, {:.1} probes/s",
                stats.processed,
                stats.total,
                stats.valid_count,
                stats.rate()
            );
        }
    }
}

/// Everything a finished batch produced
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Results in completion order
    pub results: Vec<ProbeResult>,
    pub stats: ValidationStats,
}

impl ValidationReport {
    pub fn alive(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|result| result.is_alive())
    }
}

/// Runs probes with at most `concurrency` in flight
#[derive(Clone)]
pub struct ValidationDriver {
    prober: Arc<dyn Prober>,
    concurrency: usize,
}

impl ValidationDriver {
    pub fn new(prober: Arc<dyn Prober>, concurrency: usize) -> Self {
        Self {
            prober,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Probe every (candidate, channel) pairing
    pub async fn validate_all(
        &self,
        candidates: &[CandidateUrl],
        channels: &[ChannelEntry],
        observer: &mut dyn ProgressObserver,
    ) -> ValidationReport {
        self.validate_targets(synthesize_all(candidates, channels), observer)
            .await
    }

    /// Probe a prepared list of targets; returns once every probe has finished
    pub async fn validate_targets(
        &self,
        targets: Vec<SynthesizedUrl>,
        observer: &mut dyn ProgressObserver,
    ) -> ValidationReport {
        let mut stats = ValidationStats::new(targets.len());
        if targets.is_empty() {
            debug!("Nothing to validate");
            return ValidationReport {
                results: Vec::new(),
                stats,
            };
        }

        info!(
            "Validating {} URL(s) with concurrency {}",
            targets.len(),
            self.concurrency
        );

        let started = Instant::now();
        let prober = self.prober.as_ref();
        let mut in_flight = stream::iter(targets)
            .map(|target| async move {
                let outcome = prober.probe(&target.full_url).await;
                ProbeResult::new(target, outcome)
            })
            .buffer_unordered(self.concurrency);

        let mut results = Vec::with_capacity(stats.total);
        while let Some(result) = in_flight.next().await {
            stats.record(&result, started.elapsed());
            observer.on_probe_complete(&result, &stats);
            results.push(result);
        }

        ValidationReport { results, stats }
    }
}

/// Keep only candidates whose host passes the UDP reachability probe
///
/// Input order is preserved.
pub async fn prescreen_candidates(
    udp: &UdpReachabilityProber,
    candidates: Vec<CandidateUrl>,
    concurrency: usize,
) -> Vec<CandidateUrl> {
    let before = candidates.len();
    let reachable: Vec<CandidateUrl> = stream::iter(candidates)
        .map(|candidate| async move {
            let reachable = udp.probe_udp(&candidate.base_url).await.is_some();
            reachable.then_some(candidate)
        })
        .buffered(concurrency.max(1))
        .filter_map(|candidate| async move { candidate })
        .collect()
        .await;

    info!(
        "UDP pre-screen kept {}/{} candidate(s)",
        reachable.len(),
        before
    );
    reachable
}
