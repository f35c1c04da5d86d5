//! Endpoint synthesis
//!
//! Builds `{base}/udp/{ip:port}` relay URLs. No well-formedness check is
//! made here; a bad base surfaces later as a probe failure.

use crate::models::{CandidateUrl, ChannelEntry, SynthesizedUrl};

/// Path segment relays expose multicast groups under
pub const RELAY_PATH_SEGMENT: &str = "udp/";

/// Strip trailing slashes from `base_url`, then append `udp/` and the raw endpoint
pub fn synthesize(base_url: &str, channel: &ChannelEntry) -> String {
    format!(
        "{}/{}{}",
        base_url.trim_end_matches('/'),
        RELAY_PATH_SEGMENT,
        channel.raw_endpoint
    )
}

/// Pair one candidate with one channel
pub fn synthesize_entry(candidate: &CandidateUrl, channel: &ChannelEntry) -> SynthesizedUrl {
    SynthesizedUrl {
        channel_name: channel.name.clone(),
        full_url: synthesize(&candidate.base_url, channel),
    }
}

/// Cartesian product of candidates × channels, candidate-major
pub fn synthesize_all(candidates: &[CandidateUrl], channels: &[ChannelEntry]) -> Vec<SynthesizedUrl> {
    candidates
        .iter()
        .flat_map(|candidate| {
            channels
                .iter()
                .map(move |channel| synthesize_entry(candidate, channel))
        })
        .collect()
}
