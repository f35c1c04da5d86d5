//! Reachability probing
//!
//! A probe answers one question about one URL: is something there that
//! plausibly serves a stream? Ambiguous signals resolve to "alive"; every
//! failure is returned as a [`ProbeFailure`](crate::errors::ProbeFailure)
//! value rather than propagated.
//!
//! - [`HttpStreamProber`]: HEAD fast path, then a bounded streaming GET
//! - [`UdpReachabilityProber`]: zero-length datagram to a fixed port
//! - [`TransportProber`]: picks one of the above from the URL scheme

use async_trait::async_trait;

use crate::config::ProbeConfig;
use crate::errors::{AppResult, ProbeErrorKind, ProbeFailure};
use crate::models::ProbeOutcome;
use crate::utils::UrlUtils;

pub mod http;
pub mod udp;

pub use http::HttpStreamProber;
pub use udp::UdpReachabilityProber;

/// A single reachability check against one URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// Routes each URL to the HTTP or UDP strategy by scheme
pub struct TransportProber {
    http: HttpStreamProber,
    udp: UdpReachabilityProber,
}

impl TransportProber {
    pub fn new(http: HttpStreamProber, udp: UdpReachabilityProber) -> Self {
        Self { http, udp }
    }

    pub fn from_config(config: &ProbeConfig) -> AppResult<Self> {
        Ok(Self::new(
            HttpStreamProber::from_config(config)?,
            UdpReachabilityProber::from_config(config),
        ))
    }

    pub fn udp(&self) -> &UdpReachabilityProber {
        &self.udp
    }
}

#[async_trait]
impl Prober for TransportProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        match UrlUtils::scheme(url).as_deref() {
            Some("http") | Some("https") => self.http.probe(url).await,
            Some("udp") | Some("rtp") => self.udp.probe(url).await,
            Some(other) => Err(ProbeFailure::new(
                ProbeErrorKind::MalformedUrl,
                format!("unsupported scheme '{other}'"),
            )),
            None => Err(ProbeFailure::new(
                ProbeErrorKind::MalformedUrl,
                "URL does not parse",
            )),
        }
    }
}
