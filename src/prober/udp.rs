//! UDP reachability probe
//!
//! Sends a zero-length datagram to a fixed port on the URL's host and waits
//! briefly for any reply. Relays are not required to answer, so a receive
//! timeout still counts as reachable; only an unusable URL or a socket error
//! fails the probe.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{UdpSocket, lookup_host};
use tracing::{debug, trace};

use super::Prober;
use crate::config::ProbeConfig;
use crate::errors::{ProbeErrorKind, ProbeFailure};
use crate::models::{AliveReason, ProbeOutcome};
use crate::utils::UrlUtils;

const RECV_BUFFER_SIZE: usize = 1500;

#[derive(Debug, Clone)]
pub struct UdpReachabilityProber {
    target_port: u16,
    timeout: Duration,
}

impl UdpReachabilityProber {
    pub fn new(target_port: u16, timeout: Duration) -> Self {
        Self {
            target_port,
            timeout,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(config.udp_target_port, config.udp_timeout)
    }

    /// Returns the URL unchanged when reachable, `None` when unreachable or
    /// malformed.
    pub async fn probe_udp(&self, url: &str) -> Option<String> {
        match self.check(url).await {
            Ok(()) => Some(url.to_string()),
            Err(failure) => {
                debug!(
                    "UDP probe failed {}: {}",
                    UrlUtils::obfuscate_credentials(url),
                    failure
                );
                None
            }
        }
    }

    async fn check(&self, url: &str) -> Result<(), ProbeFailure> {
        // Host must be known before any socket is opened.
        let host = UrlUtils::extract_host(url).ok_or_else(|| {
            ProbeFailure::new(ProbeErrorKind::MalformedUrl, "no host in URL")
        })?;

        let target = self.resolve(&host).await?;
        let bind_addr: SocketAddr = if target.is_ipv6() {
            SocketAddr::from(([0u16; 8], 0))
        } else {
            SocketAddr::from(([0u8; 4], 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| ProbeFailure::new(ProbeErrorKind::Socket, e.to_string()))?;

        socket
            .send_to(&[], target)
            .await
            .map_err(|e| ProbeFailure::new(ProbeErrorKind::Socket, e.to_string()))?;

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        match tokio::time::timeout(self.timeout, socket.recv_from(&mut buf)).await {
            Ok(Ok((len, peer))) => {
                trace!("UDP reply from {} ({} bytes)", peer, len);
                Ok(())
            }
            Ok(Err(e)) => Err(ProbeFailure::new(ProbeErrorKind::Socket, e.to_string())),
            Err(_) => {
                trace!("No UDP reply from {} within {:?}", target, self.timeout);
                Ok(())
            }
        }
    }

    async fn resolve(&self, host: &str) -> Result<SocketAddr, ProbeFailure> {
        lookup_host((host, self.target_port))
            .await
            .map_err(|e| ProbeFailure::new(ProbeErrorKind::Transport, e.to_string()))?
            .next()
            .ok_or_else(|| {
                ProbeFailure::new(
                    ProbeErrorKind::Transport,
                    format!("host '{host}' resolved to no addresses"),
                )
            })
    }
}

#[async_trait]
impl Prober for UdpReachabilityProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        self.check(url).await.map(|()| AliveReason::UdpReachable)
    }
}
