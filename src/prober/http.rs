//! HTTP stream probe
//!
//! 1. HEAD with a browser-like User-Agent; any 2xx is conclusive.
//! 2. Otherwise a streaming GET: status must be 200 or 302, then either a
//!    media `Content-Type` or a single non-empty body chunk among the first
//!    `max_chunks` stream items is enough.
//!
//! One `http_timeout` deadline covers both requests.
//!
//! The heuristic is deliberately loose: any endpoint that returns bytes is
//! treated as alive.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode, header, redirect};
use tracing::{debug, trace};

use super::Prober;
use crate::config::ProbeConfig;
use crate::errors::{AppResult, ProbeErrorKind, ProbeFailure};
use crate::models::{AliveReason, ProbeOutcome};
use crate::utils::UrlUtils;

const MAX_REDIRECTS: usize = 10;

/// Probes HTTP relay endpoints for stream-like responses
#[derive(Clone)]
pub struct HttpStreamProber {
    client: Client,
    timeout: Duration,
    max_chunks: usize,
}

impl HttpStreamProber {
    pub fn new(client: Client, timeout: Duration, max_chunks: usize) -> Self {
        Self {
            client,
            timeout,
            max_chunks,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> AppResult<Self> {
        let policy = if config.follow_redirects {
            redirect::Policy::limited(MAX_REDIRECTS)
        } else {
            redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(policy)
            .build()?;

        Ok(Self::new(client, config.http_timeout, config.max_chunks))
    }

    /// Run the full HEAD-then-GET probe against `url` within one timeout
    pub async fn probe_http(&self, url: &str) -> ProbeOutcome {
        let safe_url = UrlUtils::obfuscate_credentials(url);

        let outcome = tokio::time::timeout(self.timeout, self.head_then_stream(url, &safe_url))
            .await
            .unwrap_or_else(|_| {
                Err(ProbeFailure::new(
                    ProbeErrorKind::Timeout,
                    format!("no verdict within {:?}", self.timeout),
                ))
            });

        match &outcome {
            Ok(reason) => debug!("Stream probe alive ({:?}): {}", reason, safe_url),
            Err(failure) => debug!("Stream probe failed {}: {}", safe_url, failure),
        }
        outcome
    }

    async fn head_then_stream(&self, url: &str, safe_url: &str) -> ProbeOutcome {
        if self.head_is_conclusive(url, safe_url).await {
            return Ok(AliveReason::HeadOk);
        }
        self.probe_stream(url).await
    }

    async fn head_is_conclusive(&self, url: &str, safe_url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                trace!("HEAD {} -> {}", safe_url, response.status());
                response.status().is_success()
            }
            Err(e) => {
                trace!("HEAD {} failed, falling back to GET: {}", safe_url, e);
                false
            }
        }
    }

    async fn probe_stream(&self, url: &str) -> ProbeOutcome {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeFailure::from_reqwest(&e))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::FOUND {
            return Err(ProbeFailure::new(
                ProbeErrorKind::Status,
                format!("unexpected status {status}"),
            ));
        }

        if let Some(content_type) = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            && is_media_content_type(content_type)
        {
            return Ok(AliveReason::MediaContentType);
        }

        let mut body = response.bytes_stream();
        let mut chunks = 0usize;

        while chunks < self.max_chunks {
            match body.next().await {
                Some(Ok(chunk)) => {
                    chunks += 1;
                    if !chunk.is_empty() {
                        return Ok(AliveReason::BodyData);
                    }
                }
                Some(Err(e)) => return Err(ProbeFailure::from_reqwest(&e)),
                None => break,
            }
        }

        Err(ProbeFailure::new(
            ProbeErrorKind::NoData,
            format!("no data within {chunks} chunk(s)"),
        ))
    }
}

#[async_trait]
impl Prober for HttpStreamProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        self.probe_http(url).await
    }
}

fn is_media_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.contains("video") || lower.contains("audio")
}
