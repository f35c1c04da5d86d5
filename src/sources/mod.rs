//! Candidate relay discovery
//!
//! Candidates come from two places:
//! - a local seed file scanned for `http(s)://host[:port]` substrings
//! - an optional remote document in the same textual format, fetched with
//!   a fixed-delay retry
//!
//! Neither source is fatal: a missing seed file or an exhausted remote fetch
//! simply contributes no candidates.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::SourcesConfig;
use crate::errors::{AppResult, SourceError, SourceResult};
use crate::models::CandidateUrl;
use crate::utils::{RetryPolicy, UrlUtils, with_retry};

static CANDIDATE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[A-Za-z0-9](?:[A-Za-z0-9.\-]*[A-Za-z0-9])?(?::\d+)?")
        .expect("candidate URL pattern is valid")
});

/// Every `http(s)://host[:port]` match in `content`, in order of appearance
pub fn extract_candidates(content: &str) -> Vec<CandidateUrl> {
    CANDIDATE_URL
        .find_iter(content)
        .map(|m| CandidateUrl::new(m.as_str()))
        .collect()
}

/// Scan the local seed file; absent or unreadable files yield no candidates
pub async fn load_seed_file(path: &Path) -> Vec<CandidateUrl> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let candidates = extract_candidates(&content);
            info!(
                "Loaded {} candidate(s) from seed file {}",
                candidates.len(),
                path.display()
            );
            candidates
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Seed file {} not present", path.display());
            Vec::new()
        }
        Err(e) => {
            warn!("Seed file {} unreadable: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Remote candidate list fetched over HTTP
pub struct RemoteCandidateSource {
    client: Client,
    url: String,
    retry: RetryPolicy,
}

impl RemoteCandidateSource {
    pub fn new(client: Client, url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            url: url.into(),
            retry,
        }
    }

    pub fn from_config(url: &str, config: &SourcesConfig) -> AppResult<Self> {
        let client = Client::builder().timeout(config.fetch_timeout).build()?;
        Ok(Self::new(
            client,
            url,
            RetryPolicy::new(config.fetch_attempts, config.fetch_retry_delay),
        ))
    }

    /// Fetch and extract candidates, retrying transient failures
    pub async fn fetch(&self) -> SourceResult<Vec<CandidateUrl>> {
        let safe_url = UrlUtils::obfuscate_credentials(&self.url);
        let content = with_retry(&self.retry, || self.fetch_once(), "remote_candidates")
            .await
            .map_err(|e| SourceError::Fetch {
                url: safe_url.clone(),
                attempts: self.retry.max_attempts,
                message: e,
            })?;

        let candidates = extract_candidates(&content);
        info!("Fetched {} candidate(s) from {}", candidates.len(), safe_url);
        Ok(candidates)
    }

    /// Like [`fetch`](Self::fetch) but degrades to an empty list
    pub async fn fetch_or_empty(&self) -> Vec<CandidateUrl> {
        match self.fetch().await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Remote candidate list unavailable, continuing without it: {}", e);
                Vec::new()
            }
        }
    }

    /// One GET; the error is a log-safe message for the final `Fetch` error
    async fn fetch_once(&self) -> Result<String, String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| UrlUtils::obfuscate_credentials(&e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP status {status}"));
        }

        response
            .text()
            .await
            .map_err(|e| UrlUtils::obfuscate_credentials(&e.to_string()))
    }
}

/// Merge candidate lists, keeping the first occurrence of each base URL
pub fn merge_candidates<I>(lists: I) -> Vec<CandidateUrl>
where
    I: IntoIterator<Item = Vec<CandidateUrl>>,
{
    let mut seen = HashSet::new();
    lists
        .into_iter()
        .flatten()
        .filter(|candidate| seen.insert(candidate.base_url.clone()))
        .collect()
}

/// Gather candidates from the seed file and, if configured, the remote list
pub async fn discover_candidates(config: &SourcesConfig) -> AppResult<Vec<CandidateUrl>> {
    let seed = load_seed_file(&config.seed_file).await;

    let remote = match &config.remote_url {
        Some(url) => {
            RemoteCandidateSource::from_config(url, config)?
                .fetch_or_empty()
                .await
        }
        None => Vec::new(),
    };

    let merged = merge_candidates([seed, remote]);
    info!("Discovered {} unique candidate base URL(s)", merged.len());
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const QUICK_RETRY_DELAY: Duration = Duration::from_millis(10);

    #[test]
    fn test_extract_candidates_from_playlist_output() {
        let content = "\
CCTV1,http://183.1.2.3:8888/udp/239.77.0.1:5146
CCTV2,https://relay.example.com/udp/239.77.0.2:5146
see also http://10.0.0.1 and garbage htp://nope
";
        let candidates = extract_candidates(content);
        let urls: Vec<&str> = candidates.iter().map(|c| c.base_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://183.1.2.3:8888",
                "https://relay.example.com",
                "http://10.0.0.1",
            ]
        );
    }

    #[test]
    fn test_merge_candidates_preserves_first_seen_order() {
        let merged = merge_candidates([
            vec![CandidateUrl::new("http://a:1"), CandidateUrl::new("http://b:2")],
            vec![CandidateUrl::new("http://b:2"), CandidateUrl::new("http://c:3")],
        ]);
        let urls: Vec<&str> = merged.iter().map(|c| c.base_url.as_str()).collect();
        assert_eq!(urls, vec!["http://a:1", "http://b:2", "http://c:3"]);
    }

    #[tokio::test]
    async fn test_missing_seed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_seed_file(&dir.path().join("gdzb.txt")).await.is_empty());
    }

    #[tokio::test]
    async fn test_seed_file_is_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gdzb.txt");
        std::fs::write(&path, "A,http://1.2.3.4:4022/udp/239.0.0.1:1\n").unwrap();

        let candidates = load_seed_file(&path).await;
        assert_eq!(candidates, vec![CandidateUrl::new("http://1.2.3.4:4022")]);
    }

    #[tokio::test]
    async fn test_remote_fetch_exhausts_retries_against_dead_host() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let source = RemoteCandidateSource::new(
            Client::new(),
            format!("http://127.0.0.1:{port}/list.txt"),
            RetryPolicy::new(2, QUICK_RETRY_DELAY),
        );

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Fetch { attempts: 2, .. }));
        let message = err.to_string();
        assert_eq!(message.matches("Fetch failed").count(), 1, "{message}");
        assert!(source.fetch_or_empty().await.is_empty());
    }
}
