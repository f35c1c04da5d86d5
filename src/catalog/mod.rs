//! Channel catalog loading
//!
//! The catalog is a UTF-8 text file with one `<name>, rtp://<ipv4>:<port>`
//! line per channel. Non-matching lines are ignored; order and duplicate
//! names are preserved.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::errors::{CatalogError, CatalogResult};
use crate::models::ChannelEntry;

static CHANNEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(.*?)\s*,\s*rtp://(\d+\.\d+\.\d+\.\d+:\d+)\s*$")
        .expect("channel line pattern is valid")
});

/// Extract every channel line from catalog text
pub fn parse_catalog(content: &str) -> Vec<ChannelEntry> {
    CHANNEL_LINE
        .captures_iter(content)
        .map(|caps| ChannelEntry::new(&caps[1], &caps[2]))
        .collect()
}

/// Read and parse the catalog at `path`
///
/// A missing file and a file without any channel lines are reported as
/// distinct errors so the caller can stop early with a clear message.
pub async fn load_catalog(path: &Path) -> CatalogResult<Vec<ChannelEntry>> {
    let path_str = path.display().to_string();

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => CatalogError::Missing {
            path: path_str.clone(),
        },
        _ => CatalogError::Unreadable {
            path: path_str.clone(),
            message: e.to_string(),
        },
    })?;

    let content = String::from_utf8(bytes).map_err(|e| CatalogError::Unreadable {
        path: path_str.clone(),
        message: format!("invalid UTF-8: {e}"),
    })?;

    let channels = parse_catalog(&content);
    if channels.is_empty() {
        return Err(CatalogError::Empty { path: path_str });
    }

    debug!("Parsed {} catalog line(s) from {}", channels.len(), path_str);
    info!("Found {} channels in catalog", channels.len());
    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_lines() {
        let content = "ChannelA, rtp://10.0.0.1:9000\nChannelB, rtp://10.0.0.2:9001";
        let channels = parse_catalog(content);
        assert_eq!(
            channels,
            vec![
                ChannelEntry::new("ChannelA", "10.0.0.1:9000"),
                ChannelEntry::new("ChannelB", "10.0.0.2:9001"),
            ]
        );
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_crlf() {
        let content = "CCTV-1 ,rtp://239.77.0.1:5146\r\nCCTV-2 ,   rtp://239.77.0.2:5146\r\n";
        let channels = parse_catalog(content);
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].name, "CCTV-1");
        assert_eq!(channels[1].raw_endpoint, "239.77.0.2:5146");
    }

    #[test]
    fn test_parse_skips_non_matching_lines_and_keeps_duplicates() {
        let content = "\
#genre,#genre#
News, rtp://239.0.0.1:1234
News, rtp://239.0.0.9:1234
Movies, http://not-rtp.example/stream
Sports, rtp://239.0.0.3
Music, rtp://239.0.0.4:1234
";
        let channels = parse_catalog(content);
        let names: Vec<&str> = channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["News", "News", "Music"]);
    }

    #[test]
    fn test_parse_name_may_contain_commas() {
        let channels = parse_catalog("News, Weather, rtp://239.0.0.1:1234");
        assert_eq!(channels, vec![ChannelEntry::new("News, Weather", "239.0.0.1:1234")]);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(&dir.path().join("gdNet.txt")).await.unwrap_err();
        assert!(matches!(err, CatalogError::Missing { .. }));
    }

    #[tokio::test]
    async fn test_load_file_without_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gdNet.txt");
        std::fs::write(&path, "nothing useful here\n").unwrap();

        let err = load_catalog(&path).await.unwrap_err();
        assert!(matches!(err, CatalogError::Empty { .. }));
    }

    #[tokio::test]
    async fn test_load_invalid_utf8_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gdNet.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let err = load_catalog(&path).await.unwrap_err();
        assert!(matches!(err, CatalogError::Unreadable { .. }));
    }

    #[tokio::test]
    async fn test_load_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gdNet.txt");
        std::fs::write(&path, "A, rtp://1.1.1.1:1\nB, rtp://2.2.2.2:2\n").unwrap();

        let channels = load_catalog(&path).await.unwrap();
        assert_eq!(channels.len(), 2);
    }
}
