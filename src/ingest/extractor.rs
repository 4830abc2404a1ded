//! Metadata extraction through yt-dlp
//!
//! The extractor never fails from the caller's point of view: any error from
//! the underlying source is folded into a fallback `VideoRecord` built from
//! the URL alone, tagged as degraded.

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use super::platform::detect_platform;
use crate::constants::{
    GENERIC_DESCRIPTION, MAX_DESCRIPTION_CHARS, MAX_FALLBACK_TITLE_CHARS, UNKNOWN_UPLOADER,
    UNTITLED_VIDEO,
};
use crate::models::VideoRecord;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to run extractor: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),

    #[error("extractor exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("invalid extractor output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The subset of yt-dlp's info object we read. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct RawInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    /// Ordered lowest to highest resolution
    pub thumbnails: Option<Vec<RawThumbnail>>,
    pub duration: Option<f64>,
    pub uploader: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawThumbnail {
    pub url: Option<String>,
}

/// Anything that can fetch raw metadata for a URL
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawInfo, ExtractError>;
}

/// Runs the `yt-dlp` binary in metadata-only mode
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    timeout: Duration,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args([
            "--dump-single-json",
            "--skip-download",
            "--quiet",
            "--no-warnings",
            "--no-check-certificates",
            "--",
            url,
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl MetadataSource for YtDlp {
    async fn fetch(&self, url: &str) -> Result<RawInfo, ExtractError> {
        debug!(url, binary = %self.binary.display(), "running extractor");

        let output = tokio::time::timeout(self.timeout, self.command(url).output())
            .await
            .map_err(|_| ExtractError::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ExtractError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        parse_info(&output.stdout)
    }
}

fn parse_info(stdout: &[u8]) -> Result<RawInfo, ExtractError> {
    Ok(serde_json::from_slice(stdout)?)
}

/// Outcome of one extraction attempt. Both variants carry a complete record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Extracted(VideoRecord),
    Degraded { record: VideoRecord, reason: String },
}

impl Extraction {
    pub fn into_record(self) -> VideoRecord {
        match self {
            Extraction::Extracted(record) | Extraction::Degraded { record, .. } => record,
        }
    }

    /// Why extraction fell back, if it did
    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            Extraction::Extracted(_) => None,
            Extraction::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// Fetch and normalize metadata for `url`, degrading to a URL-derived
/// record on any failure.
pub async fn extract_metadata(source: &dyn MetadataSource, url: &str) -> Extraction {
    match source.fetch(url).await {
        Ok(info) => Extraction::Extracted(normalize(info, url)),
        Err(e) => {
            let reason = e.to_string();
            warn!(url, error = %reason, "extraction failed, using fallback record");
            Extraction::Degraded {
                record: fallback_record(url, &reason),
                reason,
            }
        }
    }
}

/// Fill every `VideoRecord` field from a partial info object
pub fn normalize(info: RawInfo, url: &str) -> VideoRecord {
    let thumbnail = non_blank(info.thumbnail).or_else(|| {
        info.thumbnails
            .and_then(|list| list.into_iter().last())
            .and_then(|best| non_blank(best.url))
    });

    VideoRecord {
        title: non_blank(info.title).unwrap_or_else(|| UNTITLED_VIDEO.to_string()),
        url: url.to_string(),
        description: truncate_chars(
            info.description.as_deref().unwrap_or_default(),
            MAX_DESCRIPTION_CHARS,
        ),
        thumbnail,
        duration: whole_seconds(info.duration),
        platform: detect_platform(url),
        uploader_name: non_blank(info.uploader).unwrap_or_else(|| UNKNOWN_UPLOADER.to_string()),
        extraction_succeeded: true,
        extraction_error: None,
    }
}

/// Record built from URL heuristics alone. The title is the decoded last
/// path segment, so canonicalized URLs read the way the user typed them.
pub fn fallback_record(url: &str, reason: &str) -> VideoRecord {
    let platform = detect_platform(url);

    let last = url.rsplit('/').next().unwrap_or_default();
    let decoded = percent_decode_str(last).decode_utf8_lossy();
    let segment = decoded.trim();
    let title = if segment.is_empty() {
        UNTITLED_VIDEO.to_string()
    } else {
        truncate_chars(segment, MAX_FALLBACK_TITLE_CHARS)
    };

    let description = match platform {
        Some(platform) => format!("Video from {}", platform),
        None => GENERIC_DESCRIPTION.to_string(),
    };

    VideoRecord {
        title,
        url: url.to_string(),
        description,
        thumbnail: None,
        duration: 0,
        platform,
        uploader_name: UNKNOWN_UPLOADER.to_string(),
        extraction_succeeded: false,
        extraction_error: Some(reason.to_string()),
    }
}

/// First `max` characters of `s` (char-based, never splits a code point)
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn whole_seconds(duration: Option<f64>) -> u64 {
    match duration {
        Some(secs) if secs.is_finite() && secs > 0.0 => secs as u64,
        _ => 0,
    }
}
