//! Video URL ingestion: validate, detect, extract, persist

mod duration;
mod extractor;
mod platform;
mod validate;

pub use duration::format_duration;
pub use extractor::{MetadataSource, YtDlp, truncate_chars};
pub use platform::{Platform, detect_platform};
pub use validate::is_valid_video_url;

use extractor::extract_metadata;

#[cfg(test)]
pub(crate) use extractor::testing;

use tracing::info;
use url::Url;

use crate::models::{VideoRecord, VideoSource};
use crate::services::library::VideoStore;

/// Result of importing one pasted URL for a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Input failed validation; nothing was fetched or stored
    Rejected,
    AlreadySaved,
    Saved { id: i64, record: VideoRecord },
}

/// Canonical string form of an already-validated URL
pub fn canonical_url(url: &str) -> Option<String> {
    Url::parse(url.trim()).ok().map(String::from)
}

/// Import `raw_url` into `user_id`'s library.
///
/// Validation happens before any network call. The dedup lookup runs before
/// extraction so repeated submissions skip the fetch; the store's unique
/// constraint settles races between concurrent submissions.
pub async fn ingest_url<S>(
    source: &dyn MetadataSource,
    store: &S,
    user_id: i64,
    raw_url: &str,
) -> Result<IngestOutcome, sqlx::Error>
where
    S: VideoStore + ?Sized,
{
    let raw_url = raw_url.trim();
    if !is_valid_video_url(raw_url) {
        return Ok(IngestOutcome::Rejected);
    }
    let Some(url) = canonical_url(raw_url) else {
        return Ok(IngestOutcome::Rejected);
    };

    if store.find_by_url(user_id, &url).await?.is_some() {
        return Ok(IngestOutcome::AlreadySaved);
    }

    let extraction = extract_metadata(source, &url).await;
    let degraded = extraction.degraded_reason().map(str::to_owned);
    let record = extraction.into_record();

    match store.insert(user_id, &record, VideoSource::Import).await? {
        Some(id) => {
            info!(
                user_id,
                video_id = id,
                platform = ?record.platform,
                degraded = degraded.as_deref(),
                "imported video"
            );
            Ok(IngestOutcome::Saved { id, record })
        }
        None => Ok(IngestOutcome::AlreadySaved),
    }
}
