//! Per-user video library persistence
//!
//! `VideoStore` is the seam between the save flows and storage. The
//! Postgres implementation relies on the `(url, user_id)` unique constraint
//! as the authoritative duplicate guard; the lookup before insert only lets
//! callers skip work for the common repeated-submission case.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::constants::{MAX_DESCRIPTION_CHARS, UNKNOWN_UPLOADER, UNTITLED_VIDEO};
use crate::domain::videos;
use crate::ingest::{detect_platform, truncate_chars};
use crate::models::{VideoRecord, VideoSource};

#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Id of the user's existing video with this URL
    async fn find_by_url(&self, user_id: i64, url: &str) -> Result<Option<i64>, sqlx::Error>;

    /// Insert a video; `None` when the user already has this URL
    async fn insert(
        &self,
        user_id: i64,
        record: &VideoRecord,
        source: VideoSource,
    ) -> Result<Option<i64>, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgVideoStore {
    db: PgPool,
}

impl PgVideoStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn find_by_url(&self, user_id: i64, url: &str) -> Result<Option<i64>, sqlx::Error> {
        videos::find_video_id_by_url(&self.db, user_id, url).await
    }

    async fn insert(
        &self,
        user_id: i64,
        record: &VideoRecord,
        source: VideoSource,
    ) -> Result<Option<i64>, sqlx::Error> {
        videos::insert_video(&self.db, user_id, record, source).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(i64),
    AlreadySaved,
}

/// Check-then-insert save of a ready record
pub async fn save_video<S>(
    store: &S,
    user_id: i64,
    record: &VideoRecord,
    source: VideoSource,
) -> Result<SaveOutcome, sqlx::Error>
where
    S: VideoStore + ?Sized,
{
    if store.find_by_url(user_id, &record.url).await?.is_some() {
        return Ok(SaveOutcome::AlreadySaved);
    }

    Ok(match store.insert(user_id, record, source).await? {
        Some(id) => SaveOutcome::Saved(id),
        None => SaveOutcome::AlreadySaved,
    })
}

/// Record for a search result the user picked. No extraction is attempted.
pub fn record_from_search_hit(title: &str, url: &str, description: &str) -> VideoRecord {
    let title = title.trim();

    VideoRecord {
        title: if title.is_empty() {
            UNTITLED_VIDEO.to_string()
        } else {
            title.to_string()
        },
        url: url.to_string(),
        description: truncate_chars(description, MAX_DESCRIPTION_CHARS),
        thumbnail: None,
        duration: 0,
        platform: detect_platform(url),
        uploader_name: UNKNOWN_UPLOADER.to_string(),
        extraction_succeeded: false,
        extraction_error: None,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store enforcing the same `(url, user_id)` uniqueness
    #[derive(Default)]
    pub struct MemoryStore {
        rows: Mutex<Vec<(i64, i64, String)>>,
        lookups: AtomicUsize,
        racing_insert: bool,
    }

    impl MemoryStore {
        /// Lookups miss but inserts conflict, as when another request wins
        /// the race between check and insert.
        pub fn with_racing_insert(mut self) -> Self {
            self.racing_insert = true;
            self
        }

        pub fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }

        pub fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    #[async_trait]
    impl VideoStore for MemoryStore {
        async fn find_by_url(&self, user_id: i64, url: &str) -> Result<Option<i64>, sqlx::Error> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.racing_insert {
                return Ok(None);
            }
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|(_, owner, u)| *owner == user_id && u == url)
                .map(|(id, _, _)| *id))
        }

        async fn insert(
            &self,
            user_id: i64,
            record: &VideoRecord,
            _source: VideoSource,
        ) -> Result<Option<i64>, sqlx::Error> {
            if self.racing_insert {
                return Ok(None);
            }
            let mut rows = self.rows.lock().unwrap();
            if rows
                .iter()
                .any(|(_, owner, u)| *owner == user_id && *u == record.url)
            {
                return Ok(None);
            }
            let id = rows.len() as i64 + 1;
            rows.push((id, user_id, record.url.clone()));
            Ok(Some(id))
        }
    }
}
