use sqlx::PgPool;
use tracing::instrument;

use super::TagStore;
use crate::{
    error::AppResult,
    models::{CandidateOverlap, Recording, RecordingId, TagId, TagWeight},
};

const RECORDING_COLUMNS: &str =
    "id::bigint AS id, gid::text AS gid, name, tag_count::bigint AS tag_count";

/// Tag store backed by the `recording_min`, `tag` and `recording_tag` tables
#[derive(Clone)]
pub struct PgTagStore {
    pool: PgPool,
}

impl PgTagStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait::async_trait]
impl TagStore for PgTagStore {
    #[instrument(skip(self))]
    async fn find_recording_by_exact_name(&self, name: &str) -> AppResult<Option<Recording>> {
        let sql = format!(
            "SELECT {RECORDING_COLUMNS} FROM recording_min \
             WHERE name = $1 \
             ORDER BY tag_count DESC, id ASC \
             LIMIT 1"
        );
        let recording = sqlx::query_as::<_, Recording>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(recording)
    }

    #[instrument(skip(self))]
    async fn tags_for_recording(
        &self,
        id: RecordingId,
        limit: usize,
    ) -> AppResult<Vec<TagWeight>> {
        let tags = sqlx::query_as::<_, TagWeight>(
            "SELECT t.name AS tag, rt.count::bigint AS weight \
             FROM recording_tag rt JOIN tag t ON t.id = rt.tag_id \
             WHERE rt.recording_id = $1 \
             ORDER BY rt.count DESC, t.name ASC \
             LIMIT $2",
        )
        .bind(id)
        .bind(to_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    #[instrument(skip(self, gids), fields(gid_count = gids.len()))]
    async fn resolve_ids_by_global_ids(&self, gids: &[String]) -> AppResult<Vec<RecordingId>> {
        if gids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = sqlx::query_scalar::<_, RecordingId>(
            "SELECT id::bigint FROM recording_min WHERE gid::text = ANY($1)",
        )
        .bind(gids)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    #[instrument(skip(self, ids), fields(recording_count = ids.len()))]
    async fn tag_set_for_recordings(&self, ids: &[RecordingId]) -> AppResult<Vec<TagId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let tag_ids = sqlx::query_scalar::<_, TagId>(
            "SELECT DISTINCT tag_id::bigint FROM recording_tag WHERE recording_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(tag_ids)
    }

    #[instrument(skip(self, tag_ids, exclude), fields(psize = tag_ids.len(), excluded = exclude.len()))]
    async fn candidates_by_tag_overlap(
        &self,
        tag_ids: &[TagId],
        exclude: &[RecordingId],
        limit: usize,
    ) -> AppResult<Vec<CandidateOverlap>> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        let candidates = sqlx::query_as::<_, CandidateOverlap>(
            "SELECT recording_id::bigint AS recording_id, COUNT(DISTINCT tag_id) AS overlap \
             FROM recording_tag \
             WHERE tag_id = ANY($1) AND NOT (recording_id = ANY($2)) \
             GROUP BY recording_id \
             ORDER BY overlap DESC, recording_id ASC \
             LIMIT $3",
        )
        .bind(tag_ids)
        .bind(exclude)
        .bind(to_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }

    #[instrument(skip(self, ids), fields(recording_count = ids.len()))]
    async fn recordings_by_ids(&self, ids: &[RecordingId]) -> AppResult<Vec<Recording>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {RECORDING_COLUMNS} FROM recording_min WHERE id = ANY($1)");
        let recordings = sqlx::query_as::<_, Recording>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(recordings)
    }

    #[instrument(skip(self, tag_ids), fields(psize = tag_ids.len()))]
    async fn matched_tag_names(
        &self,
        id: RecordingId,
        tag_ids: &[TagId],
    ) -> AppResult<Vec<String>> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        let names = sqlx::query_scalar::<_, String>(
            "SELECT t.name FROM recording_tag rt JOIN tag t ON t.id = rt.tag_id \
             WHERE rt.recording_id = $1 AND rt.tag_id = ANY($2)",
        )
        .bind(id)
        .bind(tag_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}
