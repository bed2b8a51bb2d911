//! Read-only access to the recording/tag catalog.
//!
//! The recommendation pipeline depends only on [`TagStore`], so any relational or
//! document store can sit behind it. Implementations may return rows in any order
//! except where a method documents one.

use crate::{
    error::AppResult,
    models::{CandidateOverlap, Recording, RecordingId, TagId, TagWeight},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryTagStore;
pub use postgres::PgTagStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TagStore: Send + Sync {
    /// Recording whose name equals `name` exactly; the one with the highest
    /// `tag_count` when several match.
    async fn find_recording_by_exact_name(&self, name: &str) -> AppResult<Option<Recording>>;

    /// Tags of one recording, heaviest first, at most `limit` entries.
    async fn tags_for_recording(&self, id: RecordingId, limit: usize)
        -> AppResult<Vec<TagWeight>>;

    /// Internal ids for the given global ids. Unknown ids are omitted.
    async fn resolve_ids_by_global_ids(&self, gids: &[String]) -> AppResult<Vec<RecordingId>>;

    /// Distinct tag ids attached to any of the recordings.
    async fn tag_set_for_recordings(&self, ids: &[RecordingId]) -> AppResult<Vec<TagId>>;

    /// Recordings outside `exclude` sharing at least one tag with `tag_ids`, with the
    /// number of distinct shared tags. Sorted by overlap desc then id asc, at most
    /// `limit` rows.
    async fn candidates_by_tag_overlap(
        &self,
        tag_ids: &[TagId],
        exclude: &[RecordingId],
        limit: usize,
    ) -> AppResult<Vec<CandidateOverlap>>;

    async fn recordings_by_ids(&self, ids: &[RecordingId]) -> AppResult<Vec<Recording>>;

    /// Names of the tags of `id` that are also in `tag_ids`.
    async fn matched_tag_names(&self, id: RecordingId, tag_ids: &[TagId])
        -> AppResult<Vec<String>>;
}
