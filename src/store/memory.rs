use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::TagStore;
use crate::{
    error::AppResult,
    models::{CandidateOverlap, Recording, RecordingId, TagId, TagWeight},
};

/// Fixture catalog held in memory
///
/// Mirrors the ordering guarantees of [`super::PgTagStore`], which makes it suitable
/// for driving the HTTP surface in tests and local demos without a database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTagStore {
    recordings: BTreeMap<RecordingId, Recording>,
    tags: BTreeMap<TagId, String>,
    /// recording id -> (tag id -> weight)
    edges: BTreeMap<RecordingId, BTreeMap<TagId, i64>>,
}

impl InMemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recording(mut self, recording: Recording) -> Self {
        self.recordings.insert(recording.id, recording);
        self
    }

    pub fn with_tag(mut self, id: TagId, name: impl Into<String>) -> Self {
        self.tags.insert(id, name.into());
        self
    }

    /// Attaches `tag_id` to `recording_id`; a second call for the same pair replaces
    /// the weight.
    pub fn with_edge(mut self, recording_id: RecordingId, tag_id: TagId, weight: i64) -> Self {
        self.edges
            .entry(recording_id)
            .or_default()
            .insert(tag_id, weight);
        self
    }

    fn tag_name(&self, id: TagId) -> Option<&str> {
        self.tags.get(&id).map(String::as_str)
    }
}

#[async_trait::async_trait]
impl TagStore for InMemoryTagStore {
    async fn find_recording_by_exact_name(&self, name: &str) -> AppResult<Option<Recording>> {
        // BTreeMap iterates by ascending id, and max_by_key keeps the last maximum,
        // so iterate in reverse to prefer the lowest id among equal tag counts.
        Ok(self
            .recordings
            .values()
            .rev()
            .filter(|r| r.name == name)
            .max_by_key(|r| r.tag_count)
            .cloned())
    }

    async fn tags_for_recording(
        &self,
        id: RecordingId,
        limit: usize,
    ) -> AppResult<Vec<TagWeight>> {
        let mut tags: Vec<TagWeight> = self
            .edges
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|(tag_id, weight)| {
                self.tag_name(*tag_id).map(|name| TagWeight {
                    tag: name.to_string(),
                    weight: *weight,
                })
            })
            .collect();
        tags.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.tag.cmp(&b.tag)));
        tags.truncate(limit);
        Ok(tags)
    }

    async fn resolve_ids_by_global_ids(&self, gids: &[String]) -> AppResult<Vec<RecordingId>> {
        let wanted: HashSet<&str> = gids.iter().map(String::as_str).collect();
        Ok(self
            .recordings
            .values()
            .filter(|r| wanted.contains(r.gid.as_str()))
            .map(|r| r.id)
            .collect())
    }

    async fn tag_set_for_recordings(&self, ids: &[RecordingId]) -> AppResult<Vec<TagId>> {
        let tag_ids: BTreeSet<TagId> = ids
            .iter()
            .filter_map(|id| self.edges.get(id))
            .flat_map(|tags| tags.keys().copied())
            .collect();
        Ok(tag_ids.into_iter().collect())
    }

    async fn candidates_by_tag_overlap(
        &self,
        tag_ids: &[TagId],
        exclude: &[RecordingId],
        limit: usize,
    ) -> AppResult<Vec<CandidateOverlap>> {
        let query: HashSet<TagId> = tag_ids.iter().copied().collect();
        let exclude: HashSet<RecordingId> = exclude.iter().copied().collect();

        let mut candidates: Vec<CandidateOverlap> = self
            .edges
            .iter()
            .filter(|(id, _)| !exclude.contains(*id))
            .map(|(id, tags)| CandidateOverlap {
                recording_id: *id,
                overlap: tags.keys().filter(|t| query.contains(*t)).count() as i64,
            })
            .filter(|c| c.overlap > 0)
            .collect();
        candidates.sort_by(|a, b| {
            b.overlap
                .cmp(&a.overlap)
                .then_with(|| a.recording_id.cmp(&b.recording_id))
        });
        candidates.truncate(limit);
        Ok(candidates)
    }

    async fn recordings_by_ids(&self, ids: &[RecordingId]) -> AppResult<Vec<Recording>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.recordings.get(id))
            .cloned()
            .collect())
    }

    async fn matched_tag_names(
        &self,
        id: RecordingId,
        tag_ids: &[TagId],
    ) -> AppResult<Vec<String>> {
        let query: HashSet<TagId> = tag_ids.iter().copied().collect();
        Ok(self
            .edges
            .get(&id)
            .into_iter()
            .flat_map(|tags| tags.keys())
            .filter(|t| query.contains(*t))
            .filter_map(|t| self.tag_name(*t).map(str::to_string))
            .collect())
    }
}
