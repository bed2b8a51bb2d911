//! Tag-overlap similarity between a query tag-set and candidate recordings.

use std::collections::HashMap;

use crate::models::{CandidateOverlap, Recording, RecordingId, ScoredCandidate};

/// Size of the combined tag vocabulary of query and candidate
pub fn union_size(tag_count: i64, query_size: i64, overlap: i64) -> i64 {
    tag_count + query_size - overlap
}

/// `overlap / union`, or 0 when the union is empty
///
/// Kept within `[0, 1]` even when a recording's `tag_count` understates its edges.
pub fn similarity(overlap: i64, union: i64) -> f64 {
    if union > 0 {
        (overlap as f64 / union as f64).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Rounds a score to 3 decimal places for presentation
pub fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

/// Scores every pooled candidate and returns the best one
///
/// Candidates are visited in pool order and only a strictly greater score replaces
/// the current best, so the first candidate wins ties. Candidates without metadata
/// are skipped. Returns `None` when nothing could be scored.
pub fn score_candidates(
    pool: &[CandidateOverlap],
    metadata: &HashMap<RecordingId, Recording>,
    query_size: usize,
) -> Option<ScoredCandidate> {
    let query_size = i64::try_from(query_size).unwrap_or(i64::MAX);
    let mut best: Option<ScoredCandidate> = None;

    for candidate in pool {
        let Some(recording) = metadata.get(&candidate.recording_id) else {
            tracing::debug!(
                recording_id = candidate.recording_id,
                "No metadata for pooled candidate, skipping"
            );
            continue;
        };

        let union = union_size(recording.tag_count, query_size, candidate.overlap);
        let score = similarity(candidate.overlap, union);

        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(ScoredCandidate {
                id: recording.id,
                gid: recording.gid.clone(),
                name: recording.name.clone(),
                overlap: candidate.overlap,
                union_size: union,
                score,
            });
        }
    }

    best
}
