use serde::{Deserialize, Serialize};

use super::RecordingId;

/// A candidate recording and how many query tags it shares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CandidateOverlap {
    pub recording_id: RecordingId,
    pub overlap: i64,
}

/// A candidate with its similarity score against the query tag-set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub id: RecordingId,
    pub gid: String,
    pub name: String,
    pub overlap: i64,
    /// `tag_count + Psize - overlap`
    pub union_size: i64,
    /// `overlap / union_size`, in `[0, 1]`
    pub score: f64,
}

/// The single best candidate for a seed set, with the tags that matched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub candidate: ScoredCandidate,
    pub matched_tags: Vec<String>,
}
