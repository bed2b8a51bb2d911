use serde::{Deserialize, Serialize};

/// Internal recording identifier
pub type RecordingId = i64;

/// Internal tag identifier
pub type TagId = i64;

/// A recording row as exposed by the tag store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recording {
    pub id: RecordingId,
    /// Stable external identifier (MusicBrainz ID)
    pub gid: String,
    pub name: String,
    /// Number of tags attached to the recording
    pub tag_count: i64,
}

impl Recording {
    pub fn new(
        id: RecordingId,
        gid: impl Into<String>,
        name: impl Into<String>,
        tag_count: i64,
    ) -> Self {
        Self {
            id,
            gid: gid.into(),
            name: name.into(),
            tag_count,
        }
    }
}

/// A tag name with its usage count on one recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TagWeight {
    pub tag: String,
    pub weight: i64,
}

/// Result of resolving a title: the best matching recording and its top tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecording {
    pub recording: Recording,
    pub tags: Vec<TagWeight>,
}
