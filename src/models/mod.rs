pub mod recommendation;
pub mod recording;

pub use recommendation::{CandidateOverlap, Recommendation, ScoredCandidate};
pub use recording::{Recording, RecordingId, ResolvedRecording, TagId, TagWeight};
