use std::collections::{BTreeSet, HashMap};

use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{CandidateOverlap, Recommendation, RecordingId, TagId},
    services::scoring,
    store::TagStore,
};

/// Maximum number of candidates considered for scoring
pub const CANDIDATE_POOL_LIMIT: usize = 1000;

pub const MISSING_MBIDS: &str = "Missing mbids.";
pub const NO_CANDIDATES: &str = "No candidate recordings found.";
pub const NO_SCORED_CANDIDATES: &str = "No candidates after scoring";

/// Seed recordings of one request and the union of their tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryProfile {
    /// Resolved seed ids, ascending
    pub seed_ids: Vec<RecordingId>,
    /// Distinct tag ids across all seeds, ascending
    pub tag_ids: Vec<TagId>,
}

impl QueryProfile {
    /// Number of distinct query tags
    pub fn query_size(&self) -> usize {
        self.tag_ids.len()
    }

    fn is_seed(&self, id: RecordingId) -> bool {
        self.seed_ids.binary_search(&id).is_ok()
    }
}

/// Expands seed global ids into the combined query tag-set
///
/// Unknown ids are dropped. An all-unknown seed list yields an empty profile rather
/// than an error.
#[instrument(skip(store, gids), fields(gid_count = gids.len()))]
pub async fn aggregate_profile(store: &dyn TagStore, gids: &[String]) -> AppResult<QueryProfile> {
    if gids.is_empty() {
        return Err(AppError::InvalidInput(MISSING_MBIDS.to_string()));
    }

    let seed_ids: BTreeSet<RecordingId> = store
        .resolve_ids_by_global_ids(gids)
        .await?
        .into_iter()
        .collect();

    if seed_ids.is_empty() {
        tracing::debug!("No seed recordings resolved");
        return Ok(QueryProfile::default());
    }

    let seed_ids: Vec<RecordingId> = seed_ids.into_iter().collect();
    let tag_ids: BTreeSet<TagId> = store
        .tag_set_for_recordings(&seed_ids)
        .await?
        .into_iter()
        .collect();

    let profile = QueryProfile {
        seed_ids,
        tag_ids: tag_ids.into_iter().collect(),
    };

    tracing::debug!(
        seed_count = profile.seed_ids.len(),
        query_size = profile.query_size(),
        "Aggregated query profile"
    );

    Ok(profile)
}

/// Finds non-seed recordings sharing tags with the profile
///
/// The pool is ordered by overlap descending, then recording id ascending, and holds
/// at most [`CANDIDATE_POOL_LIMIT`] entries. The order is re-imposed here so that the
/// result does not depend on how the store sorts equal overlaps.
#[instrument(skip_all, fields(query_size = profile.query_size()))]
pub async fn generate_candidates(
    store: &dyn TagStore,
    profile: &QueryProfile,
) -> AppResult<Vec<CandidateOverlap>> {
    if profile.tag_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut pool = store
        .candidates_by_tag_overlap(&profile.tag_ids, &profile.seed_ids, CANDIDATE_POOL_LIMIT)
        .await?;

    pool.retain(|c| c.overlap > 0 && !profile.is_seed(c.recording_id));
    pool.sort_by(|a, b| {
        b.overlap
            .cmp(&a.overlap)
            .then_with(|| a.recording_id.cmp(&b.recording_id))
    });
    pool.truncate(CANDIDATE_POOL_LIMIT);

    tracing::debug!(pool_size = pool.len(), "Generated candidate pool");

    Ok(pool)
}

/// Names of the query tags the winning recording carries
pub async fn explain(
    store: &dyn TagStore,
    recording_id: RecordingId,
    profile: &QueryProfile,
) -> AppResult<Vec<String>> {
    store
        .matched_tag_names(recording_id, &profile.tag_ids)
        .await
}

/// Produces the single best recommendation for a seed set
#[instrument(skip(store, gids), fields(gid_count = gids.len()))]
pub async fn recommend(store: &dyn TagStore, gids: &[String]) -> AppResult<Recommendation> {
    let profile = aggregate_profile(store, gids).await?;

    let pool = generate_candidates(store, &profile).await?;
    if pool.is_empty() {
        return Err(AppError::NotFound(NO_CANDIDATES.to_string()));
    }

    let ids: Vec<RecordingId> = pool.iter().map(|c| c.recording_id).collect();
    let metadata: HashMap<_, _> = store
        .recordings_by_ids(&ids)
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();

    let candidate = scoring::score_candidates(&pool, &metadata, profile.query_size())
        .ok_or_else(|| AppError::NotFound(NO_SCORED_CANDIDATES.to_string()))?;

    let matched_tags = explain(store, candidate.id, &profile).await?;

    tracing::info!(
        recording_id = candidate.id,
        score = candidate.score,
        overlap = candidate.overlap,
        union_size = candidate.union_size,
        pool_size = pool.len(),
        "Selected recommendation"
    );

    Ok(Recommendation {
        candidate,
        matched_tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Recording;
    use crate::store::{InMemoryTagStore, MockTagStore};

    fn gids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn catalog() -> InMemoryTagStore {
        InMemoryTagStore::new()
            .with_recording(Recording::new(1, "A", "A", 3))
            .with_recording(Recording::new(2, "B", "B", 2))
            .with_recording(Recording::new(3, "C", "C", 2))
            .with_tag(1, "rock")
            .with_tag(2, "indie")
            .with_tag(3, "90s")
            .with_tag(4, "shoegaze")
            .with_edge(1, 1, 50)
            .with_edge(1, 2, 30)
            .with_edge(1, 3, 20)
            .with_edge(2, 1, 45)
            .with_edge(2, 4, 25)
            .with_edge(3, 2, 40)
            .with_edge(3, 4, 35)
    }

    #[tokio::test]
    async fn test_profile_is_union_of_seed_tags() {
        let profile = aggregate_profile(&catalog(), &gids(&["A", "B", "A", "nope"]))
            .await
            .unwrap();
        assert_eq!(profile.seed_ids, vec![1, 2]);
        assert_eq!(profile.tag_ids, vec![1, 2, 3, 4]);
        assert_eq!(profile.query_size(), 4);
    }

    #[tokio::test]
    async fn test_empty_seed_list_fails_before_storage() {
        let store = MockTagStore::new();
        let err = recommend(&store, &[]).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref msg) if msg == MISSING_MBIDS));
    }

    #[tokio::test]
    async fn test_unknown_seeds_yield_no_candidates() {
        let mut store = MockTagStore::new();
        store
            .expect_resolve_ids_by_global_ids()
            .times(1)
            .returning(|_| Ok(Vec::new()));
        store.expect_tag_set_for_recordings().never();
        store.expect_candidates_by_tag_overlap().never();

        let err = recommend(&store, &gids(&["UNKNOWN"])).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == NO_CANDIDATES));
    }

    #[tokio::test]
    async fn test_reference_recommendation() {
        let rec = recommend(&catalog(), &gids(&["A", "B"])).await.unwrap();
        assert_eq!(rec.candidate.name, "C");
        assert_eq!(rec.candidate.overlap, 2);
        assert_eq!(rec.candidate.union_size, 4);
        assert_eq!(rec.candidate.score, 0.5);

        let mut tags = rec.matched_tags;
        tags.sort();
        assert_eq!(tags, vec!["indie", "shoegaze"]);
    }

    #[tokio::test]
    async fn test_pool_order_is_reimposed() {
        let mut store = MockTagStore::new();
        store.expect_candidates_by_tag_overlap().returning(|_, _, _| {
            Ok(vec![
                CandidateOverlap { recording_id: 9, overlap: 1 },
                CandidateOverlap { recording_id: 5, overlap: 2 },
                CandidateOverlap { recording_id: 1, overlap: 2 },
                CandidateOverlap { recording_id: 3, overlap: 1 },
            ])
        });
        let profile = QueryProfile {
            seed_ids: vec![1],
            tag_ids: vec![10, 11],
        };

        let pool = generate_candidates(&store, &profile).await.unwrap();
        let ids: Vec<_> = pool.iter().map(|c| c.recording_id).collect();
        // Seed 1 dropped even though the store returned it.
        assert_eq!(ids, vec![5, 3, 9]);
    }

    #[tokio::test]
    async fn test_pool_truncated_by_overlap_then_lowest_id() {
        // Seed 1 carries tags 1 and 2. Recordings 2..=1201 share tag 1; the
        // even-numbered ones above 1100 also share tag 2.
        let mut store = InMemoryTagStore::new()
            .with_recording(Recording::new(1, "seed", "seed", 2))
            .with_edge(1, 1, 10)
            .with_edge(1, 2, 10);
        for id in 2..=1201 {
            store = store
                .with_recording(Recording::new(id, format!("g{id}"), format!("r{id}"), 40))
                .with_edge(id, 1, 1);
            if id > 1100 && id % 2 == 0 {
                store = store.with_edge(id, 2, 1);
            }
        }
        let profile = aggregate_profile(&store, &gids(&["seed"])).await.unwrap();

        let pool = generate_candidates(&store, &profile).await.unwrap();
        assert_eq!(pool.len(), CANDIDATE_POOL_LIMIT);
        // 50 double-overlap recordings lead, then the lowest ids with overlap 1.
        assert!(pool[..50].iter().all(|c| c.overlap == 2));
        assert_eq!(pool[0].recording_id, 1102);
        assert_eq!(pool[50].recording_id, 2);
        assert_eq!(pool[CANDIDATE_POOL_LIMIT - 1].recording_id, 951);
    }

    #[tokio::test]
    async fn test_truncated_candidates_are_never_scored() {
        // Recording 2000 would score 1/(1+1-1) = 1.0 but sits past the pool limit.
        let mut store = InMemoryTagStore::new()
            .with_recording(Recording::new(1, "seed", "seed", 1))
            .with_edge(1, 1, 10)
            .with_tag(1, "rock")
            .with_recording(Recording::new(2000, "hidden", "hidden", 1))
            .with_edge(2000, 1, 1);
        for id in 2..=1001 {
            store = store
                .with_recording(Recording::new(id, format!("g{id}"), format!("r{id}"), 4))
                .with_edge(id, 1, 1);
        }

        let rec = recommend(&store, &gids(&["seed"])).await.unwrap();
        assert_ne!(rec.candidate.id, 2000);
        assert_eq!(rec.candidate.id, 2);
        assert_eq!(rec.candidate.score, 0.25);
    }

    #[tokio::test]
    async fn test_missing_metadata_yields_scoring_not_found() {
        let mut store = MockTagStore::new();
        store
            .expect_resolve_ids_by_global_ids()
            .returning(|_| Ok(vec![1]));
        store
            .expect_tag_set_for_recordings()
            .returning(|_| Ok(vec![7]));
        store
            .expect_candidates_by_tag_overlap()
            .returning(|_, _, _| Ok(vec![CandidateOverlap { recording_id: 2, overlap: 1 }]));
        store
            .expect_recordings_by_ids()
            .returning(|_| Ok(Vec::new()));
        store.expect_matched_tag_names().never();

        let err = recommend(&store, &gids(&["A"])).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == NO_SCORED_CANDIDATES));
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let mut store = MockTagStore::new();
        store
            .expect_resolve_ids_by_global_ids()
            .returning(|_| Ok(vec![1]));
        store
            .expect_tag_set_for_recordings()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let err = recommend(&store, &gids(&["A"])).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_repeated_requests_are_identical() {
        let store = catalog();
        let first = recommend(&store, &gids(&["A", "B"])).await.unwrap();
        let second = recommend(&store, &gids(&["B", "A"])).await.unwrap();
        assert_eq!(first, second);
    }
}
