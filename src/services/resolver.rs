use tracing::instrument;

use crate::{
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::ResolvedRecording,
    store::TagStore,
};

/// Maximum number of tags listed for a resolved recording
pub const RESOLVED_TAG_LIMIT: usize = 50;

pub const TITLE_REQUIRED: &str = "Title is required.";
pub const NO_RECORDING: &str = "No recording is found.";

fn validate_title(title: &str) -> AppResult<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput(TITLE_REQUIRED.to_string()));
    }
    Ok(title)
}

/// Resolves a title to the most heavily tagged recording with exactly that name
///
/// The title is trimmed first; a blank title fails before the store is touched.
#[instrument(skip(store, title))]
pub async fn resolve_title(store: &dyn TagStore, title: &str) -> AppResult<ResolvedRecording> {
    let title = validate_title(title)?;

    let recording = store
        .find_recording_by_exact_name(title)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_RECORDING.to_string()))?;

    let tags = store
        .tags_for_recording(recording.id, RESOLVED_TAG_LIMIT)
        .await?;

    tracing::debug!(
        recording_id = recording.id,
        tag_count = tags.len(),
        "Resolved title"
    );

    Ok(ResolvedRecording { recording, tags })
}

/// [`resolve_title`] behind an optional read-through cache
///
/// Only successful resolutions are cached.
pub async fn resolve_title_cached(
    store: &dyn TagStore,
    cache: Option<&Cache>,
    ttl: u64,
    title: &str,
) -> AppResult<ResolvedRecording> {
    let title = validate_title(title)?;

    match cache {
        Some(cache) => crate::cached!(
            cache,
            CacheKey::Resolve(title.to_string()),
            ttl,
            resolve_title(store, title)
        ),
        None => resolve_title(store, title).await,
    }
}
