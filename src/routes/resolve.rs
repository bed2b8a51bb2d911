use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{ResolvedRecording, TagWeight},
    routes::AppState,
    services::resolver,
};

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub status: &'static str,
    pub mbid: String,
    pub title: String,
    pub tags: Vec<TagWeight>,
}

impl From<ResolvedRecording> for ResolveResponse {
    fn from(resolved: ResolvedRecording) -> Self {
        Self {
            status: "OK",
            mbid: resolved.recording.gid,
            title: resolved.recording.name,
            tags: resolved.tags,
        }
    }
}

/// Handler for title resolution endpoint
///
/// A query string that does not decode to a single `title` is treated like a
/// missing title.
pub async fn resolve(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    params: Result<Query<ResolveQuery>, QueryRejection>,
) -> AppResult<Json<ResolveResponse>> {
    let Query(params) = params.map_err(|e| {
        tracing::debug!(request_id = %request_id, error = %e, "Rejected resolve query");
        AppError::InvalidInput(resolver::TITLE_REQUIRED.to_string())
    })?;
    let title = params.title.unwrap_or_default();
    tracing::debug!(request_id = %request_id, title = %title, "Resolving title");

    let resolved = resolver::resolve_title_cached(
        state.store.as_ref(),
        state.cache.as_ref(),
        state.resolve_cache_ttl_secs,
        &title,
    )
    .await?;

    Ok(Json(ResolveResponse::from(resolved)))
}
