use axum::{body::Bytes, extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{Recommendation, RecordingId},
    routes::AppState,
    services::{
        recommendations::{self, MISSING_MBIDS},
        scoring,
    },
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub mbids: Vec<String>,
}

impl RecommendationRequest {
    /// Decodes the raw body; anything other than a list of strings under `mbids`
    /// is reported as missing seeds.
    pub fn parse(body: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(body).map_err(|e| {
            tracing::debug!(error = %e, "Rejected recommendation body");
            AppError::InvalidInput(MISSING_MBIDS.to_string())
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub id: RecordingId,
    pub mbid: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub track: TrackResponse,
    /// Rounded to 3 decimal places
    pub score: f64,
    pub matched_tags: Vec<String>,
    pub union: i64,
}

impl From<Recommendation> for RecommendationResponse {
    fn from(rec: Recommendation) -> Self {
        let candidate = rec.candidate;
        Self {
            score: scoring::round_score(candidate.score),
            union: candidate.union_size,
            track: TrackResponse {
                id: candidate.id,
                mbid: candidate.gid,
                title: candidate.name,
            },
            matched_tags: rec.matched_tags,
        }
    }
}

/// Handler for recommendations endpoint
///
/// Takes the raw body so that a missing or malformed payload gets the same 400 as
/// an empty seed list.
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Bytes,
) -> AppResult<Json<RecommendationResponse>> {
    let request = RecommendationRequest::parse(&body)?;

    tracing::info!(
        request_id = %request_id,
        seed_count = request.mbids.len(),
        "Processing recommendation request"
    );

    let recommendation = recommendations::recommend(state.store.as_ref(), &request.mbids).await?;

    Ok(Json(RecommendationResponse::from(recommendation)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_string_list() {
        let request = RecommendationRequest::parse(br#"{"mbids":["a","b"]}"#).unwrap();
        assert_eq!(request.mbids, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_rejects_malformed_bodies() {
        let bodies: [&[u8]; 6] = [
            b"",
            b"{}",
            br#"{"mbids":"a"}"#,
            br#"{"mbids":[1,2]}"#,
            br#"{"mbids":null}"#,
            b"not json",
        ];
        for body in bodies {
            let err = RecommendationRequest::parse(body).unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(ref msg) if msg == MISSING_MBIDS));
        }
    }
}
