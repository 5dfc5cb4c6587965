use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        RecommendationRequest, RecommendationResult, Track, TrackDetails, DEFAULT_LIMIT,
        DEFAULT_USER_ID,
    },
    services::recommendations,
};

use super::AppState;

const INVALID_PROMPT: &str = "Invalid recommendation prompt";
const INVALID_OPTIONS: &str = "Invalid recommendation options";
const RECOMMENDATION_FAILED: &str = "Recommendation failed";
const INVALID_QUERY: &str = "Invalid search query";
const SEARCH_FAILED: &str = "Search failed";
const DETAILS_FAILED: &str = "Failed to get track details";
const RELATED_FAILED: &str = "Failed to get related tracks";
const DEFAULT_SEARCH_RESULTS: u32 = 10;
const DEFAULT_RELATED_RESULTS: u32 = 5;

// Request/Response types

/// Body of `POST /api/recommend`
///
/// `prompt` stays untyped so a missing or non-string prompt can be answered
/// with our own 400 instead of an extractor rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendBody {
    #[serde(default)]
    pub prompt: Value,
    pub user_id: Option<String>,
    pub limit: Option<usize>,
    pub include_genres: Option<Vec<String>>,
    pub exclude_genres: Option<Vec<String>>,
    pub mood: Option<String>,
}

impl RecommendBody {
    fn into_request(self) -> AppResult<RecommendationRequest> {
        let prompt = match self.prompt {
            Value::String(prompt) if !prompt.trim().is_empty() => prompt,
            _ => return Err(AppError::InvalidInput(INVALID_PROMPT.to_string())),
        };

        Ok(RecommendationRequest {
            prompt,
            user_id: self
                .user_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            limit: self.limit.unwrap_or(DEFAULT_LIMIT),
            include_genres: self.include_genres,
            exclude_genres: self.exclude_genres,
            mood: self.mood,
        })
    }
}

/// Body of `POST /api/search`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    #[serde(default)]
    pub query: Value,
    pub max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedQuery {
    pub max_results: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TracksResponse {
    pub tracks: Vec<Track>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Turns a free-text prompt into a list of tracks
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendBody>, JsonRejection>,
) -> AppResult<Json<RecommendationResult>> {
    let request = payload
        .map_err(|rejection| {
            tracing::warn!(
                request_id = %request_id,
                error = %rejection,
                "Rejected recommendation body"
            );
            // Well-formed JSON with a mistyped option; the prompt itself is untyped
            let message = match rejection {
                JsonRejection::JsonDataError(_) => INVALID_OPTIONS,
                _ => INVALID_PROMPT,
            };
            AppError::InvalidInput(message.to_string())
        })
        .and_then(|Json(body)| body.into_request())?;

    tracing::info!(
        request_id = %request_id,
        user_id = %request.user_id,
        limit = request.limit,
        "Processing recommendation request"
    );

    let result =
        recommendations::get_recommendations(&state.generator, &state.aggregator, request)
            .await
            .map_err(|e| {
                tracing::error!(request_id = %request_id, error = %e, "Recommendation failed");
                e.into_public(RECOMMENDATION_FAILED)
            })?;

    tracing::info!(
        request_id = %request_id,
        tracks = result.tracks.len(),
        keywords = result.keywords.len(),
        "Recommendation completed"
    );

    Ok(Json(result))
}

/// Plain keyword search without the language model
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<SearchBody>, JsonRejection>,
) -> AppResult<Json<TracksResponse>> {
    let body = payload
        .map(|Json(body)| body)
        .map_err(|_| AppError::InvalidInput(INVALID_QUERY.to_string()))?;

    let query = match body.query {
        Value::String(query) if !query.trim().is_empty() => query,
        _ => return Err(AppError::InvalidInput(INVALID_QUERY.to_string())),
    };

    let tracks = state
        .aggregator
        .search(&query, body.max_results.unwrap_or(DEFAULT_SEARCH_RESULTS))
        .await
        .map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Search failed");
            e.into_public(SEARCH_FAILED)
        })?;

    Ok(Json(TracksResponse { tracks }))
}

/// Duration and view count for one video
pub async fn track_details(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> AppResult<Json<TrackDetails>> {
    let details = state
        .aggregator
        .track_details(&video_id)
        .await
        .map_err(|e| match e {
            AppError::NotFound(msg) => AppError::NotFound(msg),
            other => other.into_public(DETAILS_FAILED),
        })?;

    Ok(Json(details))
}

/// Music videos related to the given one
pub async fn related_tracks(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(params): Query<RelatedQuery>,
) -> AppResult<Json<TracksResponse>> {
    let tracks = state
        .aggregator
        .related_tracks(
            &video_id,
            params.max_results.unwrap_or(DEFAULT_RELATED_RESULTS),
        )
        .await
        .map_err(|e| e.into_public(RELATED_FAILED))?;

    Ok(Json(TracksResponse { tracks }))
}
