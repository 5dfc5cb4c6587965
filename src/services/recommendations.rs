use chrono::Utc;

use crate::{
    error::AppResult,
    models::{RecommendationRequest, RecommendationResult},
    services::{keywords::KeywordGenerator, tracks::TrackAggregator},
};

/// Generates music recommendations for a free-text prompt
///
/// The language model turns the prompt into search keywords, then every
/// keyword is searched on the video platform and the results are merged,
/// deduplicated and cut to `request.limit`. A generation failure fails the
/// whole request; individual keyword searches may fail without doing so.
pub async fn get_recommendations(
    generator: &KeywordGenerator,
    aggregator: &TrackAggregator,
    request: RecommendationRequest,
) -> AppResult<RecommendationResult> {
    let plan = generator.generate(&request).await?;

    let tracks = aggregator
        .search_and_merge(&plan.keywords, request.limit)
        .await;

    Ok(RecommendationResult {
        tracks,
        reasoning: plan.reasoning,
        keywords: plan.keywords,
        tags: plan.tags,
        search_type: plan.search_type,
        prompt: request.prompt,
        timestamp: Utc::now(),
    })
}
