use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Track, TrackDetails},
    services::providers::{youtube::MAX_RESULTS_PER_QUERY, VideoProvider},
};

/// Searches the video platform and merges per-keyword results
#[derive(Clone)]
pub struct TrackAggregator {
    provider: Arc<dyn VideoProvider>,
    enrich_details: bool,
}

impl TrackAggregator {
    pub fn new(provider: Arc<dyn VideoProvider>) -> Self {
        Self {
            provider,
            enrich_details: false,
        }
    }

    /// Look up duration and view count for every merged track
    pub fn with_detail_enrichment(mut self, enabled: bool) -> Self {
        self.enrich_details = enabled;
        self
    }

    /// Searches music videos for a single query
    pub async fn search(&self, query: &str, max_results: u32) -> AppResult<Vec<Track>> {
        search_tracks(self.provider.as_ref(), query, max_results).await
    }

    /// Runs one search per keyword and merges the results
    ///
    /// Keywords are searched concurrently but merged in keyword order. A
    /// failing keyword is logged and skipped. The result holds at most
    /// `limit` tracks with unique ids, first occurrence wins.
    pub async fn search_and_merge(&self, keywords: &[String], limit: usize) -> Vec<Track> {
        if keywords.is_empty() || limit == 0 {
            return Vec::new();
        }

        let per_keyword = limit
            .div_ceil(keywords.len())
            .min(MAX_RESULTS_PER_QUERY as usize) as u32;

        let tasks: Vec<_> = keywords
            .iter()
            .map(|keyword| {
                let provider = Arc::clone(&self.provider);
                let keyword = keyword.clone();
                tokio::spawn(async move {
                    search_tracks(provider.as_ref(), &keyword, per_keyword).await
                })
            })
            .collect();

        // Awaiting in spawn order keeps keyword order regardless of which
        // search finishes first
        let mut batches = Vec::with_capacity(keywords.len());
        let mut failed = 0usize;

        for (keyword, task) in keywords.iter().zip(tasks) {
            match task.await {
                Ok(Ok(tracks)) => batches.push(tracks),
                Ok(Err(e)) => {
                    tracing::warn!(keyword = %keyword, error = %e, "Keyword search failed, skipping");
                    failed += 1;
                }
                Err(e) => {
                    tracing::error!(keyword = %keyword, error = %e, "Task join error");
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            tracing::warn!(
                success_count = batches.len(),
                error_count = failed,
                "Partial keyword search failure"
            );
        }

        let merged = merge_tracks(batches, limit);

        tracing::info!(
            keywords = keywords.len(),
            per_keyword = per_keyword,
            merged = merged.len(),
            "Keyword searches merged"
        );

        if self.enrich_details {
            self.enrich(merged).await
        } else {
            merged
        }
    }

    /// Duration and view count for a single video
    pub async fn track_details(&self, video_id: &str) -> AppResult<TrackDetails> {
        self.provider.video_details(video_id).await.map_err(|e| {
            tracing::error!(video_id = %video_id, error = %e, "Track details lookup failed");
            match e {
                AppError::NotFound(msg) => AppError::NotFound(msg),
                _ => AppError::DetailsFailed,
            }
        })
    }

    /// Music videos related to the given one
    pub async fn related_tracks(&self, video_id: &str, max_results: u32) -> AppResult<Vec<Track>> {
        self.provider
            .related_videos(video_id, max_results)
            .await
            .map_err(|e| {
                tracing::error!(video_id = %video_id, error = %e, "Related track search failed");
                AppError::RelatedFailed
            })
    }

    /// Replaces placeholder duration and popularity with looked-up values
    ///
    /// A failed lookup keeps the track as it was.
    async fn enrich(&self, tracks: Vec<Track>) -> Vec<Track> {
        let tasks: Vec<_> = tracks
            .iter()
            .map(|track| {
                let provider = Arc::clone(&self.provider);
                let video_id = track.id.clone();
                tokio::spawn(async move { provider.video_details(&video_id).await })
            })
            .collect();

        let mut enriched = Vec::with_capacity(tracks.len());
        for (track, task) in tracks.into_iter().zip(tasks) {
            match task.await {
                Ok(Ok(details)) => enriched.push(track.with_details(details)),
                Ok(Err(e)) => {
                    tracing::warn!(video_id = %track.id, error = %e, "Keeping placeholder details");
                    enriched.push(track);
                }
                Err(e) => {
                    tracing::error!(video_id = %track.id, error = %e, "Task join error");
                    enriched.push(track);
                }
            }
        }

        enriched
    }
}

async fn search_tracks(
    provider: &dyn VideoProvider,
    query: &str,
    max_results: u32,
) -> AppResult<Vec<Track>> {
    provider
        .search_videos(query, max_results)
        .await
        .map_err(|e| {
            tracing::error!(
                query = %query,
                provider = provider.name(),
                error = %e,
                "Track search failed"
            );
            AppError::SearchFailed
        })
}

/// Concatenates batches in order, drops repeated ids and keeps the first `limit`
pub fn merge_tracks(batches: Vec<Vec<Track>>, limit: usize) -> Vec<Track> {
    let mut seen = HashSet::new();

    batches
        .into_iter()
        .flatten()
        .filter(|track| seen.insert(track.id.clone()))
        .take(limit)
        .collect()
}
