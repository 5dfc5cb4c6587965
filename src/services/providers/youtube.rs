/// YouTube Data API v3 provider
///
/// API Flow:
/// 1. Search: /search?type=video&videoCategoryId=10 → video ids + snippets
/// 2. Details: /videos?part=contentDetails,statistics → duration + view count
///
/// Search results carry no duration or view count. Tracks built from them get
/// a zero duration and a placeholder popularity until details are fetched.
use crate::{
    error::{AppError, AppResult},
    models::{Track, TrackDetails},
    services::providers::VideoProvider,
};
use rand::Rng;
use regex::Regex;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::sync::LazyLock;

/// YouTube's "Music" video category
const MUSIC_CATEGORY_ID: &str = "10";
/// The search endpoint rejects larger pages
pub const MAX_RESULTS_PER_QUERY: u32 = 50;

static ARTIST_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // "Artist - Song" / "Artist – Song"
        Regex::new(r"^(.+?)\s*[-–]\s*(.+)$").expect("valid regex"),
        // "Artist: Song"
        Regex::new(r"^(.+?)\s*:\s*(.+)$").expect("valid regex"),
        Regex::new(r"^(.+?)\s*–\s*(.+)$").expect("valid regex"),
    ]
});

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("valid regex")
});

/// Guesses the artist from a video title
///
/// Titles usually look like "Artist - Song" or "Song - Artist"; the shorter
/// side is taken to be the artist. Without a separator, the first three words
/// stand in for it.
pub fn extract_artist_from_title(title: &str) -> String {
    for pattern in ARTIST_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(title) {
            let first = &caps[1];
            let second = &caps[2];
            return if first.chars().count() <= second.chars().count() {
                first.trim().to_string()
            } else {
                second.trim().to_string()
            };
        }
    }

    title.split_whitespace().take(3).collect::<Vec<_>>().join(" ")
}

/// Converts an ISO 8601 duration such as `PT4M13S` into seconds
///
/// Missing components count as zero; an unrecognized token is 0.
pub fn parse_duration(duration: &str) -> u64 {
    let Some(caps) = DURATION_PATTERN.captures(duration) else {
        return 0;
    };

    let component = |index: usize| {
        caps.get(index)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    component(1) * 3600 + component(2) * 60 + component(3)
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: Option<SearchItemId>,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default)]
    content_details: Option<ContentDetails>,
    #[serde(default)]
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    #[serde(default)]
    view_count: Option<String>,
}

impl SearchItem {
    /// Builds a track, or `None` when the item has no video id or snippet
    fn into_track(self) -> Option<Track> {
        let video_id = self.id?.video_id.filter(|id| !id.is_empty())?;
        let snippet = self.snippet?;

        let title = snippet.title.unwrap_or_default();
        let thumbnail = snippet
            .thumbnails
            .and_then(|t| t.high)
            .map(|t| t.url)
            .unwrap_or_default();

        Some(Track {
            id: video_id.clone(),
            artist: extract_artist_from_title(&title),
            title,
            duration: 0,
            youtube_id: video_id,
            thumbnail,
            genre: Vec::new(),
            mood: Vec::new(),
            popularity: placeholder_popularity(),
        })
    }
}

impl VideoItem {
    fn into_details(self) -> TrackDetails {
        let duration = self
            .content_details
            .and_then(|c| c.duration)
            .map(|d| parse_duration(&d))
            .unwrap_or(0);
        let popularity = self
            .statistics
            .and_then(|s| s.view_count)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        TrackDetails {
            duration,
            popularity,
        }
    }
}

// Search results carry no view count
fn placeholder_popularity() -> u64 {
    rand::rng().random_range(0..100)
}

#[derive(Clone)]
pub struct YouTubeProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl YouTubeProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }

    /// Runs a /search call and converts the usable items into tracks
    async fn search(&self, params: &[(&str, &str)]) -> AppResult<Vec<Track>> {
        let response = self
            .http_client
            .get(self.endpoint("search"))
            .query(&[
                ("key", self.api_key.as_str()),
                ("part", "snippet"),
                ("type", "video"),
                ("videoCategoryId", MUSIC_CATEGORY_ID),
            ])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "YouTube API returned status {}: {}",
                status, body
            )));
        }

        let results: SearchListResponse = response.json().await?;
        Ok(results
            .items
            .into_iter()
            .filter_map(SearchItem::into_track)
            .collect())
    }
}

#[async_trait::async_trait]
impl VideoProvider for YouTubeProvider {
    async fn search_videos(&self, query: &str, max_results: u32) -> AppResult<Vec<Track>> {
        let max_results = max_results.min(MAX_RESULTS_PER_QUERY).to_string();
        let tracks = self
            .search(&[
                ("q", query),
                ("order", "relevance"),
                ("maxResults", max_results.as_str()),
            ])
            .await?;

        tracing::info!(
            query = %query,
            results = tracks.len(),
            provider = "youtube",
            "Video search completed"
        );

        Ok(tracks)
    }

    async fn related_videos(&self, video_id: &str, max_results: u32) -> AppResult<Vec<Track>> {
        let max_results = max_results.min(MAX_RESULTS_PER_QUERY).to_string();
        let tracks = self
            .search(&[
                ("relatedToVideoId", video_id),
                ("maxResults", max_results.as_str()),
            ])
            .await?;

        tracing::info!(
            video_id = %video_id,
            results = tracks.len(),
            provider = "youtube",
            "Related video search completed"
        );

        Ok(tracks)
    }

    async fn video_details(&self, video_id: &str) -> AppResult<TrackDetails> {
        let response = self
            .http_client
            .get(self.endpoint("videos"))
            .query(&[
                ("key", self.api_key.as_str()),
                ("part", "contentDetails,statistics"),
                ("id", video_id),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "YouTube API returned status {}: {}",
                status, body
            )));
        }

        let videos: VideoListResponse = response.json().await?;
        let details = videos
            .items
            .into_iter()
            .next()
            .map(VideoItem::into_details)
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        tracing::debug!(
            video_id = %video_id,
            duration = details.duration,
            views = details.popularity,
            provider = "youtube",
            "Video details fetched"
        );

        Ok(details)
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}
