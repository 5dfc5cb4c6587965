/// Upstream service abstractions
///
/// The recommendation pipeline talks to two remote services: a chat
/// completion model that turns prompts into search keywords, and a video
/// platform that turns keywords into tracks. Each sits behind a trait so the
/// pipeline can be exercised without network access.
use crate::{
    error::AppResult,
    models::{Track, TrackDetails},
};

pub mod deepseek;
pub mod youtube;

/// A system/user message pair plus sampling settings
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Trait for chat completion backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Runs one completion and returns the first choice's text
    ///
    /// A response without content yields an empty string, not an error.
    /// Billing rejections must map to `AppError::QuotaExceeded`.
    async fn complete(&self, request: &CompletionRequest) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for video platforms that can be searched for music
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait VideoProvider: Send + Sync {
    /// Search music videos by free text, most relevant first
    ///
    /// Items without a video id or snippet are skipped.
    async fn search_videos(&self, query: &str, max_results: u32) -> AppResult<Vec<Track>>;

    /// Music videos related to the given one
    async fn related_videos(&self, video_id: &str, max_results: u32) -> AppResult<Vec<Track>>;

    /// Duration and view count for one video
    ///
    /// Returns `AppError::NotFound` when the platform has no such video.
    async fn video_details(&self, video_id: &str) -> AppResult<TrackDetails>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
