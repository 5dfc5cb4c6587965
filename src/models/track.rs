use serde::{Deserialize, Serialize};

/// A playable search result
///
/// Two tracks with the same `id` are the same track, whatever their other
/// fields say.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Platform-native video id
    pub id: String,
    pub title: String,
    /// Best-effort artist name derived from the title
    pub artist: String,
    /// Length in seconds, 0 when unknown
    pub duration: u64,
    /// Same value as `id`, consumed by the embedded player
    pub youtube_id: String,
    pub thumbnail: String,
    pub genre: Vec<String>,
    pub mood: Vec<String>,
    /// View count, or a placeholder when details were not looked up
    pub popularity: u64,
}

impl Track {
    /// Returns a copy of this track carrying the looked-up details
    pub fn with_details(self, details: TrackDetails) -> Self {
        Self {
            duration: details.duration,
            popularity: details.popularity,
            ..self
        }
    }
}

/// Per-video metadata that the search endpoint does not return
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackDetails {
    /// Length in seconds
    pub duration: u64,
    /// View count
    pub popularity: u64,
}
