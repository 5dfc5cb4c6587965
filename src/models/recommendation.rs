use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Track;

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_USER_ID: &str = "demo-user";

/// Input to the recommendation pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub prompt: String,
    pub user_id: String,
    pub limit: usize,
    pub include_genres: Option<Vec<String>>,
    pub exclude_genres: Option<Vec<String>>,
    pub mood: Option<String>,
}

impl RecommendationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            user_id: DEFAULT_USER_ID.to_string(),
            limit: DEFAULT_LIMIT,
            include_genres: None,
            exclude_genres: None,
            mood: None,
        }
    }
}

/// Coarse classification of what the user is looking for
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Artist,
    #[default]
    Song,
    Genre,
    Mood,
}

impl SearchType {
    /// Interprets the model's free-form classification, falling back to `Song`
    pub fn from_model(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "artist" => SearchType::Artist,
            "genre" => SearchType::Genre,
            "mood" => SearchType::Mood,
            _ => SearchType::Song,
        }
    }
}

/// Search plan produced by the language model
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeywordPlan {
    pub keywords: Vec<String>,
    pub reasoning: String,
    pub tags: Vec<String>,
    pub search_type: SearchType,
}

/// Output of the recommendation pipeline
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub tracks: Vec<Track>,
    pub reasoning: String,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
    pub search_type: SearchType,
    pub prompt: String,
    pub timestamp: DateTime<Utc>,
}
