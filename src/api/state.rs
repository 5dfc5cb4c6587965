use std::sync::Arc;

use crate::{
    config::Config,
    services::{
        providers::{
            deepseek::DeepSeekProvider, youtube::YouTubeProvider, CompletionProvider,
            VideoProvider,
        },
        KeywordGenerator, TrackAggregator,
    },
};

/// Shared application state
///
/// Only immutable service handles live here; requests share no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<KeywordGenerator>,
    pub aggregator: Arc<TrackAggregator>,
}

impl AppState {
    /// Wires the pipeline on top of the given upstream providers
    pub fn new(completion: Arc<dyn CompletionProvider>, videos: Arc<dyn VideoProvider>) -> Self {
        Self::with_aggregator(completion, TrackAggregator::new(videos))
    }

    fn with_aggregator(completion: Arc<dyn CompletionProvider>, aggregator: TrackAggregator) -> Self {
        Self {
            generator: Arc::new(KeywordGenerator::new(completion)),
            aggregator: Arc::new(aggregator),
        }
    }

    /// Builds the production providers from configuration
    pub fn from_config(config: &Config) -> Self {
        let completion = Arc::new(DeepSeekProvider::new(
            config.llm_api_key.clone(),
            config.llm_api_url.clone(),
            config.llm_model.clone(),
        ));
        let videos = Arc::new(YouTubeProvider::new(
            config.youtube_api_key.clone(),
            config.youtube_api_url.clone(),
        ));

        let aggregator =
            TrackAggregator::new(videos).with_detail_enrichment(config.enrich_track_details);

        Self::with_aggregator(completion, aggregator)
    }
}
