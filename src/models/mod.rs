pub mod playback;
pub mod recommendation;
pub mod track;

pub use playback::PlaybackSession;
pub use recommendation::{
    KeywordPlan, RecommendationRequest, RecommendationResult, SearchType, DEFAULT_LIMIT,
    DEFAULT_USER_ID,
};
pub use track::{Track, TrackDetails};
