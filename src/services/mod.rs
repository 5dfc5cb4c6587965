pub mod keywords;
pub mod providers;
pub mod recommendations;
pub mod tracks;

pub use keywords::KeywordGenerator;
pub use tracks::TrackAggregator;
