// Core algorithm exports
pub mod likes;
pub mod ranker;
pub mod scoring;

pub use likes::LikeGraph;
pub use ranker::{Ranker, RankResult, DEFAULT_TOP_MATCHES};
pub use scoring::{calculate_compatibility, shared_labels};
