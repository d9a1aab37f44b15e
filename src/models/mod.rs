// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Profile, MatchScore, Like, ScoringWeights};
pub use requests::{ScoreRequest, RankRequest, DiscoverRequest, UserQuery};
pub use responses::{RankResponse, HealthResponse, ErrorResponse, MatchesResponse, PendingLikesResponse};
