use serde::{Deserialize, Serialize};
use crate::models::domain::MatchScore;
use crate::services::CacheStats;

/// Ranked candidates for a viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankResponse {
    pub matches: Vec<MatchScore>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub cache: CacheStats,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

/// Mutual matches of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub matches: Vec<String>,
    pub count: usize,
}

/// Users who liked a user without being liked back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingLikesResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub pending: Vec<String>,
    pub count: usize,
}
