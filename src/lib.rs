//! Echo Match - compatibility scoring and discovery ranking for the Echo dating app
//!
//! This library scores how well two profiles fit together based on shared
//! emotions and interests, age proximity, location and profile completeness,
//! and ranks discovery candidates by that score.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{calculate_compatibility, LikeGraph, Ranker, RankResult, DEFAULT_TOP_MATCHES};
pub use models::{Profile, MatchScore, Like, ScoringWeights};
