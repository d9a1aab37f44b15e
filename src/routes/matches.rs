use actix_web::{web, HttpResponse, Responder};
use actix_web::http::StatusCode;
use validator::Validate;
use crate::config::RankingSettings;
use crate::core::{LikeGraph, Ranker};
use crate::models::{
    DiscoverRequest, ErrorResponse, HealthResponse, MatchesResponse, PendingLikesResponse,
    Profile, RankRequest, RankResponse, ScoreRequest, UserQuery,
};
use crate::services::{CacheManager, FirestoreClient, FirestoreError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub firestore: Arc<FirestoreClient>,
    pub cache: CacheManager,
    pub ranker: Ranker,
    pub ranking: RankingSettings,
}

/// Configure all compatibility and discovery routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/compatibility/score", web::post().to(score_pair))
        .route("/compatibility/rank", web::post().to(rank_candidates))
        .route("/discover", web::post().to(discover))
        .route("/matches", web::get().to(get_matches))
        .route("/likes/pending", web::get().to(get_pending_likes))
        .route("/cache/{user_id}", web::delete().to(invalidate_cache));
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string())
}

fn store_error(context: &str, err: FirestoreError) -> HttpResponse {
    match err {
        FirestoreError::NotFound(message) => {
            error_response(StatusCode::NOT_FOUND, "Not found", message)
        }
        other => {
            tracing::error!("{}: {}", context, other);
            error_response(StatusCode::BAD_GATEWAY, context, other.to_string())
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        cache: state.cache.stats(),
    })
}

/// Score one candidate
///
/// POST /api/v1/compatibility/score
///
/// Request body:
/// ```json
/// { "viewer": { "uid": "a", ... }, "candidate": { "uid": "b", ... } }
/// ```
async fn score_pair(
    state: web::Data<AppState>,
    req: web::Json<ScoreRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    HttpResponse::Ok().json(state.ranker.score(&req.viewer, &req.candidate))
}

/// Rank a caller-supplied candidate list
///
/// POST /api/v1/compatibility/rank
///
/// Request body:
/// ```json
/// { "viewer": { "uid": "a" }, "candidates": [{ "uid": "b" }], "limit": 10 }
/// ```
///
/// Without `limit` the whole ranking is returned.
async fn rank_candidates(
    state: web::Data<AppState>,
    req: web::Json<RankRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let matches = match req.limit {
        Some(limit) => state.ranker.top_matches(&req.viewer, &req.candidates, limit as usize),
        None => state.ranker.rank(&req.viewer, &req.candidates),
    };

    HttpResponse::Ok().json(RankResponse {
        matches,
        total_candidates: req.candidates.len(),
    })
}

/// Rank the stored user base for a viewer
///
/// POST /api/v1/discover
///
/// Request body:
/// ```json
/// { "userId": "string", "limit": 10 }
/// ```
async fn discover(
    state: web::Data<AppState>,
    req: web::Json<DiscoverRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let user_id = &req.user_id;
    let limit = req
        .limit
        .map(usize::from)
        .unwrap_or(state.ranking.default_limit)
        .min(state.ranking.max_limit);

    tracing::info!("Discovering matches for user: {}, limit: {}", user_id, limit);

    let viewer = match load_profile(&state, user_id).await {
        Ok(profile) => profile,
        Err(e) => return store_error("Failed to fetch user profile", e),
    };

    let candidates = match state.firestore.list_profiles().await {
        Ok(profiles) => profiles,
        Err(e) => return store_error("Failed to list profiles", e),
    };

    // Likes are best-effort, an unfiltered feed is still served
    let likes = match state.firestore.likes_for(user_id).await {
        Ok(likes) => LikeGraph::from_likes(user_id, &likes),
        Err(e) => {
            tracing::warn!("Failed to fetch likes for {}, not filtering matches: {}", user_id, e);
            LikeGraph::empty(user_id.as_str())
        }
    };

    let result = state.ranker.discover(&viewer, &candidates, &likes, limit);

    tracing::info!(
        "Returning {} matches for user {} (from {} candidates)",
        result.matches.len(),
        user_id,
        result.total_candidates
    );

    HttpResponse::Ok().json(RankResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
    })
}

/// Mutual matches of a user
///
/// GET /api/v1/matches?userId={userId}
async fn get_matches(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let user_id = &query.user_id;

    let matches = match state.cache.get_matches(user_id).await {
        Some(matches) => matches,
        None => match state.firestore.likes_for(user_id).await {
            Ok(likes) => {
                let matches = LikeGraph::from_likes(user_id, &likes).mutual_matches();
                state.cache.insert_matches(user_id, matches.clone()).await;
                matches
            }
            Err(e) => return store_error("Failed to fetch likes", e),
        },
    };

    HttpResponse::Ok().json(MatchesResponse {
        user_id: user_id.clone(),
        count: matches.len(),
        matches,
    })
}

/// Users who liked a user and are still waiting for a like back
///
/// GET /api/v1/likes/pending?userId={userId}
///
/// Likers whose profile no longer exists are left out.
async fn get_pending_likes(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let user_id = &query.user_id;

    let likes = match state.firestore.likes_for(user_id).await {
        Ok(likes) => likes,
        Err(e) => return store_error("Failed to fetch likes", e),
    };

    let mut pending = Vec::new();
    for liker in LikeGraph::from_likes(user_id, &likes).pending_likes() {
        match load_profile(&state, &liker).await {
            Ok(_) => pending.push(liker),
            Err(FirestoreError::NotFound(_)) => {
                tracing::debug!("Dropping pending like from deleted user {}", liker);
            }
            Err(e) => return store_error("Failed to fetch liker profile", e),
        }
    }

    HttpResponse::Ok().json(PendingLikesResponse {
        user_id: user_id.clone(),
        count: pending.len(),
        pending,
    })
}

/// Evict cached data of a user after a profile or like write
///
/// DELETE /api/v1/cache/{userId}
async fn invalidate_cache(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let user_id = path.into_inner();
    state.cache.invalidate_user(&user_id).await;
    HttpResponse::NoContent().finish()
}

async fn load_profile(state: &AppState, user_id: &str) -> Result<Profile, FirestoreError> {
    if let Some(profile) = state.cache.get_profile(user_id).await {
        return Ok(profile);
    }

    let profile = state.firestore.get_profile(user_id).await?;
    state.cache.insert_profile(profile.clone()).await;
    Ok(profile)
}
