// Integration tests for Echo Match

use actix_web::{test, web, App};
use echo_match::config::RankingSettings;
use echo_match::core::{LikeGraph, Ranker, DEFAULT_TOP_MATCHES};
use echo_match::models::{HealthResponse, Like, MatchScore, MatchesResponse, PendingLikesResponse, Profile, RankResponse};
use echo_match::routes::{self, matches::AppState};
use echo_match::services::{CacheManager, FirestoreClient, FirestoreCollections};
use mockito::Matcher;
use serde_json::{json, Value};
use std::sync::Arc;

const DOCUMENTS: &str = "/projects/echo-test/databases/(default)/documents";

fn create_test_profile(id: &str, emotions: &[&str], interests: &[&str], age: Option<u32>) -> Profile {
    Profile {
        uid: id.to_string(),
        emotions: emotions.iter().map(|s| s.to_string()).collect(),
        interests: interests.iter().map(|s| s.to_string()).collect(),
        age,
        ..Default::default()
    }
}

fn create_viewer() -> Profile {
    Profile {
        location: Some("Austin".to_string()),
        ..create_test_profile("viewer", &["calm", "happy"], &["hiking", "music"], Some(30))
    }
}

fn ids(matches: &[MatchScore]) -> Vec<&str> {
    matches.iter().map(|m| m.subject_id.as_str()).collect()
}

fn string_array(items: &[&str]) -> Value {
    json!({ "arrayValue": { "values": items.iter().map(|s| json!({ "stringValue": s })).collect::<Vec<_>>() } })
}

fn user_document(uid: &str, emotions: &[&str], interests: &[&str], age: u32) -> Value {
    json!({
        "name": format!("projects/echo-test/databases/(default)/documents/users/{}", uid),
        "fields": {
            "uid": { "stringValue": uid },
            "emotions": string_array(emotions),
            "interests": string_array(interests),
            "age": { "integerValue": age.to_string() }
        }
    })
}

fn like_row(user_id: &str, liked_user_id: &str) -> Value {
    json!({
        "document": {
            "name": format!("projects/echo-test/databases/(default)/documents/likes/{}_{}", user_id, liked_user_id),
            "fields": {
                "userId": { "stringValue": user_id },
                "likedUserId": { "stringValue": liked_user_id }
            }
        },
        "readTime": "2024-02-01T10:00:00Z"
    })
}

fn like_query(field: &str) -> Matcher {
    Matcher::PartialJson(json!({
        "structuredQuery": { "where": { "fieldFilter": { "field": { "fieldPath": field } } } }
    }))
}

fn app_state(base_url: &str) -> AppState {
    let firestore = FirestoreClient::new(
        base_url,
        "echo-test",
        "(default)",
        FirestoreCollections::default(),
        5,
    )
    .expect("client");

    AppState {
        firestore: Arc::new(firestore),
        cache: CacheManager::new(100, 60),
        ranker: Ranker::with_default_weights(),
        ranking: RankingSettings::default(),
    }
}

#[::core::prelude::v1::test]
fn test_integration_ranking_properties() {
    let ranker = Ranker::with_default_weights();
    let viewer = create_viewer();

    let candidates = vec![
        create_test_profile("a", &["calm"], &[], Some(31)),
        create_test_profile("b", &["calm", "happy"], &["hiking"], Some(29)),
        create_viewer(),
        create_test_profile("c", &["calm"], &[], Some(31)),
        create_test_profile("d", &[], &[], Some(70)),
        create_test_profile("e", &["calm"], &[], Some(31)),
    ];

    let ranked = ranker.rank(&viewer, &candidates);

    // Viewer excluded, everyone else scored
    assert_eq!(ranked.len(), 5);
    assert!(ranked.iter().all(|m| m.subject_id != viewer.uid));

    // Non-increasing scores, ties in input order
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score, "Matches not sorted by score");
    }
    assert_eq!(ids(&ranked), vec!["b", "a", "c", "e", "d"]);

    // Bounded variant is a prefix
    let top = ranker.top_matches(&viewer, &candidates, 3);
    assert_eq!(top[..], ranked[..3]);
    assert_eq!(ranker.top_matches(&viewer, &candidates, DEFAULT_TOP_MATCHES).len(), 5);
    assert!(ranker.top_matches(&viewer, &[], 3).is_empty());
}

#[::core::prelude::v1::test]
fn test_integration_discover_filters_mutual_matches() {
    let ranker = Ranker::with_default_weights();
    let viewer = create_viewer();

    let candidates = vec![
        create_test_profile("a", &["calm"], &[], Some(31)),
        create_test_profile("b", &["calm"], &[], Some(31)),
        create_test_profile("c", &["calm"], &[], Some(31)),
    ];
    let likes = vec![
        Like::new("viewer", "b"),
        Like::new("b", "viewer"),
        Like::new("c", "viewer"),
    ];

    let result = ranker.discover(&viewer, &candidates, &LikeGraph::from_likes("viewer", &likes), 1);

    assert_eq!(result.total_candidates, 3);
    assert_eq!(ids(&result.matches), vec!["a"]);
}

#[actix_web::test]
async fn test_score_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state("http://127.0.0.1:9")))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/compatibility/score")
        .set_json(json!({
            "viewer": { "uid": "v", "emotions": ["calm", "happy"], "interests": ["hiking"], "age": 30, "location": "NYC" },
            "candidate": { "uid": "c", "emotions": ["calm"], "interests": ["hiking", "music"], "age": 32,
                           "location": "nyc", "bio": "hi", "photoURL": "x" }
        }))
        .to_request();

    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["userId"], "c");
    assert_eq!(body["score"], 100.0);
    assert_eq!(body["commonEmotions"], json!(["calm"]));
    assert_eq!(body["commonInterests"], json!(["hiking"]));
}

#[actix_web::test]
async fn test_rank_endpoint_with_limit() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state("http://127.0.0.1:9")))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/compatibility/rank")
        .set_json(json!({
            "viewer": { "uid": "v", "emotions": ["calm"] },
            "candidates": [
                { "uid": "low" },
                { "uid": "v", "emotions": ["calm"] },
                { "uid": "high", "emotions": ["calm"] },
                { "uid": "other" }
            ],
            "limit": 2
        }))
        .to_request();

    let body: RankResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.total_candidates, 4);
    assert_eq!(ids(&body.matches), vec!["high", "low"]);
}

#[actix_web::test]
async fn test_rank_endpoint_rejects_blank_viewer() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state("http://127.0.0.1:9")))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/compatibility/rank")
        .set_json(json!({ "viewer": { "uid": "" }, "candidates": [] }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_discover_endpoint_end_to_end() {
    let mut server = mockito::Server::new_async().await;

    let _profile = server
        .mock("GET", format!("{}/users/viewer", DOCUMENTS).as_str())
        .with_status(200)
        .with_body(user_document("viewer", &["calm", "happy"], &["hiking"], 30).to_string())
        .create_async()
        .await;

    let _list = server
        .mock("GET", format!("{}/users", DOCUMENTS).as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "documents": [
                    user_document("viewer", &["calm", "happy"], &["hiking"], 30),
                    user_document("far", &[], &[], 70),
                    user_document("matched", &["calm", "happy"], &["hiking"], 30),
                    user_document("close", &["calm"], &["hiking"], 31),
                    user_document("liker", &["calm"], &[], 31)
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let _outgoing = server
        .mock("POST", format!("{}:runQuery", DOCUMENTS).as_str())
        .match_body(like_query("userId"))
        .with_status(200)
        .with_body(json!([like_row("viewer", "matched"), like_row("viewer", "far")]).to_string())
        .create_async()
        .await;

    let _incoming = server
        .mock("POST", format!("{}:runQuery", DOCUMENTS).as_str())
        .match_body(like_query("likedUserId"))
        .with_status(200)
        .with_body(json!([like_row("matched", "viewer"), like_row("liker", "viewer")]).to_string())
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server.url())))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/discover")
        .set_json(json!({ "userId": "viewer" }))
        .to_request();

    let body: RankResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.total_candidates, 5);
    assert_eq!(ids(&body.matches), vec!["close", "liker", "far"]);
}

#[actix_web::test]
async fn test_discover_unknown_user_is_not_found() {
    let mut server = mockito::Server::new_async().await;

    let _profile = server
        .mock("GET", format!("{}/users/ghost", DOCUMENTS).as_str())
        .with_status(404)
        .with_body(json!({ "error": { "code": 404, "status": "NOT_FOUND" } }).to_string())
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server.url())))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/discover")
        .set_json(json!({ "userId": "ghost" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_matches_endpoint_is_cached() {
    let mut server = mockito::Server::new_async().await;

    let outgoing = server
        .mock("POST", format!("{}:runQuery", DOCUMENTS).as_str())
        .match_body(like_query("userId"))
        .with_status(200)
        .with_body(json!([like_row("me", "a"), like_row("me", "b")]).to_string())
        .expect(1)
        .create_async()
        .await;

    let incoming = server
        .mock("POST", format!("{}:runQuery", DOCUMENTS).as_str())
        .match_body(like_query("likedUserId"))
        .with_status(200)
        .with_body(json!([like_row("b", "me"), like_row("c", "me"), like_row("a", "me")]).to_string())
        .expect(1)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server.url())))
            .configure(routes::configure_routes),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::get().uri("/api/v1/matches?userId=me").to_request();
        let body: MatchesResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.matches, vec!["b", "a"]);
        assert_eq!(body.count, 2);
    }

    outgoing.assert_async().await;
    incoming.assert_async().await;
}

#[actix_web::test]
async fn test_pending_likes_endpoint() {
    let mut server = mockito::Server::new_async().await;

    let _outgoing = server
        .mock("POST", format!("{}:runQuery", DOCUMENTS).as_str())
        .match_body(like_query("userId"))
        .with_status(200)
        .with_body(json!([like_row("me", "a"), { "readTime": "2024-02-01T10:00:00Z" }]).to_string())
        .create_async()
        .await;

    let _incoming = server
        .mock("POST", format!("{}:runQuery", DOCUMENTS).as_str())
        .match_body(like_query("likedUserId"))
        .with_status(200)
        .with_body(json!([like_row("a", "me"), like_row("c", "me"), like_row("gone", "me")]).to_string())
        .create_async()
        .await;

    let _liker = server
        .mock("GET", format!("{}/users/c", DOCUMENTS).as_str())
        .with_status(200)
        .with_body(user_document("c", &["calm"], &[], 28).to_string())
        .create_async()
        .await;

    let deleted = server
        .mock("GET", format!("{}/users/gone", DOCUMENTS).as_str())
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server.url())))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/likes/pending?userId=me").to_request();
    let body: PendingLikesResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.pending, vec!["c"]);
    assert_eq!(body.count, 1);
    deleted.assert_async().await;
}

#[actix_web::test]
async fn test_health_reports_cache_stats() {
    let state = app_state("http://127.0.0.1:9");

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: HealthResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.status, "healthy");
    assert_eq!(body.cache.ttl_secs, 60);
    assert_eq!(body.cache.profiles, 0);
}

#[actix_web::test]
async fn test_cache_invalidation_endpoint() {
    let state = app_state("http://127.0.0.1:9");
    state.cache.insert_profile(create_viewer()).await;
    state.cache.insert_matches("viewer", vec!["a".to_string()]).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::delete().uri("/api/v1/cache/viewer").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 204);
    assert!(state.cache.get_profile("viewer").await.is_none());
    assert!(state.cache.get_matches("viewer").await.is_none());
}
