use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use echo_match::config::Settings;
use echo_match::core::Ranker;
use echo_match::models::{ErrorResponse, ScoringWeights};
use echo_match::routes::{self, matches::AppState};
use echo_match::services::{CacheManager, FirestoreClient, FirestoreCollections};
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// Payload errors rendered as JSON bodies
#[derive(Debug)]
struct PayloadError(ErrorResponse);

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.0.error, self.0.message)
    }
}

impl error::ResponseError for PayloadError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

fn bad_request(error: &str, message: String) -> actix_web::Error {
    PayloadError(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
    .into()
}

/// Handle JSON payload errors
fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    bad_request("invalid_json", format!("Invalid JSON: {}", err))
}

/// Handle query payload errors
fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    bad_request("invalid_query", format!("Invalid query: {}", err))
}

fn init_logging(level: &str, format: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Logging needs the settings, so configuration errors go to stderr
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting Echo Match service...");

    let collections = FirestoreCollections {
        users: settings.firestore.users_collection.clone(),
        likes: settings.firestore.likes_collection.clone(),
    };

    let firestore = FirestoreClient::new(
        &settings.firestore.base_url,
        &settings.firestore.project_id,
        &settings.firestore.database_id,
        collections,
        settings.firestore.request_timeout_secs,
    )
    .map_err(|e| {
        error!("Failed to create document store client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?
    .with_api_key(settings.firestore.api_key.clone())
    .with_bearer_token(settings.firestore.bearer_token.clone());

    info!("Document store client initialized ({})", firestore.documents_url());

    let cache = CacheManager::new(settings.cache.capacity, settings.cache.ttl_secs);

    info!(
        "Cache initialized ({} entries per tier, TTL: {}s)",
        settings.cache.capacity, settings.cache.ttl_secs
    );

    let weights = ScoringWeights::from(&settings.scoring.weights);
    let ranker = Ranker::new(weights);

    info!("Ranker initialized with weights: {:?}", weights);

    let app_state = AppState {
        firestore: Arc::new(firestore),
        cache,
        ranker,
        ranking: settings.ranking.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
