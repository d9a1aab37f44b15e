use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub firestore: FirestoreSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub ranking: RankingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreSettings {
    #[serde(default = "default_firestore_url")]
    pub base_url: String,
    pub project_id: String,
    #[serde(default = "default_database_id")]
    pub database_id: String,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
    #[serde(default = "default_users_collection")]
    pub users_collection: String,
    #[serde(default = "default_likes_collection")]
    pub likes_collection: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_firestore_url() -> String { "https://firestore.googleapis.com/v1".to_string() }
fn default_database_id() -> String { "(default)".to_string() }
fn default_users_collection() -> String { "users".to_string() }
fn default_likes_collection() -> String { "likes".to_string() }
fn default_request_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_ttl() -> u64 { 300 }
fn default_cache_capacity() -> u64 { 10_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct RankingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> usize { crate::core::DEFAULT_TOP_MATCHES }
fn default_max_limit() -> usize { 100 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    pub emotions: f64,
    pub emotion_floor: f64,
    pub interests: f64,
    pub age_within_5: f64,
    pub age_within_10: f64,
    pub age_within_15: f64,
    pub age_unknown: f64,
    pub location: f64,
    pub complete_profile: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        ScoringWeights::default().into()
    }
}

impl From<ScoringWeights> for WeightsConfig {
    fn from(w: ScoringWeights) -> Self {
        Self {
            emotions: w.emotions,
            emotion_floor: w.emotion_floor,
            interests: w.interests,
            age_within_5: w.age_within_5,
            age_within_10: w.age_within_10,
            age_within_15: w.age_within_15,
            age_unknown: w.age_unknown,
            location: w.location,
            complete_profile: w.complete_profile,
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(w: &WeightsConfig) -> Self {
        Self {
            emotions: w.emotions,
            emotion_floor: w.emotion_floor,
            interests: w.interests,
            age_within_5: w.age_within_5,
            age_within_10: w.age_within_10,
            age_within_15: w.age_within_15,
            age_unknown: w.age_unknown,
            location: w.location,
            complete_profile: w.complete_profile,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ECHO)
    /// 5. FIRESTORE_EMULATOR_HOST, if set
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ECHO__SERVER__PORT -> server.port
            .add_source(environment());

        with_emulator_override(builder)?.build()?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment());

        with_emulator_override(builder)?.build()?.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("ECHO")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Point the store client at a local emulator when one is advertised
fn with_emulator_override(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    match std::env::var("FIRESTORE_EMULATOR_HOST") {
        Ok(host) if !host.is_empty() => {
            builder.set_override("firestore.base_url", format!("http://{}/v1", host))
        }
        _ => Ok(builder),
    }
}
