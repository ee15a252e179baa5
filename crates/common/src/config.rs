//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Identity handoff configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Recommendation tuning.
    #[serde(default)]
    pub recommend: RecommendConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origin. Any origin when unset.
    #[serde(default)]
    pub allow_origin: Option<String>,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Identity handoff configuration.
///
/// Authentication itself happens upstream; the identity provider forwards the
/// authenticated actor id in a request header that this service trusts.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Header carrying the authenticated actor id.
    #[serde(default = "default_actor_header")]
    pub actor_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            actor_header: default_actor_header(),
        }
    }
}

/// Recommendation tuning.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RecommendConfig {
    /// Limit used when the caller does not ask for one.
    #[serde(default = "default_recommend_limit")]
    pub default_limit: i64,
    /// Upper bound on the caller-supplied limit.
    #[serde(default = "default_recommend_max_limit")]
    pub max_limit: i64,
    /// Candidate pool over-fetch factor.
    #[serde(default = "default_candidate_factor")]
    pub candidate_factor: i64,
    /// Popularity top-up pool factor.
    #[serde(default = "default_fallback_factor")]
    pub fallback_factor: i64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_limit: default_recommend_limit(),
            max_limit: default_recommend_max_limit(),
            candidate_factor: default_candidate_factor(),
            fallback_factor: default_fallback_factor(),
        }
    }
}

impl RecommendConfig {
    /// Resolve a caller-supplied limit: missing or non-positive values use the
    /// default, anything above the cap is lowered to it.
    #[must_use]
    pub fn resolve_limit(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(n) if n > 0 => n.min(self.max_limit),
            _ => self.default_limit,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_actor_header() -> String {
    "x-actor-id".to_string()
}

const fn default_recommend_limit() -> i64 {
    3
}

const fn default_recommend_max_limit() -> i64 {
    10
}

const fn default_candidate_factor() -> i64 {
    10
}

const fn default_fallback_factor() -> i64 {
    2
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, exported into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `SHAREGRAPH_ENV`)
    /// 4. Environment variables with `SHAREGRAPH__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        // A missing .env file is normal outside local development.
        let _ = dotenvy::dotenv();

        let env = std::env::var("SHAREGRAPH_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SHAREGRAPH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("SHAREGRAPH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
