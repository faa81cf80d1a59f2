/// Configuration management for the API server
///
/// Configuration comes from environment variables, optionally seeded from a
/// `.env` file in development.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 9999)
/// - `CORS_ORIGINS`: comma-separated origins or `*` (default: *)
/// - `TOKEN_TTL_HOURS`: lifetime of login tokens (default: 24)
/// - `REQUEST_TIMEOUT_SECONDS`: per-request deadline (default: 30)
/// - `AUTHOR_PAGE_SIZE`: books per page when listing by author (default: 10)
/// - `GENRE_PAGE_SIZE`: books per page when listing by genre (default: 5)
/// - `SEARCH_LIMIT`: maximum search results (default: 20)
/// - `RUST_LOG`: log filter
///
/// # Example
///
/// ```no_run
/// use penhub_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use penhub_shared::library::PagingConfig;
use serde::{Deserialize, Serialize};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub limits: LimitsConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of issued tokens
    pub token_ttl_hours: i64,
}

/// Request deadline, page sizes and search cap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub request_timeout_seconds: u64,
    pub author_page_size: i64,
    pub genre_page_size: i64,
    pub search_limit: i64,
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

/// Ten years; keeps `Utc::now() + ttl` far from chrono's range limits
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

/// One hour; keeps `Instant::now() + timeout` from overflowing
pub const MAX_REQUEST_TIMEOUT_SECONDS: u64 = 3600;

fn positive(key: &str, value: i64) -> anyhow::Result<i64> {
    if value < 1 {
        anyhow::bail!("{key} must be at least 1");
    }
    Ok(value)
}

fn at_most<T>(key: &str, value: T, max: T) -> anyhow::Result<T>
where
    T: PartialOrd + std::fmt::Display,
{
    if value > max {
        anyhow::bail!("{key} must be at most {max}");
    }
    Ok(value)
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or any variable has an
    /// invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "API_PORT", 9999u16)?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;

        let token_ttl_hours = positive(
            "TOKEN_TTL_HOURS",
            parse_or(&lookup, "TOKEN_TTL_HOURS", 24i64)?,
        )?;
        let token_ttl_hours = at_most("TOKEN_TTL_HOURS", token_ttl_hours, MAX_TOKEN_TTL_HOURS)?;

        let request_timeout_seconds = parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 30u64)?;
        if request_timeout_seconds == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECONDS must be at least 1");
        }
        let request_timeout_seconds = at_most(
            "REQUEST_TIMEOUT_SECONDS",
            request_timeout_seconds,
            MAX_REQUEST_TIMEOUT_SECONDS,
        )?;

        let author_page_size = positive(
            "AUTHOR_PAGE_SIZE",
            parse_or(&lookup, "AUTHOR_PAGE_SIZE", 10i64)?,
        )?;
        let genre_page_size = positive(
            "GENRE_PAGE_SIZE",
            parse_or(&lookup, "GENRE_PAGE_SIZE", 5i64)?,
        )?;
        let search_limit = positive("SEARCH_LIMIT", parse_or(&lookup, "SEARCH_LIMIT", 20i64)?)?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
            },
            database: DatabaseConfig {
                url,
                max_connections,
            },
            auth: AuthConfig { token_ttl_hours },
            limits: LimitsConfig {
                request_timeout_seconds,
                author_page_size,
                genre_page_size,
                search_limit,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.auth.token_ttl_hours)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.limits.request_timeout_seconds)
    }

    pub fn paging(&self) -> PagingConfig {
        PagingConfig {
            author_page_size: self.limits.author_page_size,
            genre_page_size: self.limits.genre_page_size,
            search_limit: self.limits.search_limit,
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgresql://localhost/penhub")]))
            .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:9999");
        assert!(config.allows_any_origin());
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.token_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.paging(), PagingConfig::default());
    }

    #[test]
    fn test_database_url_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://localhost/penhub"),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8080"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("TOKEN_TTL_HOURS", "1"),
            ("AUTHOR_PAGE_SIZE", "3"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(!config.allows_any_origin());
        assert_eq!(config.token_ttl(), chrono::Duration::hours(1));
        assert_eq!(config.paging().author_page_size, 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = ("DATABASE_URL", "postgresql://localhost/penhub");

        assert!(Config::from_lookup(lookup(&[base, ("API_PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[base, ("GENRE_PAGE_SIZE", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[base, ("REQUEST_TIMEOUT_SECONDS", "0")])).is_err());
    }

    #[test]
    fn test_durations_are_bounded() {
        let base = ("DATABASE_URL", "postgresql://localhost/penhub");

        let err = Config::from_lookup(lookup(&[base, ("TOKEN_TTL_HOURS", "9223372036854775807")]))
            .unwrap_err();
        assert!(err.to_string().contains("TOKEN_TTL_HOURS"));

        let err = Config::from_lookup(lookup(&[
            base,
            ("REQUEST_TIMEOUT_SECONDS", "18446744073709551615"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("REQUEST_TIMEOUT_SECONDS"));

        // The limits themselves are accepted and usable
        let config = Config::from_lookup(lookup(&[
            base,
            ("TOKEN_TTL_HOURS", &MAX_TOKEN_TTL_HOURS.to_string()),
            ("REQUEST_TIMEOUT_SECONDS", &MAX_REQUEST_TIMEOUT_SECONDS.to_string()),
        ]))
        .unwrap();
        assert!(chrono::Utc::now().checked_add_signed(config.token_ttl()).is_some());
        assert_eq!(config.request_timeout(), Duration::from_secs(3600));
    }
}
