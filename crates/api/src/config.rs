//! # API Configuration Module
//!
//! Loads the server configuration from environment variables, with defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `JWT_SECRET`: Secret used to sign administrator tokens (required)
//! - `TOKEN_TTL_HOURS`: Lifetime of an administrator token (default: 24)
//! - `API_REQUEST_TIMEOUT_SECONDS`: Request timeout (default: 30)
//! - `CLINIC_TIMEZONE`: IANA zone for calendar days and recurrence
//!   (default: "America/Argentina/Buenos_Aires")

use chrono_tz::Tz;
use eyre::{Result, WrapErr, eyre};
use std::env;
use tracing::Level;

pub const DEFAULT_TIMEZONE: &str = "America/Argentina/Buenos_Aires";

/// Configuration for the API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use turnos_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}", config.server_addr());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Secret for signing administrator tokens
    pub jwt_secret: String,

    /// Lifetime of an administrator token, in hours
    pub token_ttl_hours: i64,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Timezone of the clinic
    pub timezone: Tz,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is not set
    /// - `API_PORT` cannot be parsed as a u16
    /// - `API_CORS_ORIGINS` contains the `*` wildcard
    /// - `CLINIC_TIMEZONE` is not a known IANA timezone
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS")
            .ok()
            .map(|origins| parse_cors_origins(&origins))
            .transpose()?;

        // Security settings
        let jwt_secret = env::var("JWT_SECRET")
            .wrap_err("JWT_SECRET environment variable must be set")?;
        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24);

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Clinic settings
        let timezone = parse_timezone(
            &env::var("CLINIC_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string()),
        )?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            jwt_secret,
            token_ttl_hours,
            request_timeout,
            timezone,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Unknown values fall back to `INFO`.
pub fn parse_log_level(value: &str) -> Level {
    match value.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Splits a comma separated origin list. Credentials are allowed, so `*` is refused.
pub fn parse_cors_origins(value: &str) -> Result<Vec<String>> {
    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|origin| origin == "*") {
        return Err(eyre!(
            "API_CORS_ORIGINS cannot contain '*': list the allowed origins explicitly"
        ));
    }

    Ok(origins)
}

pub fn parse_timezone(value: &str) -> Result<Tz> {
    value
        .trim()
        .parse::<Tz>()
        .map_err(|e| eyre!("Invalid CLINIC_TIMEZONE '{}': {}", value, e))
}
