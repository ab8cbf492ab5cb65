use std::env;

use crate::error::AppError;

/// Default backend location used by the reference deployment.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Default path of the query endpoint.
pub const DEFAULT_QUERY_PATH: &str = "/query";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
}

/// Health query backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub query_path: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
///
/// No timeout is applied unless one is configured: a slow backend keeps the
/// pending message visible until it answers.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub timeout_ms: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = BackendConfig {
            base_url: env::var("HEALTH_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            query_path: env::var("HEALTH_API_QUERY_PATH")
                .unwrap_or_else(|_| DEFAULT_QUERY_PATH.to_string()),
        };

        if backend.base_url.trim().is_empty() {
            return Err(AppError::Config {
                message: "HEALTH_API_BASE_URL must not be empty".to_string(),
            });
        }

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|ms| *ms > 0),
        };

        Ok(Config {
            backend,
            logging,
            request,
        })
    }
}

impl BackendConfig {
    /// Full URL of the query endpoint.
    pub fn query_url(&self) -> String {
        let path = self.query_path.trim_start_matches('/');
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            query_path: DEFAULT_QUERY_PATH.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_url_joins_without_double_slash() {
        let config = BackendConfig {
            base_url: "http://localhost:8000/".to_string(),
            query_path: "/query".to_string(),
        };
        assert_eq!(config.query_url(), "http://localhost:8000/query");

        let config = BackendConfig {
            base_url: "http://localhost:8000".to_string(),
            query_path: "api/query".to_string(),
        };
        assert_eq!(config.query_url(), "http://localhost:8000/api/query");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.query_url(), "http://127.0.0.1:8000/query");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.request.timeout_ms.is_none());
    }
}
