// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, defaults, and runtime configuration parsing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Environment-based configuration management

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::info;

use crate::errors::{AppError, AppResult};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database with file path
    SQLite {
        /// Database file path
        path: PathBuf,
    },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from a connection string
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s.strip_prefix("sqlite:").unwrap_or(s);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to a connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_string(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/growth.db"),
        }
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Log level
    pub log_level: LogLevel,
    /// Database configuration
    pub database: DatabaseConfig,
    /// State token signing configuration
    pub auth: AuthConfig,
    /// Instagram app configuration
    pub instagram: InstagramConfig,
    /// Background sync configuration
    pub sync: SyncConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (SQLite path or `:memory:`)
    pub url: DatabaseUrl,
}

/// State token signing configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign state tokens
    pub jwt_secret: Option<String>,
    /// State token lifetime in minutes
    pub state_token_expiry_minutes: i64,
}

impl AuthConfig {
    /// The signing secret, or `ConfigMissing` when `JWT_SECRET` is unset
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ConfigMissing`] when no secret is configured.
    pub fn require_jwt_secret(&self) -> AppResult<&str> {
        self.jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(AppError::ConfigMissing("JWT_SECRET"))
    }
}

/// Instagram app credentials and OAuth settings
#[derive(Debug, Clone)]
pub struct InstagramConfig {
    /// OAuth client ID
    pub client_id: Option<String>,
    /// OAuth client secret
    pub client_secret: Option<String>,
    /// OAuth redirect URI
    pub redirect_uri: Option<String>,
    /// OAuth scopes requested during authorization
    pub scopes: Vec<String>,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            scopes: default_instagram_scopes(),
        }
    }
}

/// Scopes the Instagram Graph flow requests by default
#[must_use]
pub fn default_instagram_scopes() -> Vec<String> {
    vec![
        "instagram_basic".to_string(),
        "pages_show_list".to_string(),
        "pages_read_engagement".to_string(),
        "business_management".to_string(),
    ]
}

/// Background sync configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Capacity of the bounded sync request queue
    pub queue_capacity: usize,
    /// Request-level timeout for provider HTTP calls, in seconds
    pub http_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            http_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Missing provider credentials are not an error here: the server can
    /// start without them, and linking operations fail with `ConfigMissing`
    /// when they are actually needed.
    #[must_use]
    pub fn from_env() -> Self {
        let log_level = LogLevel::from_str_or_default(
            &env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        );

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .map_or_else(|_| DatabaseUrl::default(), |s| DatabaseUrl::parse_url(&s)),
        };

        let auth = AuthConfig {
            jwt_secret: env::var("JWT_SECRET").ok(),
            state_token_expiry_minutes: env_i64("STATE_TOKEN_EXPIRY_MINUTES", 10),
        };

        let instagram = InstagramConfig {
            client_id: env::var("INSTAGRAM_CLIENT_ID").ok(),
            client_secret: env::var("INSTAGRAM_CLIENT_SECRET").ok(),
            redirect_uri: env::var("INSTAGRAM_REDIRECT_URI").ok(),
            scopes: default_instagram_scopes(),
        };

        let sync = SyncConfig {
            queue_capacity: env_usize("SYNC_QUEUE_CAPACITY", 64),
            http_timeout_secs: env_u64("PROVIDER_HTTP_TIMEOUT_SECS", 30),
        };

        let config = Self {
            log_level,
            database,
            auth,
            instagram,
            sync,
        };

        info!(
            "Configuration loaded: database={}, instagram_app_configured={}",
            config.database.url,
            config.instagram.client_id.is_some()
        );

        config
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
