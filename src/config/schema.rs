//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the application.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the application.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Application root and theme.
    pub app: AppSection,

    /// HTTP hosting settings.
    pub server: ServerConfig,

    /// Session store settings.
    pub session: SessionConfig,

    /// Cache settings.
    pub cache: CacheConfig,

    /// Error page location.
    pub views: ViewsConfig,

    /// Log level and error log file.
    pub logging: LoggingConfig,

    /// Metrics settings.
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Resolve a path relative to the application root.
    pub fn root_path(&self, relative: &str) -> PathBuf {
        self.app.root_dir.join(relative)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppSection {
    /// Root directory of the application (views, logs).
    pub root_dir: PathBuf,

    /// View theme name.
    pub theme: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            theme: "alpha-theme".to_string(),
        }
    }
}

/// Hosting layer configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Interval between session/cache purges in seconds.
    pub purge_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            request_timeout_secs: 30,
            purge_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle time after which a session is reset.
    pub timeout_secs: u64,

    /// Cookie carrying the session ID.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 1800,
            cookie_name: "COREXSESSID".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Default entry lifetime in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ViewsConfig {
    /// Directory holding `<code>.html` error pages, relative to the root.
    pub errors_dir: String,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            errors_dir: "app/views/errors".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Error log file, relative to the root. Empty disables the file.
    pub error_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            error_log: "app/logs/error.log".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
