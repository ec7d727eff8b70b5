//! Application-lifetime services.
//!
//! One [`AppContext`] is created at bootstrap and shared via `Arc` with the
//! dispatcher and any middleware that needs it.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::services::{
    Cache, ErrorLogger, ErrorPages, ErrorRenderer, FileErrorLogger, SessionStore,
    StaticErrorPages, TracingErrorLogger,
};

pub struct AppContext {
    pub views: Arc<dyn ErrorRenderer>,
    pub logger: Arc<dyn ErrorLogger>,
    pub sessions: Arc<SessionStore>,
    pub cache: Cache,
    pub session_cookie: String,
}

impl AppContext {
    /// Build the default services described by `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let logger: Arc<dyn ErrorLogger> = if config.logging.error_log.is_empty() {
            Arc::new(TracingErrorLogger)
        } else {
            Arc::new(FileErrorLogger::new(
                config.root_path(&config.logging.error_log),
            ))
        };

        Self {
            views: Arc::new(ErrorPages::new(config.root_path(&config.views.errors_dir))),
            logger,
            sessions: Arc::new(SessionStore::new(Duration::from_secs(
                config.session.timeout_secs,
            ))),
            cache: Cache::new(Duration::from_secs(config.cache.ttl_secs)),
            session_cookie: config.session.cookie_name.clone(),
        }
    }
}

impl Default for AppContext {
    /// In-memory services: no error pages on disk, errors logged via tracing.
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            views: Arc::new(StaticErrorPages::new()),
            logger: Arc::new(TracingErrorLogger),
            sessions: Arc::new(SessionStore::new(Duration::from_secs(
                config.session.timeout_secs,
            ))),
            cache: Cache::new(Duration::from_secs(config.cache.ttl_secs)),
            session_cookie: config.session.cookie_name,
        }
    }
}
