//! Application services.
//!
//! # Data Flow
//! ```text
//! AppContext (one per application)
//!     → session.rs (per-client key/value state, idle expiry)
//!     → logger.rs  (dispatcher error path)
//!     → view.rs    (404 / 500 pages)
//!     → cache.rs   (shared key/value with TTL)
//! ```
//!
//! # Design Decisions
//! - Services are constructed once at bootstrap and passed explicitly
//! - The router core only sees the narrow traits (`ErrorLogger`, `ErrorRenderer`)

pub mod cache;
pub mod logger;
pub mod session;
pub mod view;

pub use cache::Cache;
pub use logger::{ErrorLogger, FileErrorLogger, TracingErrorLogger};
pub use session::{Session, SessionMiddleware, SessionStore};
pub use view::{ErrorPages, ErrorRenderer, StaticErrorPages};
