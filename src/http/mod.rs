//! HTTP request handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace)
//!     → request.rs (method, path, headers, cookies)
//!     → dispatcher.rs
//!         → middleware/ (global chain, then route chain)
//!         → routing (match) → handler / controller action
//!     → response.rs (status, headers, body)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::Dispatcher;
pub use middleware::{Decision, Middleware, MiddlewareChain};
pub use request::{Request, X_REQUEST_ID};
pub use response::Response;
pub use server::HttpServer;
