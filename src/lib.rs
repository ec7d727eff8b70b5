//! CoreX: a minimal web application scaffold.
//!
//! Route patterns are compiled at startup, matched in registration order,
//! and dispatched through a middleware pipeline to inline handlers or
//! controller actions.

pub mod app;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod services;

pub use app::{AppContext, Application, BuildError, Controller};
pub use config::AppConfig;
pub use http::{Decision, Dispatcher, HttpServer, Middleware, Request, Response};
pub use lifecycle::Shutdown;
pub use routing::{Handler, HandlerError, HandlerResult, Method, RouteParams};
