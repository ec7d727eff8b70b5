//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     (method, pattern, handler, middleware ids)
//!     → pattern.rs (compile into literal / capture / prefixed capture)
//!     → table.rs (append in registration order, expand resources)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path):
//!     → table.rs (routes registered for method)
//!     → matcher.rs (segment-by-segment comparison)
//!     → Return: MatchResult { route, params } or no match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (exact literal and prefix comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod matcher;
pub mod pattern;
pub mod route;
pub mod table;

pub use matcher::MatchResult;
pub use pattern::{PatternError, RoutePattern, Segment};
pub use route::{Handler, HandlerError, HandlerResult, Method, Route, RouteId, RouteParams};
pub use table::{RouteTable, RouteTableBuilder, RESOURCE_ACTIONS};
