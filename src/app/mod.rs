//! Application assembly.
//!
//! # Data Flow
//! ```text
//! Startup (application.rs):
//!     AppContext (services) → Application
//!     → router() registrations, use_middleware(), controller()
//!     → build(): resolve middleware ids, check controller actions
//!     → Dispatcher (frozen, shared by all requests)
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Services are passed explicitly; there are no globals

pub mod application;
pub mod context;
pub mod controller;

pub use application::{Application, BuildError};
pub use context::AppContext;
pub use controller::{Controller, ControllerRegistry};
