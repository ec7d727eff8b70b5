//! Middleware pipeline.
//!
//! # Data Flow
//! ```text
//! Request
//!     → global chain (registration order, runs before matching)
//!     → route chain (registration order, only for the matched route)
//!     → handler
//! Any ShortCircuit stops the pipeline; its response is final.
//! ```
//!
//! # Design Decisions
//! - Chains are assembled at bootstrap and frozen with the dispatcher
//! - Per-route middleware is referenced by identifier and resolved once
//! - Middleware returns `Err` to report a failure; the dispatcher renders 500

pub mod access_control;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::http::{Request, Response};
use crate::routing::HandlerError;

pub use access_control::RequireSession;

/// Outcome of running one middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Continue,
    ShortCircuit(Response),
}

/// A request/response interceptor.
pub trait Middleware: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn handle(&self, request: &mut Request, response: &mut Response)
        -> Result<Decision, HandlerError>;
}

/// Adapter turning a closure into a [`Middleware`].
pub struct FnMiddleware<F> {
    name: String,
    f: F,
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut Request, &mut Response) -> Result<Decision, HandlerError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(
        &self,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<Decision, HandlerError> {
        (self.f)(request, response)
    }
}

/// Build a middleware from a closure.
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnMiddleware<F>
where
    F: Fn(&mut Request, &mut Response) -> Result<Decision, HandlerError> + Send + Sync,
{
    FnMiddleware {
        name: name.into(),
        f,
    }
}

/// Ordered sequence of middleware.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new(layers: Vec<Arc<dyn Middleware>>) -> Self {
        Self { layers }
    }

    /// Run each layer in order, stopping at the first short-circuit or error.
    pub fn run(
        &self,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<Decision, HandlerError> {
        for layer in &self.layers {
            if let Decision::ShortCircuit(res) = layer.handle(request, response)? {
                tracing::warn!(
                    middleware = layer.name(),
                    status = %res.status,
                    "Middleware short-circuited request"
                );
                return Ok(Decision::ShortCircuit(res));
            }
        }
        Ok(Decision::Continue)
    }

    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Named middleware available to routes by identifier.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    named: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, middleware: Arc<dyn Middleware>) {
        self.named.insert(id.into(), middleware);
    }

    /// Resolve identifiers into a chain, or return the first unknown identifier.
    pub fn resolve(&self, ids: &[String]) -> Result<MiddlewareChain, String> {
        ids.iter()
            .map(|id| self.named.get(id).cloned().ok_or_else(|| id.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map(MiddlewareChain::new)
    }
}
