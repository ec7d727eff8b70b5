//! Request dispatch.
//!
//! # State Machine
//! ```text
//! Start → RunGlobalMiddleware ─┬→ ShortCircuited (end)
//!                              └→ Matching ─┬→ Matched → RunRouteMiddleware ─┬→ ShortCircuited (end)
//!                                           │                                └→ Invoke → Rendered (end)
//!                                           └→ Unmatched → NotFoundRendered (end)
//! Any failure or panic in middleware or handler → ErrorRendered (end)
//! ```
//!
//! # Design Decisions
//! - The dispatcher is the error boundary: nothing propagates past it
//! - Failure detail is logged, never rendered
//! - Exactly two failure pages: 404 and 500, with a plain `Error <code>`
//!   fallback when no template exists
//! - No shared mutable per-request state; the dispatcher itself is read-only
//! - Headers set before a short-circuit (e.g. a new session cookie) are kept
//! - The session cookie is reissued after the handler if the session ID changed

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;

use crate::app::context::AppContext;
use crate::app::controller::ControllerRegistry;
use crate::http::middleware::{Decision, MiddlewareChain};
use crate::http::{Request, Response};
use crate::observability::metrics;
use crate::routing::{Handler, HandlerError, HandlerResult, MatchResult, RouteTable};
use crate::services::session;

enum Outcome {
    ShortCircuited(Response),
    Rendered(Response),
    NotFound(Response),
}

/// Turns a request into a response via middleware, matching and invocation.
pub struct Dispatcher {
    table: Arc<RouteTable>,
    global: MiddlewareChain,
    route_chains: Vec<MiddlewareChain>,
    controllers: ControllerRegistry,
    context: Arc<AppContext>,
}

impl Dispatcher {
    pub(crate) fn new(
        table: Arc<RouteTable>,
        global: MiddlewareChain,
        route_chains: Vec<MiddlewareChain>,
        controllers: ControllerRegistry,
        context: Arc<AppContext>,
    ) -> Self {
        Self {
            table,
            global,
            route_chains,
            controllers,
            context,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.context
    }

    /// Dispatch `method path` and return only the response body.
    pub fn resolve(&self, method: &str, path: &str) -> String {
        self.dispatch(Request::new(method, path)).body
    }

    /// Dispatch one request. Never panics and never returns an error;
    /// failures become a 500 response.
    pub fn dispatch(&self, mut request: Request) -> Response {
        let start = Instant::now();
        let method = request.method().to_string();
        let span = tracing::debug_span!(
            "dispatch",
            method = %method,
            path = %request.path(),
            request_id = request.request_id().unwrap_or("-"),
        );
        let _enter = span.enter();

        let mut working = Response::default();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run(&mut request, &mut working)
        }))
        .unwrap_or_else(|payload| Err(HandlerError::Panicked(panic_message(payload.as_ref()))));

        let served = result.is_ok();
        let (mut response, outcome) = match result {
            Ok(Outcome::Rendered(res)) => (res, "rendered"),
            Ok(Outcome::ShortCircuited(res)) => (res, "short_circuited"),
            Ok(Outcome::NotFound(res)) => (res, "not_found"),
            Err(err) => {
                self.report(&err);
                (self.render_failure(), "error")
            }
        };
        if served {
            session::sync_cookie(&request, &mut response, &self.context.session_cookie);
        }

        metrics::record_request(&method, response.status.as_u16(), outcome, start);
        response
    }

    fn run(&self, request: &mut Request, response: &mut Response) -> Result<Outcome, HandlerError> {
        if let Decision::ShortCircuit(res) = self.global.run(request, response)? {
            return Ok(Outcome::ShortCircuited(res.inherit_headers(response)));
        }

        let Some(matched) = self.find(request) else {
            let res = self.render_error(StatusCode::NOT_FOUND, std::mem::take(response));
            return Ok(Outcome::NotFound(res));
        };
        tracing::debug!(route = %matched.route, params = ?matched.params, "Route matched");

        if let Some(chain) = self.route_chains.get(matched.route.id().0) {
            if let Decision::ShortCircuit(res) = chain.run(request, response)? {
                return Ok(Outcome::ShortCircuited(res.inherit_headers(response)));
            }
        }

        response.body = self.invoke(&matched, request)?;
        Ok(Outcome::Rendered(std::mem::take(response)))
    }

    fn find(&self, request: &Request) -> Option<MatchResult> {
        let method = match request.parsed_method() {
            Ok(method) => method,
            Err(e) => {
                tracing::debug!(error = %e, "No route matched");
                return None;
            }
        };

        let matched = self.table.match_route(method, request.path());
        if matched.is_none() {
            let allowed = self.table.allowed_methods(request.path());
            tracing::debug!(?allowed, "No route matched");
        }
        matched
    }

    fn invoke(&self, matched: &MatchResult, request: &Request) -> HandlerResult {
        match matched.route.handler() {
            Handler::Inline(f) => (**f)(request, &matched.params),
            Handler::Action { controller, action } => {
                let target = self
                    .controllers
                    .get(controller)
                    .ok_or_else(|| HandlerError::UnknownController(controller.clone()))?;
                target.call(action, request, &matched.params.positional())
            }
        }
    }

    /// Hand the failure to the logger. A failing logger must not stop the 500.
    fn report(&self, err: &HandlerError) {
        let logger = &self.context.logger;
        if panic::catch_unwind(AssertUnwindSafe(|| logger.log_error(err))).is_err() {
            tracing::error!(error = %err, "Error logger panicked while reporting failure");
        }
    }

    /// The 500 page. A panicking renderer falls back to the plain page.
    fn render_failure(&self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        panic::catch_unwind(AssertUnwindSafe(|| {
            self.render_error(status, Response::default())
        }))
        .unwrap_or_else(|_| {
            tracing::error!("Error renderer panicked while rendering the 500 page");
            Response::new(status, format!("Error {}", status.as_u16()))
        })
    }

    fn render_error(&self, status: StatusCode, mut response: Response) -> Response {
        let code = status.as_u16();
        response.status = status;
        response.body = self
            .context
            .views
            .render_error(code)
            .unwrap_or_else(|| format!("Error {}", code));
        response
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Application;

    #[test]
    fn test_unknown_method_is_not_found() {
        let mut app = Application::new(AppContext::default());
        app.router()
            .get("/", Handler::inline(|_, _| Ok("home".into())))
            .unwrap();
        let dispatcher = app.build().unwrap();

        let res = dispatcher.dispatch(Request::new("BREW", "/"));
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body, "Error 404");
    }

    #[test]
    fn test_panic_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
