//! Application bootstrap.
//!
//! # Responsibilities
//! - Collect route registrations, controllers and middleware
//! - Install global middleware in `use` order
//! - Freeze everything into a [`Dispatcher`], checking every reference
//!
//! # Design Decisions
//! - `build` consumes the application, so nothing can be registered once
//!   requests are being served
//! - Dangling references (unknown middleware id, controller or action)
//!   fail startup instead of surfacing as 500s later

use std::sync::Arc;

use thiserror::Error;

use crate::app::context::AppContext;
use crate::app::controller::{Controller, ControllerRegistry};
use crate::http::dispatcher::Dispatcher;
use crate::http::middleware::{Middleware, MiddlewareChain, MiddlewareRegistry};
use crate::routing::{Handler, PatternError, RouteTableBuilder};
use crate::services::SessionMiddleware;

/// Startup failures. All are fatal.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("route `{route}` references unknown middleware `{name}`")]
    UnknownMiddleware { route: String, name: String },

    #[error("route `{route}` references unregistered controller `{controller}`")]
    UnknownController { route: String, controller: String },

    #[error("route `{route}` references missing action `{controller}@{action}`")]
    UnknownAction {
        route: String,
        controller: String,
        action: String,
    },
}

pub struct Application {
    context: Arc<AppContext>,
    routes: RouteTableBuilder,
    global: Vec<Arc<dyn Middleware>>,
    named: MiddlewareRegistry,
    controllers: ControllerRegistry,
}

impl Application {
    pub fn new(context: AppContext) -> Self {
        Self {
            context: Arc::new(context),
            routes: RouteTableBuilder::new(),
            global: Vec::new(),
            named: MiddlewareRegistry::new(),
            controllers: ControllerRegistry::new(),
        }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.context
    }

    /// Append a global middleware. Global middleware runs in `use` order,
    /// before route matching.
    pub fn use_middleware<M>(&mut self, middleware: M) -> &mut Self
    where
        M: Middleware + 'static,
    {
        tracing::debug!(middleware = middleware.name(), "Installing global middleware");
        self.global.push(Arc::new(middleware));
        self
    }

    /// Install the session middleware backed by the context's store.
    pub fn use_sessions(&mut self) -> &mut Self {
        let middleware = SessionMiddleware::new(
            Arc::clone(&self.context.sessions),
            self.context.session_cookie.clone(),
        );
        self.use_middleware(middleware)
    }

    /// Make `middleware` available to routes under `id`.
    pub fn middleware<M>(&mut self, id: &str, middleware: M) -> &mut Self
    where
        M: Middleware + 'static,
    {
        self.named.register(id, Arc::new(middleware));
        self
    }

    pub fn controller<C>(&mut self, id: &str, controller: C) -> &mut Self
    where
        C: Controller + 'static,
    {
        self.controllers.register(id, Arc::new(controller));
        self
    }

    pub fn router(&mut self) -> &mut RouteTableBuilder {
        &mut self.routes
    }

    /// Freeze the application into a dispatcher.
    pub fn build(self) -> Result<Dispatcher, BuildError> {
        let table = self.routes.build();
        let mut route_chains = Vec::with_capacity(table.len());

        for route in table.routes() {
            let chain = self
                .named
                .resolve(route.middleware())
                .map_err(|name| BuildError::UnknownMiddleware {
                    route: route.to_string(),
                    name,
                })?;
            route_chains.push(chain);

            if let Handler::Action { controller, action } = route.handler() {
                let target = self.controllers.get(controller).ok_or_else(|| {
                    BuildError::UnknownController {
                        route: route.to_string(),
                        controller: controller.clone(),
                    }
                })?;
                if !target.actions().contains(&action.as_str()) {
                    return Err(BuildError::UnknownAction {
                        route: route.to_string(),
                        controller: controller.clone(),
                        action: action.clone(),
                    });
                }
            }
        }

        tracing::info!(
            routes = table.len(),
            global_middleware = self.global.len(),
            "Application routes frozen"
        );

        Ok(Dispatcher::new(
            Arc::new(table),
            MiddlewareChain::new(self.global),
            route_chains,
            self.controllers,
            self.context,
        ))
    }
}
