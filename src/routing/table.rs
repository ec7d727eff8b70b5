//! Route registration and lookup.
//!
//! # Responsibilities
//! - Compile patterns as routes are registered
//! - Expand resource declarations into the seven CRUD routes
//! - Freeze into an immutable [`RouteTable`] indexed by method
//! - Look up the first matching route for a request
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Registration order is the only precedence rule; no specificity scoring
//! - Explicit no-match (`None`) rather than a silent default

use std::collections::HashMap;
use std::sync::Arc;

use crate::routing::matcher::{first_match, match_pattern, MatchResult, RequestPath};
use crate::routing::pattern::{PatternError, RoutePattern};
use crate::routing::route::{Handler, Method, Route, RouteId};

/// Where a resource route sits relative to the resource base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResourcePath {
    Collection,
    Create,
    Member,
    Edit,
}

/// One row of the resource expansion table.
#[derive(Debug, Clone, Copy)]
pub struct ResourceAction {
    pub methods: &'static [Method],
    path: ResourcePath,
    pub action: &'static str,
}

impl ResourceAction {
    fn pattern(&self, base: &str, param: &str) -> String {
        match self.path {
            ResourcePath::Collection => format!("/{}", base),
            ResourcePath::Create => format!("/{}/create", base),
            ResourcePath::Member => format!("/{}/{{{}}}", base, param),
            ResourcePath::Edit => format!("/{}/{{{}}}/edit", base, param),
        }
    }
}

/// The conventional resource routes, in registration order.
///
/// `create` and `edit` precede the member route so their literal segments
/// win over the capture at the same position.
pub const RESOURCE_ACTIONS: [ResourceAction; 7] = [
    ResourceAction {
        methods: &[Method::Get],
        path: ResourcePath::Collection,
        action: "index",
    },
    ResourceAction {
        methods: &[Method::Get],
        path: ResourcePath::Create,
        action: "create",
    },
    ResourceAction {
        methods: &[Method::Post],
        path: ResourcePath::Collection,
        action: "store",
    },
    ResourceAction {
        methods: &[Method::Get],
        path: ResourcePath::Member,
        action: "show",
    },
    ResourceAction {
        methods: &[Method::Get],
        path: ResourcePath::Edit,
        action: "edit",
    },
    ResourceAction {
        methods: &[Method::Put, Method::Patch],
        path: ResourcePath::Member,
        action: "update",
    },
    ResourceAction {
        methods: &[Method::Delete],
        path: ResourcePath::Member,
        action: "destroy",
    },
];

/// Mutable route registration, used only during bootstrap.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route for one method.
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Handler,
        middleware: &[&str],
    ) -> Result<&mut Self, PatternError> {
        self.route(&[method], pattern, handler, middleware)
    }

    /// Register one route answering several methods.
    pub fn route(
        &mut self,
        methods: &[Method],
        pattern: &str,
        handler: Handler,
        middleware: &[&str],
    ) -> Result<&mut Self, PatternError> {
        let pattern = RoutePattern::compile(pattern)?;
        let id = RouteId(self.routes.len());
        tracing::trace!(route = id.0, pattern = %pattern, ?methods, "Registering route");
        self.routes.push(Route {
            id,
            methods: methods.to_vec(),
            pattern,
            handler,
            middleware: middleware.iter().map(|m| m.to_string()).collect(),
        });
        Ok(self)
    }

    pub fn get(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, PatternError> {
        self.register(Method::Get, pattern, handler, &[])
    }

    pub fn post(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, PatternError> {
        self.register(Method::Post, pattern, handler, &[])
    }

    pub fn put(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, PatternError> {
        self.register(Method::Put, pattern, handler, &[])
    }

    pub fn patch(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, PatternError> {
        self.register(Method::Patch, pattern, handler, &[])
    }

    pub fn delete(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, PatternError> {
        self.register(Method::Delete, pattern, handler, &[])
    }

    /// Expand `base` into the seven conventional CRUD routes on `controller`,
    /// capturing the member id as `id`.
    pub fn resource(&mut self, base: &str, controller: &str) -> Result<&mut Self, PatternError> {
        self.resource_with_param(base, "id", controller)
    }

    /// Like [`resource`](Self::resource) with a custom member capture name.
    pub fn resource_with_param(
        &mut self,
        base: &str,
        param: &str,
        controller: &str,
    ) -> Result<&mut Self, PatternError> {
        let base = base.trim_matches('/');
        for entry in &RESOURCE_ACTIONS {
            self.route(
                entry.methods,
                &entry.pattern(base, param),
                Handler::action(controller, entry.action),
                &[],
            )?;
        }
        Ok(self)
    }

    /// Number of routes registered so far.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze the registrations.
    pub fn build(self) -> RouteTable {
        let routes: Vec<Arc<Route>> = self.routes.into_iter().map(Arc::new).collect();
        let mut by_method: HashMap<Method, Vec<Arc<Route>>> = HashMap::new();
        for route in &routes {
            for method in route.methods() {
                by_method.entry(*method).or_default().push(Arc::clone(route));
            }
        }
        RouteTable { routes, by_method }
    }
}

/// Immutable route table, shared read-only by every request.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
    by_method: HashMap<Method, Vec<Arc<Route>>>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    /// Find the first route registered for `method` whose pattern matches `path`.
    pub fn match_route(&self, method: Method, path: &str) -> Option<MatchResult> {
        let routes = self.by_method.get(&method)?;
        first_match(routes, &RequestPath::parse(path))
    }

    /// Methods with at least one route matching `path`.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let path = RequestPath::parse(path);
        let mut methods: Vec<Method> = self
            .routes
            .iter()
            .filter(|route| match_pattern(route.pattern(), &path).is_some())
            .flat_map(|route| route.methods().iter().copied())
            .collect();
        methods.sort();
        methods.dedup();
        methods
    }

    /// All routes in registration order.
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn get(&self, id: RouteId) -> Option<&Arc<Route>> {
        self.routes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
