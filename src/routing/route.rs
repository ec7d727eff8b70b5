//! Route definitions.
//!
//! A [`Route`] is one method + pattern + handler + middleware registration.
//! Routes are immutable once the table is frozen.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::http::Request;
use crate::routing::pattern::RoutePattern;

/// The fixed set of HTTP verbs the router accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported HTTP method `{0}`")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// Failure raised by middleware or a handler while serving a request.
///
/// Never shown to the client; the dispatcher logs it and renders a 500.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error("controller `{controller}` has no action `{action}`")]
    UnknownAction { controller: String, action: String },

    #[error("controller `{0}` is not registered")]
    UnknownController(String),

    #[error("middleware `{name}` failed: {reason}")]
    Middleware { name: String, reason: String },

    #[error("panicked: {0}")]
    Panicked(String),
}

impl From<String> for HandlerError {
    fn from(msg: String) -> Self {
        HandlerError::Failed(msg)
    }
}

impl From<&str> for HandlerError {
    fn from(msg: &str) -> Self {
        HandlerError::Failed(msg.to_string())
    }
}

/// Result of invoking a handler: the response body.
pub type HandlerResult = Result<String, HandlerError>;

type InlineFn = dyn Fn(&Request, &RouteParams) -> HandlerResult + Send + Sync;

/// The target of a route.
#[derive(Clone)]
pub enum Handler {
    /// A closure invoked with the bound params.
    Inline(Arc<InlineFn>),
    /// A `(controller, action)` pair resolved through the controller registry.
    Action { controller: String, action: String },
}

impl Handler {
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(&Request, &RouteParams) -> HandlerResult + Send + Sync + 'static,
    {
        Handler::Inline(Arc::new(f))
    }

    pub fn action(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Handler::Action {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Inline(_) => f.write_str("Inline(<closure>)"),
            Handler::Action { controller, action } => {
                write!(f, "Action({}@{})", controller, action)
            }
        }
    }
}

/// Index of a route in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(pub usize);

/// A frozen route registration.
#[derive(Debug)]
pub struct Route {
    pub(crate) id: RouteId,
    pub(crate) methods: Vec<Method>,
    pub(crate) pattern: RoutePattern,
    pub(crate) handler: Handler,
    pub(crate) middleware: Vec<String>,
}

impl Route {
    pub fn id(&self) -> RouteId {
        self.id
    }

    /// Methods this route answers. More than one only for resource updates.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Per-route middleware identifiers, in registration order.
    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(method.as_str())?;
        }
        write!(f, " {}", self.pattern)
    }
}

/// Parameters bound by a successful match, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    pairs: Vec<(String, String)>,
}

impl RouteParams {
    pub(crate) fn push(&mut self, name: &str, value: &str) {
        self.pairs.push((name.to_string(), value.to_string()));
    }

    /// Get a parameter value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Values in the order their captures appear in the pattern.
    pub fn positional(&self) -> Vec<&str> {
        self.pairs.iter().map(|(_, v)| v.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Index<&str> for RouteParams {
    type Output = str;

    fn index(&self, name: &str) -> &str {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no route parameter named `{}`", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("delete".parse::<Method>().unwrap(), Method::Delete);
        assert_eq!(
            "TRACE".parse::<Method>().unwrap_err(),
            UnknownMethod("TRACE".into())
        );
    }

    #[test]
    fn test_params_order_and_lookup() {
        let mut params = RouteParams::default();
        params.push("postId", "7");
        params.push("commentId", "3");

        assert_eq!(params.get("postId"), Some("7"));
        assert_eq!(&params["commentId"], "3");
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.positional(), vec!["7", "3"]);
    }

    #[test]
    fn test_handler_error_conversions() {
        let err: HandlerError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }
}
