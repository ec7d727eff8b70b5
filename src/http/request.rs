//! Request representation handed to the dispatcher.
//!
//! # Responsibilities
//! - Carry the method and path already extracted by the hosting layer
//! - Expose headers and cookies to middleware and handlers
//! - Carry the request ID and the session attached by middleware
//!
//! # Design Decisions
//! - Header names are stored lowercase
//! - The method is kept as the raw string; unknown verbs simply never match

use std::collections::HashMap;

use crate::routing::route::{Method, UnknownMethod};
use crate::services::session::Session;

pub const X_REQUEST_ID: &str = "x-request-id";

/// One incoming request. Created per request and never shared.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    /// Session attached by the session middleware.
    pub session: Option<Session>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn parsed_method(&self) -> Result<Method, UnknownMethod> {
        self.method.parse()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }

    /// Look up a cookie from the `Cookie` header.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie")?.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then_some(value)
        })
    }
}
