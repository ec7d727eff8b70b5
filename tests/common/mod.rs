//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::error::Error;
use std::sync::{Arc, Mutex};

use corex::services::{ErrorLogger, ErrorRenderer, StaticErrorPages};
use corex::{AppContext, Application, Controller, HandlerError, HandlerResult, Request};

/// Captures every logged failure.
#[derive(Default)]
pub struct RecordingLogger {
    pub entries: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

impl ErrorLogger for RecordingLogger {
    fn log_error(&self, error: &dyn Error) {
        self.entries.lock().unwrap().push(error.to_string());
    }
}

/// A logger that always panics.
pub struct PanickingLogger;

impl ErrorLogger for PanickingLogger {
    fn log_error(&self, _error: &dyn Error) {
        panic!("logger exploded");
    }
}

/// A renderer that always panics.
pub struct PanickingRenderer;

impl ErrorRenderer for PanickingRenderer {
    fn render_error(&self, _code: u16) -> Option<String> {
        panic!("renderer exploded");
    }
}

/// Echoes `Controller@action:arg,arg` for every action.
pub struct EchoController {
    pub name: &'static str,
    pub actions: &'static [&'static str],
}

impl Controller for EchoController {
    fn actions(&self) -> &[&'static str] {
        self.actions
    }

    fn call(&self, action: &str, _request: &Request, args: &[&str]) -> HandlerResult {
        if !self.actions.contains(&action) {
            return Err(HandlerError::UnknownAction {
                controller: self.name.to_string(),
                action: action.to_string(),
            });
        }
        Ok(format!("{}@{}:{}", self.name, action, args.join(",")))
    }
}

pub const RESOURCE: &[&str] = &["index", "create", "store", "show", "edit", "update", "destroy"];

/// An application whose failures land in the returned logger.
pub fn app_with_logger() -> (Application, Arc<RecordingLogger>) {
    let logger = Arc::new(RecordingLogger::default());
    let context = AppContext {
        logger: logger.clone(),
        ..AppContext::default()
    };
    (Application::new(context), logger)
}

/// Like [`app_with_logger`], with in-memory 404 and 500 pages.
pub fn app_with_pages() -> (Application, Arc<RecordingLogger>) {
    let logger = Arc::new(RecordingLogger::default());
    let context = AppContext {
        logger: logger.clone(),
        views: Arc::new(
            StaticErrorPages::new()
                .with_page(404, "<h1>Not Found</h1>")
                .with_page(500, "<h1>Server Error</h1>"),
        ),
        ..AppContext::default()
    };
    (Application::new(context), logger)
}
