//! Controllers and the controller registry.
//!
//! A controller exposes a fixed list of action names and dispatches on the
//! action explicitly; there is no runtime reflection. Route params reach the
//! action positionally, in the order their captures appear in the pattern.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::http::Request;
use crate::routing::HandlerResult;

pub trait Controller: Send + Sync {
    /// Actions this controller answers. Checked against routes at startup.
    fn actions(&self) -> &[&'static str];

    /// Invoke `action` with the route params in pattern order.
    fn call(&self, action: &str, request: &Request, args: &[&str]) -> HandlerResult;
}

/// Controllers available to `(controller, action)` routes.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, controller: Arc<dyn Controller>) {
        self.controllers.insert(id.into(), controller);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Controller>> {
        self.controllers.get(id)
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.controllers.keys().collect();
        ids.sort();
        f.debug_set().entries(ids).finish()
    }
}
