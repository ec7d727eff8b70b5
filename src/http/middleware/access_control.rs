//! Access control middleware.
//! Enforces that the request's session carries an authenticated user.

use axum::http::StatusCode;

use crate::http::middleware::{Decision, Middleware};
use crate::http::{Request, Response};
use crate::routing::HandlerError;

/// Short-circuits requests whose session lacks `key`.
///
/// Needs the session middleware to run earlier in the pipeline.
#[derive(Debug, Clone)]
pub struct RequireSession {
    key: String,
    redirect_to: Option<String>,
}

impl RequireSession {
    /// Deny with `401 Unauthorized` when `key` is missing.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            redirect_to: None,
        }
    }

    /// Redirect to `location` instead of denying.
    pub fn redirect_to(mut self, location: impl Into<String>) -> Self {
        self.redirect_to = Some(location.into());
        self
    }
}

impl Middleware for RequireSession {
    fn name(&self) -> &str {
        "require_session"
    }

    fn handle(
        &self,
        request: &mut Request,
        _response: &mut Response,
    ) -> Result<Decision, HandlerError> {
        let session = request
            .session
            .as_ref()
            .ok_or_else(|| HandlerError::Middleware {
                name: self.name().to_string(),
                reason: "no session attached to request".to_string(),
            })?;

        if session.get(&self.key).is_some() {
            return Ok(Decision::Continue);
        }

        tracing::warn!(path = request.path(), key = %self.key, "Access denied: not authenticated");
        let response = match &self.redirect_to {
            Some(location) => Response::redirect(location),
            None => Response::new(StatusCode::UNAUTHORIZED, "Unauthorized"),
        };
        Ok(Decision::ShortCircuit(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::SessionStore;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_denies_without_key() {
        let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
        let mut req = Request::new("GET", "/dashboard");
        req.session = Some(store.start(None));

        let decision = RequireSession::new("user_id")
            .handle(&mut req, &mut Response::default())
            .unwrap();
        match decision {
            Decision::ShortCircuit(res) => assert_eq!(res.status, StatusCode::UNAUTHORIZED),
            Decision::Continue => panic!("expected short-circuit"),
        }
    }

    #[test]
    fn test_redirects_when_configured() {
        let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
        let mut req = Request::new("GET", "/dashboard");
        req.session = Some(store.start(None));

        let decision = RequireSession::new("user_id")
            .redirect_to("/login")
            .handle(&mut req, &mut Response::default())
            .unwrap();
        assert_eq!(decision, Decision::ShortCircuit(Response::redirect("/login")));
    }

    #[test]
    fn test_allows_with_key() {
        let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
        let session = store.start(None);
        session.set("user_id", 7.into());
        let mut req = Request::new("GET", "/dashboard");
        req.session = Some(session);

        let decision = RequireSession::new("user_id")
            .handle(&mut req, &mut Response::default())
            .unwrap();
        assert_eq!(decision, Decision::Continue);
    }

    #[test]
    fn test_fails_without_session_middleware() {
        let err = RequireSession::new("user_id")
            .handle(&mut Request::new("GET", "/"), &mut Response::default())
            .unwrap_err();
        assert!(matches!(err, HandlerError::Middleware { .. }));
    }
}
