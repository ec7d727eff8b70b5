//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with a single fallback handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Extract method, path and headers into a dispatcher [`Request`]
//! - Run the dispatcher on the blocking pool and write its response
//! - Periodically purge expired sessions and cache entries

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request as HttpRequest, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response as HttpResponse},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::dispatcher::Dispatcher;
use crate::http::{Request, Response};
use crate::lifecycle::shutdown::wait as wait_for_shutdown;

/// HTTP hosting layer for a frozen application.
pub struct HttpServer {
    router: Router,
    dispatcher: Arc<Dispatcher>,
    purge_interval: Duration,
}

impl HttpServer {
    pub fn new(dispatcher: Arc<Dispatcher>, config: &ServerConfig) -> Self {
        let router = Self::build_router(Arc::clone(&dispatcher), config);
        Self {
            router,
            dispatcher,
            purge_interval: Duration::from_secs(config.purge_interval_secs.max(1)),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(dispatcher: Arc<Dispatcher>, config: &ServerConfig) -> Router {
        Router::new()
            .fallback(host_handler)
            .with_state(dispatcher)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The Axum router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.dispatcher.routes().len(),
            "HTTP server starting"
        );

        let purge = spawn_purge_task(
            Arc::clone(&self.dispatcher),
            self.purge_interval,
            shutdown.resubscribe(),
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        purge.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Hand every request to the dispatcher.
async fn host_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    request: HttpRequest,
) -> HttpResponse {
    let request = to_dispatch_request(&request);
    match tokio::task::spawn_blocking(move || dispatcher.dispatch(request)).await {
        Ok(response) => into_http_response(response),
        Err(e) => {
            tracing::error!(error = %e, "Dispatch task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error 500").into_response()
        }
    }
}

fn to_dispatch_request(request: &HttpRequest) -> Request {
    let mut out = Request::new(request.method().as_str(), request.uri().path());
    for (name, value) in request.headers() {
        if let Ok(value) = value.to_str() {
            out.set_header(name.as_str(), value);
        }
    }
    out
}

fn into_http_response(response: Response) -> HttpResponse {
    let Response {
        status,
        headers,
        body,
    } = response;

    let mut out = HttpResponse::new(Body::from(body));
    *out.status_mut() = status;
    let out_headers = out.headers_mut();
    for (name, value) in &headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                out_headers.append(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
    }
    if !out_headers.contains_key(header::CONTENT_TYPE) {
        out_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
    }
    out
}

fn spawn_purge_task(
    dispatcher: Arc<Dispatcher>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let context = dispatcher.context();
                    let sessions = context.sessions.purge_expired();
                    let entries = context.cache.purge_expired();
                    if sessions + entries > 0 {
                        tracing::debug!(sessions, entries, "Purged expired state");
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    })
}
