//! anki-export-devproxy: development server for the anki-export web app.
//!
//! Serves the built web app from a static directory and forwards every
//! request under the export endpoint to the separately run backend
//! (by default `/api/anki-export` -> `http://localhost:9000`), so the
//! page and the API share one origin during local development.
//!
//! ```text
//! browser --> devproxy --+-- /api/anki-export* --> backend (forwarded verbatim)
//!                        +-- everything else   --> static_dir (index.html fallback)
//! ```

pub mod config;
pub mod errors;
pub mod proxy;
pub mod telemetry;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::{Args, Config, ConfigError, ProxyRoute};
pub use errors::ProxyError;
pub use proxy::{Route, RouteTable};

/// Shared state of the request handler.
#[derive(Clone)]
pub struct AppState {
    routes: Arc<RouteTable>,
    client: reqwest::Client,
    assets: ServeDir<ServeFile>,
}

impl AppState {
    /// Build the handler state from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &Config, routes: RouteTable) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(ProxyError::Client)?;

        let index = config.static_dir.join("index.html");
        let assets = ServeDir::new(&config.static_dir).fallback(ServeFile::new(index));

        Ok(Self {
            routes: Arc::new(routes),
            client,
            assets,
        })
    }
}

/// Forward matching requests, serve static files for the rest.
async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let route = state.routes.find(request.uri().path()).cloned();

    match route {
        Some(route) => proxy::forward(&state.client, &route, request)
            .await
            .unwrap_or_else(IntoResponse::into_response),
        None => match state.assets.oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        },
    }
}

/// Build the application router.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidRoute`] for a malformed route, or
/// [`ProxyError::Client`] (wrapped) if the HTTP client cannot be built.
pub fn build_router(config: &Config) -> anyhow::Result<Router> {
    let routes = config.route_table()?;
    let state = AppState::new(config, routes)?;

    Ok(Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http()))
}

/// Bind `config.listen` and serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the router cannot be built, the address cannot
/// be bound, or the server fails.
pub async fn serve(
    config: Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let router = build_router(&config)?;
    let listener = TcpListener::bind(config.listen).await?;

    info!(
        listen = %listener.local_addr()?,
        static_dir = %config.static_dir.display(),
        "development server listening"
    );
    for route in &config.routes {
        info!(prefix = %route.prefix, target = %route.target, "forwarding");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("development server stopped");
    Ok(())
}
