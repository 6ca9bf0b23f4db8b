//! htmx todo server.
//!
//! # Overview
//! Two pages, each answered by a [`Dispatcher`]: the todo list at `/todos`
//! and a visit counter at every other path. Neither page registers routes.
//! A request is reduced to a route identifier (method, `HX-Request`, query
//! parameter names) and the page's template definition with that name
//! renders the response. Static files are served from `/static/`.
//!
//! # Design
//! - The store is opened once in `main` and handed to [`AppState::new`];
//!   nothing reaches storage except through [`templates::Ops`].
//! - Template sets are parsed once at startup and immutable afterwards.
//! - [`run`] serves until Ctrl-C or SIGTERM, then drains in-flight requests.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod form;
pub mod pages;
pub mod route;
pub mod templates;

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use todo_core::Store;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::Error;
use templates::{Ops, TemplateError};

/// Both page dispatchers, shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<Dispatcher>,
    pub todos: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(store: Store) -> Result<Self, TemplateError> {
        let ops = Ops::new(store);
        Ok(Self {
            index: Arc::new(Dispatcher::from_sources("index", &pages::INDEX, ops.clone())?),
            todos: Arc::new(Dispatcher::from_sources("todos", &pages::TODOS, ops)?),
        })
    }
}

pub fn app(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/todos", any(todos_page))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .fallback(index_page)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` on `listener` until a shutdown signal arrives.
pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn todos_page(State(state): State<AppState>, request: Request) -> Response {
    state.todos.handle(request).await
}

async fn index_page(State(state): State<AppState>, request: Request) -> Response {
    state.index.handle(request).await
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received, draining connections");
}
