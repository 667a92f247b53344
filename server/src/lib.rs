//! HTTP API for the Tabas marketplace demo: users, posts and a health probe
//! over in-memory repositories.
//!
//! `app()` builds a router with fresh seeded state; `router(state)` accepts
//! injected repositories; `run` serves a router on a bound listener.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

use axum::{middleware::from_fn, middleware::from_fn_with_state, routing::get, Router};
use tokio::net::TcpListener;

pub use config::{Environment, LogFormat, ServerConfig};
pub use error::ApiError;
pub use models::{Health, Message, Post, RootDocument, User};
pub use state::AppState;
pub use store::{InMemoryRepository, Record, Repository};

/// Router over seeded in-memory state with default configuration.
pub fn app() -> Router {
    router(AppState::seeded(ServerConfig::default()))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/api/health", get(routes::health))
        .route("/api/users", get(routes::list_users).post(routes::create_user))
        .route("/api/users/{id}", get(routes::get_user))
        .route("/api/posts", get(routes::list_posts).post(routes::create_post))
        .route("/api/posts/{id}", get(routes::get_post))
        .fallback(routes::not_found)
        .layer(from_fn(middleware::catch_panic))
        .layer(from_fn_with_state(state.clone(), middleware::cors))
        .layer(from_fn(middleware::security_headers))
        .layer(from_fn(middleware::trace))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}
