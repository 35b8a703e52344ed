//! HTTP API server

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::config::{AuthConfig, Config};
use crate::error::Result;
use crate::store::Stores;

use super::routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(stores: Stores, auth: AuthConfig) -> Self {
        Self { stores, auth }
    }
}

/// Run the HTTP API server
pub async fn run_server(config: Config) -> Result<()> {
    let stores = Stores::connect(&config.database).await?;
    let state = AppState::new(stores, config.auth.clone());

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    serve(listener, state).await
}

/// Serve the API on an already-bound listener
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let guard = middleware::from_fn_with_state(state.clone(), require_auth);

    // A method router's route_layer only wraps the methods registered before it,
    // so protected methods come first and public ones are chained afterwards.
    Router::new()
        .route("/", get(routes::welcome))
        .route("/health", get(routes::health))
        .route(
            "/users",
            get(routes::current_user)
                .route_layer(guard.clone())
                .post(routes::register_user),
        )
        .route(
            "/courses",
            post(routes::create_course)
                .route_layer(guard.clone())
                .get(routes::list_courses),
        )
        .route(
            "/courses/{id}",
            post(routes::update_course)
                .put(routes::update_course)
                .delete(routes::delete_course)
                .route_layer(guard)
                .get(routes::get_course),
        )
        .fallback(routes::route_not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
