//! HTTP API for the tournament server.
//!
//! # Endpoints
//!
//! ```text
//! GET  /health                                  - Server health status (public)
//! GET  /api/v1/tournaments                      - List tournaments
//! POST /api/v1/tournaments                      - Create tournament
//! GET  /api/v1/tournaments/{id}                 - Tournament detail (teams + pools)
//! POST /api/v1/tournaments/{id}/teams           - Register a team
//! POST /api/v1/teams/{team_id}/participants     - Add a participant to a team
//! POST /api/v1/tournaments/{id}/make_pools      - Rebuild the tournament's pools
//! ```
//!
//! Routes are versioned under `/api/v1` so the surface can evolve
//! without breaking existing clients. All responses are JSON; errors
//! use the [`tournaments::ErrorResponse`] envelope.

pub mod request_id;
pub mod tournaments;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use poomsae_tournament::TournamentManager;
use poomsae_tournament::db::Database;
use serde_json::json;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; both fields are cheap `Arc` handles. `database`
/// is `None` when the server runs on the in-memory repository, in which
/// case the health check skips the connectivity probe.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<TournamentManager>,
    pub database: Option<Arc<Database>>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route("/tournaments/{tournament_id}", get(tournaments::get_tournament))
        .route(
            "/tournaments/{tournament_id}/teams",
            post(tournaments::register_team),
        )
        .route(
            "/tournaments/{tournament_id}/make_pools",
            post(tournaments::make_pools),
        )
        .route(
            "/teams/{team_id}/participants",
            post(tournaments::add_participant),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the storage backend is reachable, else
/// `503 Service Unavailable`.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match &state.database {
        Some(database) => database.health_check().await.is_ok(),
        // In-memory mode has no connection to lose.
        None => true,
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
