//! Tournament API handlers.
//!
//! Registration endpoints plus the pool build. The build endpoint
//! replaces the tournament's pool set wholesale; on any failure nothing
//! is persisted and the previous pools remain in place.
//!
//! # Examples
//!
//! Create a tournament:
//! ```bash
//! curl -X POST http://localhost:7788/api/v1/tournaments \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Spring Open", "tournament_start": "2026-04-18T09:00:00Z"}'
//! ```
//!
//! Register a solo team and build pools:
//! ```bash
//! curl -X POST http://localhost:7788/api/v1/tournaments/1/teams \
//!   -H "Content-Type: application/json" \
//!   -d '{"participants": [{"name": "Yuna", "belt_grade": "RE", "sex": "F", "birthdate": "2004-02-11"}]}'
//! curl -X POST http://localhost:7788/api/v1/tournaments/1/make_pools
//! ```

use std::time::Instant;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use poomsae_tournament::rules::BuildError;
use poomsae_tournament::tournament::models::{
    NewParticipant, NewTeam, NewTournament, Participant, Team, TeamId, Tournament,
    TournamentDetail, TournamentId,
};
use poomsae_tournament::TournamentError;

use super::AppState;
use crate::metrics;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a domain error onto an HTTP status and error envelope.
///
/// Unknown tournaments and teams are client lookup errors; build
/// failures are validation errors against the registered data; anything
/// from the database is a server error.
fn error_response(err: TournamentError) -> ApiError {
    let status = match &err {
        TournamentError::NotFound(_) | TournamentError::TeamNotFound(_) => StatusCode::NOT_FOUND,
        TournamentError::Build(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TournamentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// List all tournaments, most recently created first.
pub async fn list_tournaments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Tournament>>, ApiError> {
    state
        .manager
        .list_tournaments()
        .await
        .map(Json)
        .map_err(error_response)
}

/// Create a tournament.
pub async fn create_tournament(
    State(state): State<AppState>,
    Json(request): Json<NewTournament>,
) -> Result<(StatusCode, Json<Tournament>), ApiError> {
    state
        .manager
        .create_tournament(request)
        .await
        .map(|tournament| (StatusCode::CREATED, Json(tournament)))
        .map_err(error_response)
}

/// Get a tournament with its teams and pools.
///
/// # Errors
///
/// - `404 Not Found`: tournament doesn't exist
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentDetail>, ApiError> {
    state
        .manager
        .get_tournament(tournament_id)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Register a team, optionally with its initial participants.
///
/// # Errors
///
/// - `404 Not Found`: tournament doesn't exist
/// - `422 Unprocessable Entity`: a participant carries an unknown belt
///   grade code
pub async fn register_team(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<NewTeam>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    state
        .manager
        .register_team(tournament_id, request)
        .await
        .map(|team| (StatusCode::CREATED, Json(team)))
        .map_err(error_response)
}

/// Add a participant to an existing team.
///
/// # Errors
///
/// - `404 Not Found`: team doesn't exist
/// - `422 Unprocessable Entity`: unknown belt grade code
pub async fn add_participant(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
    Json(request): Json<NewParticipant>,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    state
        .manager
        .add_participant(team_id, request)
        .await
        .map(|participant| (StatusCode::CREATED, Json(participant)))
        .map_err(error_response)
}

/// Rebuild the tournament's pools from its current registrations.
///
/// Assignment is all-or-nothing: either every team ends up in exactly
/// one pool and the previous pool set is replaced, or nothing changes.
///
/// # Errors
///
/// - `404 Not Found`: tournament doesn't exist
/// - `422 Unprocessable Entity`: a team has no participants, or a
///   participant carries an unrecognized belt grade
pub async fn make_pools(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentDetail>, ApiError> {
    let start = Instant::now();

    match state.manager.make_pools(tournament_id).await {
        Ok(detail) => {
            metrics::pool_builds_total();
            metrics::teams_assigned_total(detail.teams.len());
            metrics::pool_build_duration_ms(start.elapsed().as_secs_f64() * 1000.0);
            tracing::info!(
                tournament_id,
                pools = detail.pools.len(),
                teams = detail.teams.len(),
                "Pool build completed"
            );
            Ok(Json(detail))
        }
        Err(err) => {
            let reason = match &err {
                TournamentError::Build(BuildError::EmptyTeam(_)) => "empty_team",
                TournamentError::Build(BuildError::UnknownGrade(_)) => "unknown_grade",
                TournamentError::NotFound(_) => "not_found",
                _ => "other",
            };
            metrics::pool_build_failures_total(reason);
            tracing::warn!(tournament_id, reason, error = %err, "Pool build aborted");
            Err(error_response(err))
        }
    }
}
