//! Tournament manager: registration and the pool build.

use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

use crate::db::repository::TournamentRepository;
use crate::rules::classes::BeltGrade;
use crate::rules::pools::{self, BuildError};
use crate::tournament::models::{
    NewParticipant, NewTeam, NewTournament, Participant, Team, TeamId, Tournament,
    TournamentDetail, TournamentId,
};

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("team not found: {0}")]
    TeamNotFound(TeamId),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type TournamentResult<T> = Result<T, TournamentError>;

/// Registration and pool-build service over a [`TournamentRepository`].
///
/// The manager keeps the pure rules core and the storage collaborator
/// apart: `make_pools` computes the partition in memory and hands the
/// finished result to the repository's transactional replace-all.
#[derive(Clone)]
pub struct TournamentManager {
    repo: Arc<dyn TournamentRepository>,
}

impl TournamentManager {
    pub fn new(repo: Arc<dyn TournamentRepository>) -> Self {
        Self { repo }
    }

    /// Create a new tournament.
    pub async fn create_tournament(&self, new: NewTournament) -> TournamentResult<Tournament> {
        let tournament = self.repo.create_tournament(&new).await?;
        info!("created tournament {} ({})", tournament.id, tournament.name);
        Ok(tournament)
    }

    /// List all tournaments, most recently created first.
    pub async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        self.repo.list_tournaments().await
    }

    /// Get a tournament with its teams and pools.
    pub async fn get_tournament(&self, id: TournamentId) -> TournamentResult<TournamentDetail> {
        self.repo.get_tournament(id).await
    }

    /// Register a team, optionally with its initial roster.
    pub async fn register_team(
        &self,
        tournament_id: TournamentId,
        new: NewTeam,
    ) -> TournamentResult<Team> {
        for participant in &new.participants {
            validate_grade(&participant.belt_grade)?;
        }
        let team = self.repo.create_team(tournament_id, &new).await?;
        debug!(
            "registered team {} with {} participant(s) in tournament {}",
            team.id,
            team.participants.len(),
            tournament_id
        );
        Ok(team)
    }

    /// Add a participant to an existing team.
    pub async fn add_participant(
        &self,
        team_id: TeamId,
        new: NewParticipant,
    ) -> TournamentResult<Participant> {
        validate_grade(&new.belt_grade)?;
        self.repo.create_participant(team_id, &new).await
    }

    /// Rebuild the tournament's pools from its current teams.
    ///
    /// Loads the team snapshot, runs the pure pool build, and commits the
    /// partition via the repository's transactional replace-all. On any
    /// failure, previously persisted pools are left untouched. Returns
    /// the refreshed tournament state.
    pub async fn make_pools(&self, id: TournamentId) -> TournamentResult<TournamentDetail> {
        let teams = self.repo.load_team_snapshots(id).await?;
        let partition = pools::build_pools(&teams)?;
        info!(
            "assigning {} team(s) of tournament {} into {} pool(s)",
            partition.team_count(),
            id,
            partition.len()
        );
        self.repo.replace_pools(id, &partition).await?;
        self.repo.get_tournament(id).await
    }
}

/// Registration-time check that a grade code is part of the grade table.
/// The build re-parses from storage, so corrupt rows still surface there.
fn validate_grade(code: &str) -> TournamentResult<()> {
    BeltGrade::from_code(code)
        .map(drop)
        .map_err(|e| TournamentError::Build(BuildError::UnknownGrade(e)))
}
