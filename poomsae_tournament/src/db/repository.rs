//! Repository trait and implementations for tournament storage.
//!
//! The trait is the persistence collaborator the manager is written
//! against: Postgres in production, in-memory for tests and local
//! development.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};

use crate::rules::pools::{ParticipantSnapshot, PoolPartition, TeamSnapshot};
use crate::tournament::manager::{TournamentError, TournamentResult};
use crate::tournament::models::{
    NewParticipant, NewTeam, NewTournament, Participant, ParticipantId, Pool, PoolId, PoolType,
    Sex, Team, TeamId, Tournament, TournamentDetail, TournamentId,
};

/// Storage operations for tournaments, teams, participants and pools.
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Create a tournament.
    async fn create_tournament(&self, new: &NewTournament) -> TournamentResult<Tournament>;

    /// List tournaments, most recently created first.
    async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>>;

    /// Load a tournament with its teams (participants included) and pools.
    async fn get_tournament(&self, id: TournamentId) -> TournamentResult<TournamentDetail>;

    /// Create a team, with any initial participants, in one atomic step.
    async fn create_team(
        &self,
        tournament_id: TournamentId,
        new: &NewTeam,
    ) -> TournamentResult<Team>;

    /// Add a participant to a team.
    async fn create_participant(
        &self,
        team_id: TeamId,
        new: &NewParticipant,
    ) -> TournamentResult<Participant>;

    /// Load the build input: every team of the tournament with its
    /// participants, in registration order.
    async fn load_team_snapshots(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<TeamSnapshot>>;

    /// Replace the tournament's pool set with the given partition.
    ///
    /// Must be atomic: prior pools are deleted, new pools inserted, and
    /// team pool references updated in one step. Concurrent replacements
    /// of the same tournament must be serialized. No partial state is
    /// ever observable.
    async fn replace_pools(
        &self,
        tournament_id: TournamentId,
        partition: &PoolPartition,
    ) -> TournamentResult<Vec<Pool>>;
}

/// PostgreSQL implementation of [`TournamentRepository`].
#[derive(Clone)]
pub struct PgTournamentRepository {
    pool: PgPool,
}

impl PgTournamentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_error(message: String) -> TournamentError {
    TournamentError::Database(sqlx::Error::Decode(message.into()))
}

fn sex_from_row(code: &str) -> TournamentResult<Sex> {
    Sex::from_code(code).ok_or_else(|| decode_error(format!("invalid sex code {code:?}")))
}

fn pool_type_from_row(code: &str) -> TournamentResult<PoolType> {
    PoolType::from_code(code)
        .ok_or_else(|| decode_error(format!("invalid pool type code {code:?}")))
}

#[async_trait]
impl TournamentRepository for PgTournamentRepository {
    async fn create_tournament(&self, new: &NewTournament) -> TournamentResult<Tournament> {
        let row = sqlx::query(
            r#"
            INSERT INTO tournaments (name, tournament_start)
            VALUES ($1, $2)
            RETURNING id, name, tournament_start, created
            "#,
        )
        .bind(&new.name)
        .bind(new.tournament_start)
        .fetch_one(&self.pool)
        .await?;

        Ok(Tournament {
            id: row.get("id"),
            name: row.get("name"),
            tournament_start: row.get("tournament_start"),
            created: row.get("created"),
        })
    }

    async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        let rows = sqlx::query(
            "SELECT id, name, tournament_start, created FROM tournaments ORDER BY created DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Tournament {
                id: row.get("id"),
                name: row.get("name"),
                tournament_start: row.get("tournament_start"),
                created: row.get("created"),
            })
            .collect())
    }

    async fn get_tournament(&self, id: TournamentId) -> TournamentResult<TournamentDetail> {
        let row = sqlx::query(
            "SELECT id, name, tournament_start, created FROM tournaments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TournamentError::NotFound(id))?;

        let tournament = Tournament {
            id: row.get("id"),
            name: row.get("name"),
            tournament_start: row.get("tournament_start"),
            created: row.get("created"),
        };

        let team_rows =
            sqlx::query("SELECT id, pool_id FROM teams WHERE tournament_id = $1 ORDER BY id")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

        let participant_rows = sqlx::query(
            r#"
            SELECT p.id, p.team_id, p.name, p.belt_grade, p.sex, p.birthdate
            FROM participants p
            JOIN teams t ON t.id = p.team_id
            WHERE t.tournament_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut rosters: HashMap<TeamId, Vec<Participant>> = HashMap::new();
        for row in participant_rows {
            let sex: String = row.get("sex");
            let participant = Participant {
                id: row.get("id"),
                team_id: row.get("team_id"),
                name: row.get("name"),
                belt_grade: row.get("belt_grade"),
                sex: sex_from_row(&sex)?,
                birthdate: row.get("birthdate"),
            };
            rosters.entry(participant.team_id).or_default().push(participant);
        }

        let teams: Vec<Team> = team_rows
            .into_iter()
            .map(|row| {
                let team_id: TeamId = row.get("id");
                Team {
                    id: team_id,
                    tournament_id: id,
                    pool_id: row.get("pool_id"),
                    participants: rosters.remove(&team_id).unwrap_or_default(),
                }
            })
            .collect();

        let pool_rows =
            sqlx::query("SELECT id, pool_type FROM pools WHERE tournament_id = $1 ORDER BY id")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

        let mut pools = Vec::with_capacity(pool_rows.len());
        for row in pool_rows {
            let pool_id: PoolId = row.get("id");
            let pool_type: String = row.get("pool_type");
            pools.push(Pool {
                id: pool_id,
                tournament_id: id,
                pool_type: pool_type_from_row(&pool_type)?,
                team_ids: teams
                    .iter()
                    .filter(|team| team.pool_id == Some(pool_id))
                    .map(|team| team.id)
                    .collect(),
            });
        }

        Ok(TournamentDetail {
            tournament,
            teams,
            pools,
        })
    }

    async fn create_team(
        &self,
        tournament_id: TournamentId,
        new: &NewTeam,
    ) -> TournamentResult<Team> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM tournaments WHERE id = $1")
            .bind(tournament_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(TournamentError::NotFound(tournament_id))?;

        let row = sqlx::query("INSERT INTO teams (tournament_id) VALUES ($1) RETURNING id")
            .bind(tournament_id)
            .fetch_one(&mut *tx)
            .await?;
        let team_id: TeamId = row.get("id");

        let mut participants = Vec::with_capacity(new.participants.len());
        for participant in &new.participants {
            let row = sqlx::query(
                r#"
                INSERT INTO participants (team_id, name, belt_grade, sex, birthdate)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(team_id)
            .bind(&participant.name)
            .bind(&participant.belt_grade)
            .bind(participant.sex.code())
            .bind(participant.birthdate)
            .fetch_one(&mut *tx)
            .await?;

            participants.push(Participant {
                id: row.get("id"),
                team_id,
                name: participant.name.clone(),
                belt_grade: participant.belt_grade.clone(),
                sex: participant.sex,
                birthdate: participant.birthdate,
            });
        }

        tx.commit().await?;

        Ok(Team {
            id: team_id,
            tournament_id,
            pool_id: None,
            participants,
        })
    }

    async fn create_participant(
        &self,
        team_id: TeamId,
        new: &NewParticipant,
    ) -> TournamentResult<Participant> {
        sqlx::query("SELECT id FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(TournamentError::TeamNotFound(team_id))?;

        let row = sqlx::query(
            r#"
            INSERT INTO participants (team_id, name, belt_grade, sex, birthdate)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(team_id)
        .bind(&new.name)
        .bind(&new.belt_grade)
        .bind(new.sex.code())
        .bind(new.birthdate)
        .fetch_one(&self.pool)
        .await?;

        Ok(Participant {
            id: row.get("id"),
            team_id,
            name: new.name.clone(),
            belt_grade: new.belt_grade.clone(),
            sex: new.sex,
            birthdate: new.birthdate,
        })
    }

    async fn load_team_snapshots(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<TeamSnapshot>> {
        sqlx::query("SELECT id FROM tournaments WHERE id = $1")
            .bind(tournament_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(TournamentError::NotFound(tournament_id))?;

        let team_rows = sqlx::query("SELECT id FROM teams WHERE tournament_id = $1 ORDER BY id")
            .bind(tournament_id)
            .fetch_all(&self.pool)
            .await?;

        let participant_rows = sqlx::query(
            r#"
            SELECT p.team_id, p.name, p.belt_grade, p.sex, p.birthdate
            FROM participants p
            JOIN teams t ON t.id = p.team_id
            WHERE t.tournament_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        let mut rosters: HashMap<TeamId, Vec<ParticipantSnapshot>> = HashMap::new();
        for row in participant_rows {
            let sex: String = row.get("sex");
            let team_id: TeamId = row.get("team_id");
            rosters.entry(team_id).or_default().push(ParticipantSnapshot {
                name: row.get("name"),
                belt_grade: row.get("belt_grade"),
                sex: sex_from_row(&sex)?,
                birthdate: row.get("birthdate"),
            });
        }

        Ok(team_rows
            .into_iter()
            .map(|row| {
                let id: TeamId = row.get("id");
                TeamSnapshot {
                    id,
                    participants: rosters.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }

    async fn replace_pools(
        &self,
        tournament_id: TournamentId,
        partition: &PoolPartition,
    ) -> TournamentResult<Vec<Pool>> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent builds of the same tournament.
        sqlx::query("SELECT id FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(tournament_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(TournamentError::NotFound(tournament_id))?;

        // Team pool references drop to NULL via ON DELETE SET NULL.
        sqlx::query("DELETE FROM pools WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        let mut pools = Vec::with_capacity(partition.len());
        for planned in partition.pools() {
            let row =
                sqlx::query("INSERT INTO pools (tournament_id, pool_type) VALUES ($1, $2) RETURNING id")
                    .bind(tournament_id)
                    .bind(planned.key.slot.pool_type().code())
                    .fetch_one(&mut *tx)
                    .await?;
            let pool_id: PoolId = row.get("id");

            sqlx::query("UPDATE teams SET pool_id = $1 WHERE id = ANY($2)")
                .bind(pool_id)
                .bind(&planned.team_ids)
                .execute(&mut *tx)
                .await?;

            pools.push(Pool {
                id: pool_id,
                tournament_id,
                pool_type: planned.key.slot.pool_type(),
                team_ids: planned.team_ids.clone(),
            });
        }

        tx.commit().await?;

        Ok(pools)
    }
}

/// In-memory implementation of [`TournamentRepository`].
///
/// Used by the test suites and by the server's `--memory` mode. The
/// single interior mutex makes every operation, including
/// `replace_pools`, atomic.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    tournaments: BTreeMap<TournamentId, Tournament>,
    teams: BTreeMap<TeamId, TeamRow>,
    participants: BTreeMap<ParticipantId, Participant>,
    pools: BTreeMap<PoolId, PoolRow>,
}

struct TeamRow {
    tournament_id: TournamentId,
    pool_id: Option<PoolId>,
}

struct PoolRow {
    tournament_id: TournamentId,
    pool_type: PoolType,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryState {
    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn teams_of(&self, tournament_id: TournamentId) -> Vec<Team> {
        self.teams
            .iter()
            .filter(|(_, row)| row.tournament_id == tournament_id)
            .map(|(&team_id, row)| Team {
                id: team_id,
                tournament_id,
                pool_id: row.pool_id,
                participants: self
                    .participants
                    .values()
                    .filter(|p| p.team_id == team_id)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    fn detail(&self, tournament_id: TournamentId) -> TournamentResult<TournamentDetail> {
        let tournament = self
            .tournaments
            .get(&tournament_id)
            .cloned()
            .ok_or(TournamentError::NotFound(tournament_id))?;
        let teams = self.teams_of(tournament_id);
        let pools = self
            .pools
            .iter()
            .filter(|(_, row)| row.tournament_id == tournament_id)
            .map(|(&pool_id, row)| Pool {
                id: pool_id,
                tournament_id,
                pool_type: row.pool_type,
                team_ids: teams
                    .iter()
                    .filter(|team| team.pool_id == Some(pool_id))
                    .map(|team| team.id)
                    .collect(),
            })
            .collect();
        Ok(TournamentDetail {
            tournament,
            teams,
            pools,
        })
    }
}

#[async_trait]
impl TournamentRepository for MemoryRepository {
    async fn create_tournament(&self, new: &NewTournament) -> TournamentResult<Tournament> {
        let mut state = self.state.lock().unwrap();
        let id = state.alloc_id();
        let tournament = Tournament {
            id,
            name: new.name.clone(),
            tournament_start: new.tournament_start,
            created: Utc::now(),
        };
        state.tournaments.insert(id, tournament.clone());
        Ok(tournament)
    }

    async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        let state = self.state.lock().unwrap();
        let mut tournaments: Vec<Tournament> = state.tournaments.values().cloned().collect();
        tournaments.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(tournaments)
    }

    async fn get_tournament(&self, id: TournamentId) -> TournamentResult<TournamentDetail> {
        self.state.lock().unwrap().detail(id)
    }

    async fn create_team(
        &self,
        tournament_id: TournamentId,
        new: &NewTeam,
    ) -> TournamentResult<Team> {
        let mut state = self.state.lock().unwrap();
        if !state.tournaments.contains_key(&tournament_id) {
            return Err(TournamentError::NotFound(tournament_id));
        }

        let team_id = state.alloc_id();
        state.teams.insert(
            team_id,
            TeamRow {
                tournament_id,
                pool_id: None,
            },
        );

        let mut participants = Vec::with_capacity(new.participants.len());
        for participant in &new.participants {
            let id = state.alloc_id();
            let participant = Participant {
                id,
                team_id,
                name: participant.name.clone(),
                belt_grade: participant.belt_grade.clone(),
                sex: participant.sex,
                birthdate: participant.birthdate,
            };
            state.participants.insert(id, participant.clone());
            participants.push(participant);
        }

        Ok(Team {
            id: team_id,
            tournament_id,
            pool_id: None,
            participants,
        })
    }

    async fn create_participant(
        &self,
        team_id: TeamId,
        new: &NewParticipant,
    ) -> TournamentResult<Participant> {
        let mut state = self.state.lock().unwrap();
        if !state.teams.contains_key(&team_id) {
            return Err(TournamentError::TeamNotFound(team_id));
        }

        let id = state.alloc_id();
        let participant = Participant {
            id,
            team_id,
            name: new.name.clone(),
            belt_grade: new.belt_grade.clone(),
            sex: new.sex,
            birthdate: new.birthdate,
        };
        state.participants.insert(id, participant.clone());
        Ok(participant)
    }

    async fn load_team_snapshots(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<TeamSnapshot>> {
        let state = self.state.lock().unwrap();
        if !state.tournaments.contains_key(&tournament_id) {
            return Err(TournamentError::NotFound(tournament_id));
        }

        Ok(state
            .teams_of(tournament_id)
            .into_iter()
            .map(|team| TeamSnapshot {
                id: team.id,
                participants: team
                    .participants
                    .into_iter()
                    .map(|p| ParticipantSnapshot {
                        name: p.name,
                        belt_grade: p.belt_grade,
                        sex: p.sex,
                        birthdate: p.birthdate,
                    })
                    .collect(),
            })
            .collect())
    }

    async fn replace_pools(
        &self,
        tournament_id: TournamentId,
        partition: &PoolPartition,
    ) -> TournamentResult<Vec<Pool>> {
        let mut state = self.state.lock().unwrap();
        if !state.tournaments.contains_key(&tournament_id) {
            return Err(TournamentError::NotFound(tournament_id));
        }

        state
            .pools
            .retain(|_, row| row.tournament_id != tournament_id);
        for row in state.teams.values_mut() {
            if row.tournament_id == tournament_id {
                row.pool_id = None;
            }
        }

        let mut pools = Vec::with_capacity(partition.len());
        for planned in partition.pools() {
            let pool_id = state.alloc_id();
            state.pools.insert(
                pool_id,
                PoolRow {
                    tournament_id,
                    pool_type: planned.key.slot.pool_type(),
                },
            );
            for team_id in &planned.team_ids {
                if let Some(row) = state.teams.get_mut(team_id) {
                    row.pool_id = Some(pool_id);
                }
            }
            pools.push(Pool {
                id: pool_id,
                tournament_id,
                pool_type: planned.key.slot.pool_type(),
                team_ids: planned.team_ids.clone(),
            });
        }

        Ok(pools)
    }
}
