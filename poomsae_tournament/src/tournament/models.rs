//! Tournament data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tournament ID type
pub type TournamentId = i64;

/// Team ID type
pub type TeamId = i64;

/// Participant ID type
pub type ParticipantId = i64;

/// Pool ID type
pub type PoolId = i64;

/// Participant sex, persisted as `F`/`M`. Both a participant attribute
/// and a pool-partitioning axis.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Sex {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
}

impl Sex {
    pub fn code(self) -> &'static str {
        match self {
            Sex::Female => "F",
            Sex::Male => "M",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "F" => Some(Sex::Female),
            "M" => Some(Sex::Male),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Pool-type label, persisted as `S`/`P`/`T`. Derived from participant
/// count: 1 is Solo, 2 is Pair, 3 or more is Team.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum PoolType {
    #[serde(rename = "S")]
    Solo,
    #[serde(rename = "P")]
    Pair,
    #[serde(rename = "T")]
    Team,
}

impl PoolType {
    pub fn code(self) -> &'static str {
        match self {
            PoolType::Solo => "S",
            PoolType::Pair => "P",
            PoolType::Team => "T",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(PoolType::Solo),
            "P" => Some(PoolType::Pair),
            "T" => Some(PoolType::Team),
            _ => None,
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A tournament: the registration and scoring scope for teams and pools.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub tournament_start: DateTime<Utc>,
    pub created: DateTime<Utc>,
}

/// A registered competitor.
///
/// The belt grade is carried as its persisted two-character code; the
/// rules core owns parsing it, and an unrecognized code surfaces there as
/// an unknown-grade failure.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub team_id: TeamId,
    pub name: String,
    pub belt_grade: String,
    pub sex: Sex,
    pub birthdate: NaiveDate,
}

/// A tournament signup: one or more participants competing as a unit.
/// `pool_id` is set by the pool build and cleared when pools are rebuilt.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub tournament_id: TournamentId,
    pub pool_id: Option<PoolId>,
    pub participants: Vec<Participant>,
}

/// A persisted pool: a grouping of teams that compete with each other.
/// Only non-empty pools are ever persisted.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Pool {
    pub id: PoolId,
    pub tournament_id: TournamentId,
    pub pool_type: PoolType,
    pub team_ids: Vec<TeamId>,
}

/// A tournament with its full current state.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct TournamentDetail {
    pub tournament: Tournament,
    pub teams: Vec<Team>,
    pub pools: Vec<Pool>,
}

/// Input for creating a tournament.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewTournament {
    pub name: String,
    pub tournament_start: DateTime<Utc>,
}

/// Input for registering a participant. The belt grade arrives as its
/// wire code and is validated against the grade table before anything is
/// stored.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewParticipant {
    pub name: String,
    pub belt_grade: String,
    pub sex: Sex,
    pub birthdate: NaiveDate,
}

/// Input for registering a team. A team may be registered before its
/// roster is complete; the pool build is what requires at least one
/// participant.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NewTeam {
    #[serde(default)]
    pub participants: Vec<NewParticipant>,
}
