//! Pool assignment.
//!
//! [`build_pools`] partitions a tournament's teams into competition pools.
//! It is a pure function over an in-memory snapshot: no storage, no side
//! effects, and a failure anywhere leaves nothing assigned. The
//! transactional replace-all commit lives in the repository layer.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::classes::{self, CompetitionClass, UnknownGradeError};
use crate::tournament::models::{PoolType, Sex, TeamId};

/// Why a pool build was aborted. Either kind is fatal for the whole
/// tournament: assignment is all-or-nothing.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    UnknownGrade(#[from] UnknownGradeError),

    #[error("team {0} has no participants")]
    EmptyTeam(TeamId),
}

/// A participant as the builder sees it: the raw persisted fields.
///
/// `name` and `birthdate` are not consulted by the assignment algorithm;
/// they ride along for the age-bracket extension (see `rules::age`).
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct ParticipantSnapshot {
    pub name: String,
    pub belt_grade: String,
    pub sex: Sex,
    pub birthdate: NaiveDate,
}

/// One registered team, with participants in registration order.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct TeamSnapshot {
    pub id: TeamId,
    pub participants: Vec<ParticipantSnapshot>,
}

/// One cell of the per-class candidate grid.
///
/// Solo and Team pools are split by sex; the Pair pool is shared by both
/// sexes, which is why the `Pair` variant carries no `Sex`. Pair
/// competitions are typically mixed-sex, and splitting them would
/// fragment an already small pool.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum PoolSlot {
    Solo(Sex),
    Pair,
    Team(Sex),
}

impl PoolSlot {
    /// The five candidate cells of one class.
    pub const ALL: [PoolSlot; 5] = [
        PoolSlot::Solo(Sex::Female),
        PoolSlot::Solo(Sex::Male),
        PoolSlot::Pair,
        PoolSlot::Team(Sex::Female),
        PoolSlot::Team(Sex::Male),
    ];

    /// The pool-type label this cell is persisted under.
    pub fn pool_type(self) -> PoolType {
        match self {
            PoolSlot::Solo(_) => PoolType::Solo,
            PoolSlot::Pair => PoolType::Pair,
            PoolSlot::Team(_) => PoolType::Team,
        }
    }
}

/// Identity of one candidate pool: class crossed with slot.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PoolKey {
    pub class: CompetitionClass,
    pub slot: PoolSlot,
}

/// A populated candidate pool: its key and the teams assigned to it.
/// Invariant: `team_ids` is never empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlannedPool {
    pub key: PoolKey,
    pub team_ids: Vec<TeamId>,
}

/// The result of a successful build: every input team appears in exactly
/// one pool, every pool holds at least one team, and pools are ordered by
/// key so equal inputs produce equal partitions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PoolPartition {
    pools: Vec<PlannedPool>,
}

impl PoolPartition {
    pub fn pools(&self) -> &[PlannedPool] {
        &self.pools
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Total number of assigned teams across all pools.
    pub fn team_count(&self) -> usize {
        self.pools.iter().map(|pool| pool.team_ids.len()).sum()
    }

    /// The cell a team was assigned to, if any.
    pub fn pool_for(&self, team_id: TeamId) -> Option<PoolKey> {
        self.pools
            .iter()
            .find(|pool| pool.team_ids.contains(&team_id))
            .map(|pool| pool.key)
    }
}

/// Partition `teams` into competition pools.
///
/// The candidate grid (4 classes x 5 slots = 20 cells) is laid out before
/// any team is examined, every team's cell is resolved before any
/// assignment is recorded, and empty cells are discarded at the end. A
/// tournament with zero teams yields an empty partition; a team with no
/// peers in its cell keeps a singleton pool.
pub fn build_pools(teams: &[TeamSnapshot]) -> Result<PoolPartition, BuildError> {
    let mut grid: BTreeMap<PoolKey, Vec<TeamId>> = BTreeMap::new();
    for class in CompetitionClass::ALL {
        for slot in PoolSlot::ALL {
            grid.insert(PoolKey { class, slot }, Vec::new());
        }
    }

    // Resolve first, assign second: a bad grade or an empty team on the
    // last input still means zero assignments.
    let mut placements = Vec::with_capacity(teams.len());
    for team in teams {
        placements.push((team.id, cell_for(team)?));
    }
    for (team_id, key) in placements {
        grid.entry(key).or_default().push(team_id);
    }

    let pools = grid
        .into_iter()
        .filter(|(_, team_ids)| !team_ids.is_empty())
        .map(|(key, team_ids)| PlannedPool { key, team_ids })
        .collect();

    Ok(PoolPartition { pools })
}

fn cell_for(team: &TeamSnapshot) -> Result<PoolKey, BuildError> {
    let slot = match team.participants.as_slice() {
        [] => return Err(BuildError::EmptyTeam(team.id)),
        [solo] => PoolSlot::Solo(solo.sex),
        [_, _] => PoolSlot::Pair,
        [first, ..] => PoolSlot::Team(first.sex),
    };
    let class = classes::team_class(team.participants.iter().map(|p| p.belt_grade.as_str()))?;
    Ok(PoolKey { class, slot })
}
