//! # Poomsae Tournament
//!
//! Martial-arts tournament management: participant registration into
//! teams, and automatic partitioning of teams into competitive pools
//! once registration closes.
//!
//! The heart of the crate is the pure rules core in [`rules`]:
//!
//! - [`rules::classes`] maps belt grades to the four competition classes
//!   (`D < C < B < A`); a team competes at the class of its strongest
//!   member.
//! - [`rules::pools`] lays out the candidate pool grid for a tournament
//!   (class x Solo-per-sex / shared Pair / Team-per-sex), assigns every
//!   team to exactly one cell, and prunes empty cells. Pool builds are
//!   all-or-nothing per tournament.
//!
//! [`tournament::TournamentManager`] drives registration and the build
//! against a [`db::TournamentRepository`], which commits each build as a
//! transactional replace-all; rebuilding with unchanged registrations
//! reproduces the same partition.
//!
//! ## Example
//!
//! ```
//! use poomsae_tournament::rules::{build_pools, classify, BeltGrade, CompetitionClass};
//!
//! assert_eq!(classify(BeltGrade::GreenBlue), CompetitionClass::C);
//! assert!(build_pools(&[]).unwrap().is_empty());
//! ```

/// Storage: connection pooling, configuration, and the repository.
pub mod db;

/// The pure competition rules: classifier, pool builder, age tables.
pub mod rules;

/// Domain models and the registration/pool-build service.
pub mod tournament;

pub use rules::{
    BeltGrade, BuildError, CompetitionClass, PoolKey, PoolPartition, PoolSlot, UnknownGradeError,
    build_pools, classify,
};
pub use tournament::{TournamentError, TournamentManager, TournamentResult};
