//! Tournament module: domain models and the registration/pool-build
//! service.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use poomsae_tournament::db::MemoryRepository;
//! use poomsae_tournament::tournament::TournamentManager;
//! use poomsae_tournament::tournament::models::NewTournament;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TournamentManager::new(Arc::new(MemoryRepository::new()));
//!
//!     let tournament = manager
//!         .create_tournament(NewTournament {
//!             name: "Spring Open".to_string(),
//!             tournament_start: chrono::Utc::now(),
//!         })
//!         .await?;
//!
//!     // ... register teams, then:
//!     let detail = manager.make_pools(tournament.id).await?;
//!     println!("{} pools", detail.pools.len());
//!     Ok(())
//! }
//! ```

pub mod manager;
pub mod models;

pub use manager::{TournamentError, TournamentManager, TournamentResult};
pub use models::{
    NewParticipant, NewTeam, NewTournament, Participant, ParticipantId, Pool, PoolId, PoolType,
    Sex, Team, TeamId, Tournament, TournamentDetail, TournamentId,
};
