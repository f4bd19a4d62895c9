//! Outbound writes of engine state to external storage.
//!
//! Sinks are called after the in-memory session has been updated; a failed
//! write never rolls the session back.

mod memory;
mod postgres;

pub use memory::InMemoryPersistenceSink;
pub use postgres::PostgresPersistenceSink;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::{BallEvent, InningsNumber, MatchState};
use crate::stats::StatsTable;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Write rejected: {0}")]
    Rejected(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage address of one ball
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BallAddress {
    pub match_id: String,
    /// Batting side of the innings
    pub team_id: String,
    pub innings: InningsNumber,
    pub over_index: u32,
    /// 1-based insertion position within the over
    pub ball_number: usize,
}

impl BallAddress {
    /// `{matchId}_{teamId}_{inningNumber}_{overIndex}`
    pub fn over_document_key(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.match_id,
            self.team_id,
            self.innings.number(),
            self.over_index
        )
    }

    pub fn ball_key(&self) -> String {
        format!("ball_{}", self.ball_number)
    }
}

#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn save_ball(&self, address: &BallAddress, ball: &BallEvent)
        -> Result<(), PersistenceError>;

    async fn delete_ball(&self, address: &BallAddress) -> Result<(), PersistenceError>;

    async fn save_match_state(&self, state: &MatchState) -> Result<(), PersistenceError>;

    async fn save_player_stats(
        &self,
        match_id: &str,
        stats: &StatsTable,
    ) -> Result<(), PersistenceError>;
}

/// A sink write that failed and is waiting to be retried
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PendingWrite {
    SaveBall {
        address: BallAddress,
        ball: BallEvent,
    },
    DeleteBall {
        address: BallAddress,
    },
    SaveMatchState {
        state: MatchState,
    },
    SavePlayerStats {
        match_id: String,
        stats: StatsTable,
    },
}

impl PendingWrite {
    pub async fn write_to(&self, sink: &dyn PersistenceSink) -> Result<(), PersistenceError> {
        match self {
            PendingWrite::SaveBall { address, ball } => sink.save_ball(address, ball).await,
            PendingWrite::DeleteBall { address } => sink.delete_ball(address).await,
            PendingWrite::SaveMatchState { state } => sink.save_match_state(state).await,
            PendingWrite::SavePlayerStats { match_id, stats } => {
                sink.save_player_stats(match_id, stats).await
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PendingWrite::SaveBall { .. } => "save_ball",
            PendingWrite::DeleteBall { .. } => "delete_ball",
            PendingWrite::SaveMatchState { .. } => "save_match_state",
            PendingWrite::SavePlayerStats { .. } => "save_player_stats",
        }
    }
}
