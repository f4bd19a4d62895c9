use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use super::{BallAddress, PersistenceError, PersistenceSink};
use crate::scoring::{BallEvent, MatchState};
use crate::stats::StatsTable;

const CREATE_TABLES: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS match_balls (
        over_key TEXT NOT NULL,
        ball_key TEXT NOT NULL,
        match_id TEXT NOT NULL,
        team_id TEXT NOT NULL,
        innings SMALLINT NOT NULL,
        over_index INTEGER NOT NULL,
        ball_number INTEGER NOT NULL,
        document TEXT NOT NULL,
        recorded_at TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (over_key, ball_key)
    )",
    "CREATE TABLE IF NOT EXISTS match_states (
        match_id TEXT PRIMARY KEY,
        status TEXT NOT NULL,
        document TEXT NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS match_player_stats (
        match_id TEXT PRIMARY KEY,
        document TEXT NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )",
];

/// PostgreSQL sink storing each document as serialized JSON text
pub struct PostgresPersistenceSink {
    pool: PgPool,
}

impl PostgresPersistenceSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, PersistenceError> {
        let pool = PgPool::connect(database_url).await.map_err(|e| {
            warn!(error = %e, "Failed to connect to database");
            PersistenceError::Database(e.to_string())
        })?;
        Ok(Self::new(pool))
    }

    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        for statement in CREATE_TABLES {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Failed to create scorebook tables");
                    PersistenceError::Database(e.to_string())
                })?;
        }
        debug!("Scorebook tables ready");
        Ok(())
    }
}

#[async_trait]
impl PersistenceSink for PostgresPersistenceSink {
    #[instrument(skip(self, ball), fields(over = %address.over_document_key(), ball = %address.ball_key()))]
    async fn save_ball(
        &self,
        address: &BallAddress,
        ball: &BallEvent,
    ) -> Result<(), PersistenceError> {
        let document = serde_json::to_string(ball)?;

        sqlx::query(
            "INSERT INTO match_balls (over_key, ball_key, match_id, team_id, innings, over_index, ball_number, document, recorded_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (over_key, ball_key) DO UPDATE SET document = EXCLUDED.document, recorded_at = EXCLUDED.recorded_at",
        )
        .bind(address.over_document_key())
        .bind(address.ball_key())
        .bind(&address.match_id)
        .bind(&address.team_id)
        .bind(i16::from(address.innings.number()))
        .bind(address.over_index as i32)
        .bind(address.ball_number as i32)
        .bind(document)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to save ball");
            PersistenceError::Database(e.to_string())
        })?;

        debug!("Ball saved to database");
        Ok(())
    }

    #[instrument(skip(self), fields(over = %address.over_document_key(), ball = %address.ball_key()))]
    async fn delete_ball(&self, address: &BallAddress) -> Result<(), PersistenceError> {
        let result = sqlx::query("DELETE FROM match_balls WHERE over_key = $1 AND ball_key = $2")
            .bind(address.over_document_key())
            .bind(address.ball_key())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete ball");
                PersistenceError::Database(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            debug!("Ball was not stored; nothing deleted");
        }
        Ok(())
    }

    #[instrument(skip(self, state), fields(match_id = %state.match_id))]
    async fn save_match_state(&self, state: &MatchState) -> Result<(), PersistenceError> {
        let document = serde_json::to_string(state)?;

        sqlx::query(
            "INSERT INTO match_states (match_id, status, document, updated_at) VALUES ($1, $2, $3, $4)
             ON CONFLICT (match_id) DO UPDATE SET status = EXCLUDED.status, document = EXCLUDED.document, updated_at = EXCLUDED.updated_at",
        )
        .bind(&state.match_id)
        .bind(state.status.as_ref())
        .bind(document)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to save match state");
            PersistenceError::Database(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self, stats))]
    async fn save_player_stats(
        &self,
        match_id: &str,
        stats: &StatsTable,
    ) -> Result<(), PersistenceError> {
        let document = serde_json::to_string(stats)?;

        sqlx::query(
            "INSERT INTO match_player_stats (match_id, document, updated_at) VALUES ($1, $2, $3)
             ON CONFLICT (match_id) DO UPDATE SET document = EXCLUDED.document, updated_at = EXCLUDED.updated_at",
        )
        .bind(match_id)
        .bind(document)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, match_id = %match_id, "Failed to save player stats");
            PersistenceError::Database(e.to_string())
        })?;

        Ok(())
    }
}
