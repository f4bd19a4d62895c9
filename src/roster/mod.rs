//! Team rosters the scorer picks batters and bowlers from.

pub mod handlers;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::scoring::{Player, Role};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("Unknown team: {team_id}")]
    UnknownTeam { team_id: String },

    #[error("Player {player_id} is already on the roster of team {team_id}")]
    DuplicatePlayer { team_id: String, player_id: String },

    #[error("Roster unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the players a team can field in a given role
#[async_trait]
pub trait RosterProvider: Send + Sync {
    async fn get_eligible_players(&self, team_id: &str, role: Role)
        -> Result<Vec<Player>, RosterError>;
}

#[derive(Debug, Clone)]
struct RosterEntry {
    player: Player,
    roles: Vec<Role>,
}

/// In-memory rosters keyed by team id
#[derive(Debug, Default)]
pub struct InMemoryRosterProvider {
    teams: Arc<RwLock<HashMap<String, Vec<RosterEntry>>>>,
}

impl InMemoryRosterProvider {
    pub fn new() -> Self {
        Self {
            teams: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn generate_player_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Creates an empty roster; existing rosters are kept
    pub async fn add_team(&self, team_id: &str) {
        let mut teams = self.teams.write().await;
        teams.entry(team_id.to_string()).or_default();
    }

    /// Adds a new player under a fresh id
    pub async fn register_player(
        &self,
        team_id: &str,
        name: &str,
        roles: &[Role],
    ) -> Result<Player, RosterError> {
        let player = Player::new(Self::generate_player_id(), name);
        self.add_player(team_id, player.clone(), roles).await?;
        Ok(player)
    }

    #[instrument(skip(self, player), fields(player_id = %player.id))]
    pub async fn add_player(
        &self,
        team_id: &str,
        player: Player,
        roles: &[Role],
    ) -> Result<(), RosterError> {
        let mut teams = self.teams.write().await;
        let roster = teams.entry(team_id.to_string()).or_default();

        if roster.iter().any(|entry| entry.player.id == player.id) {
            warn!("Player already on roster");
            return Err(RosterError::DuplicatePlayer {
                team_id: team_id.to_string(),
                player_id: player.id,
            });
        }

        info!(team_id = %team_id, name = %player.name, "Player added to roster");
        roster.push(RosterEntry {
            player,
            roles: roles.to_vec(),
        });
        Ok(())
    }
}

#[async_trait]
impl RosterProvider for InMemoryRosterProvider {
    #[instrument(skip(self))]
    async fn get_eligible_players(
        &self,
        team_id: &str,
        role: Role,
    ) -> Result<Vec<Player>, RosterError> {
        let teams = self.teams.read().await;
        let roster = teams.get(team_id).ok_or_else(|| RosterError::UnknownTeam {
            team_id: team_id.to_string(),
        })?;

        let players: Vec<Player> = roster
            .iter()
            .filter(|entry| entry.roles.contains(&role))
            .map(|entry| entry.player.clone())
            .collect();

        debug!(count = players.len(), "Eligible players listed");
        Ok(players)
    }
}
