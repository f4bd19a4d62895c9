use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::scoring::{Player, Role};
use crate::shared::{AppError, AppState};

/// Request payload for adding a player to a team roster
#[derive(Debug, Deserialize)]
pub struct RegisterPlayerRequest {
    pub name: String,
    /// Both roles when left out
    #[serde(default)]
    pub roles: Option<Vec<Role>>,
}

/// POST /teams/:team_id/players
#[instrument(name = "register_player", skip(state, request))]
pub async fn register_player(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<RegisterPlayerRequest>,
) -> Result<Json<Player>, AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Player name cannot be empty".to_string()));
    }

    let roles = request
        .roles
        .unwrap_or_else(|| vec![Role::Batter, Role::Bowler]);
    let player = state.roster.register_player(&team_id, name, &roles).await?;

    info!(team_id = %team_id, player_id = %player.id, "Player registered");
    Ok(Json(player))
}
