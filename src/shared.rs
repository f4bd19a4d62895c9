use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ScoringDefaults;
use crate::roster::{InMemoryRosterProvider, RosterError};
use crate::scoring::{InvalidStateReason, MatchService, ScoringError};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub match_service: Arc<MatchService>,
    pub roster: Arc<InMemoryRosterProvider>,
    pub scoring_defaults: ScoringDefaults,
}

impl AppState {
    pub fn new(
        match_service: Arc<MatchService>,
        roster: Arc<InMemoryRosterProvider>,
        scoring_defaults: ScoringDefaults,
    ) -> Self {
        Self {
            match_service,
            roster,
            scoring_defaults,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Scoring(err) => match err {
                ScoringError::InvalidState(_) | ScoringError::NothingToUndo => {
                    StatusCode::CONFLICT
                }
                ScoringError::AmbiguousDismissal
                | ScoringError::InvalidBall(_)
                | ScoringError::InvalidSelection(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ScoringError::InvalidSetup(_) => StatusCode::BAD_REQUEST,
                ScoringError::MatchNotFound(_) => StatusCode::NOT_FOUND,
                ScoringError::PersistenceFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
                ScoringError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Roster(RosterError::UnknownTeam { .. }) => StatusCode::NOT_FOUND,
            AppError::Roster(RosterError::DuplicatePlayer { .. }) => StatusCode::CONFLICT,
            AppError::Roster(RosterError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn reason_code(&self) -> &'static str {
        match self {
            AppError::Scoring(err) => err.reason_code(),
            AppError::Roster(_) => "roster",
            AppError::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let missing_slot = match &self {
            AppError::Scoring(ScoringError::InvalidState(InvalidStateReason::MissingPlayer(
                slot,
            ))) => Some(slot.to_string()),
            _ => None,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "reason": self.reason_code(),
            "missing_slot": missing_slot,
        }));

        (status, body).into_response()
    }
}
