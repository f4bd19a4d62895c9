use thiserror::Error;

use super::ledger::LedgerError;
use super::match_state::MatchStatus;
use super::players::PlayerSlot;

/// Why a submission was refused in the current match state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStateReason {
    #[error("match is {0}, not live")]
    NotLive(MatchStatus),

    #[error("no {0} selected")]
    MissingPlayer(PlayerSlot),

    #[error("match is over")]
    MatchOver,

    #[error("match is {0}, not at the innings break")]
    NotAtInningsBreak(MatchStatus),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("Invalid state: {0}")]
    InvalidState(InvalidStateReason),

    #[error("Wicket ball needs the dismissed batter (striker or non-striker)")]
    AmbiguousDismissal,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Invalid ball: {0}")]
    InvalidBall(String),

    #[error("Invalid player selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid match setup: {0}")]
    InvalidSetup(String),

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl ScoringError {
    pub fn not_live(status: MatchStatus) -> Self {
        ScoringError::InvalidState(InvalidStateReason::NotLive(status))
    }

    pub fn missing_player(slot: PlayerSlot) -> Self {
        ScoringError::InvalidState(InvalidStateReason::MissingPlayer(slot))
    }

    pub fn invalid_selection(msg: impl Into<String>) -> Self {
        ScoringError::InvalidSelection(msg.into())
    }

    /// Stable identifier the caller can map to a corrective action
    pub fn reason_code(&self) -> &'static str {
        match self {
            ScoringError::InvalidState(InvalidStateReason::MissingPlayer(_)) => "missing_player",
            ScoringError::InvalidState(_) => "invalid_state",
            ScoringError::AmbiguousDismissal => "ambiguous_dismissal",
            ScoringError::NothingToUndo => "nothing_to_undo",
            ScoringError::InvalidBall(_) => "invalid_ball",
            ScoringError::InvalidSelection(_) => "invalid_selection",
            ScoringError::InvalidSetup(_) => "invalid_setup",
            ScoringError::MatchNotFound(_) => "match_not_found",
            ScoringError::PersistenceFailure(_) => "persistence_failure",
            ScoringError::Ledger(_) => "ledger_violation",
        }
    }

    /// The slot the caller should prompt for, if that is what blocked the ball
    pub fn missing_slot(&self) -> Option<PlayerSlot> {
        match self {
            ScoringError::InvalidState(InvalidStateReason::MissingPlayer(slot)) => Some(*slot),
            _ => None,
        }
    }
}
