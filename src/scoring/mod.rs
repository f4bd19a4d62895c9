pub mod ball;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod match_state;
pub mod players;
pub mod repository;
pub mod running_total;
pub mod scoreboard;
pub mod service;
pub mod session;
pub mod state_machine;
pub mod types;

pub use ball::{
    BallEvent, BallInput, DismissedBatter, Extra, PlayerId, BALLS_PER_OVER, MAX_RUNS_OFF_BAT,
};
pub use errors::{InvalidStateReason, ScoringError};
pub use ledger::{InningsNumber, Ledger, LedgerError, Over};
pub use match_state::{MatchPhase, MatchSetup, MatchState, MatchStatus, TossDecision};
pub use players::{ActivePlayers, Player, PlayerSelection, PlayerSlot, Role, Team};
pub use repository::{InMemoryMatchRepository, MatchRepository};
pub use running_total::RunningTotal;
pub use scoreboard::{ExtrasSummary, InningsCard, OverSummary, Scoreboard};
pub use service::{MatchService, MatchServiceBuilder};
pub use session::{BallOutcome, MatchSession, UndoOutcome};
pub use state_machine::Transition;
