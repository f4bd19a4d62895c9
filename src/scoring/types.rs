use serde::{Deserialize, Serialize};

use super::{
    ActivePlayers, BallOutcome, InningsNumber, MatchPhase, MatchSession, MatchSetup, MatchState,
    RunningTotal, Team, TossDecision, UndoOutcome,
};
use crate::config::ScoringDefaults;

/// Request payload for starting a match; limits fall back to the server defaults
#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub team1: Team,
    pub team2: Team,
    pub toss_winner: String,
    pub elected_to: TossDecision,
    #[serde(default)]
    pub overs_limit: Option<u32>,
    #[serde(default)]
    pub wickets_limit: Option<u32>,
    /// Play on until the overs run out
    #[serde(default)]
    pub no_wicket_limit: bool,
    #[serde(default)]
    pub quick_match: bool,
    #[serde(default)]
    pub reprompt_batters_each_over: Option<bool>,
}

impl CreateMatchRequest {
    pub fn into_setup(self, defaults: &ScoringDefaults) -> MatchSetup {
        let wickets_limit = if self.no_wicket_limit {
            None
        } else {
            self.wickets_limit.or(defaults.wickets_limit)
        };

        MatchSetup {
            team1: self.team1,
            team2: self.team2,
            overs_limit: self.overs_limit.unwrap_or(defaults.overs_limit),
            wickets_limit,
            toss_winner: self.toss_winner,
            elected_to: self.elected_to,
            quick_match: self.quick_match,
            reprompt_batters_each_over: self
                .reprompt_batters_each_over
                .unwrap_or(defaults.reprompt_batters_each_over),
        }
    }
}

/// Snapshot of a match for API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct MatchResponse {
    pub state: MatchState,
    pub phase: MatchPhase,
    pub active_players: ActivePlayers,
    pub first_innings: RunningTotal,
    pub second_innings: RunningTotal,
    pub pending_writes: usize,
}

impl MatchResponse {
    pub fn new(session: &MatchSession, pending_writes: usize) -> Self {
        Self {
            state: session.state().clone(),
            phase: session.phase(),
            active_players: session.active_players().clone(),
            first_innings: session.totals(InningsNumber::First),
            second_innings: session.totals(InningsNumber::Second),
            pending_writes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BallResponse {
    pub outcome: BallOutcome,
    pub phase: MatchPhase,
    pub pending_writes: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UndoResponse {
    pub outcome: UndoOutcome,
    pub phase: MatchPhase,
    pub pending_writes: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RetryWritesResponse {
    pub written: usize,
}
