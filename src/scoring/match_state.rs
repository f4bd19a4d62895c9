use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use super::ball::PlayerId;
use super::errors::ScoringError;
use super::ledger::InningsNumber;
use super::players::{PlayerSlot, Team};
use super::running_total::RunningTotal;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchStatus {
    Live,
    InningsBreak,
    Completed,
    Tied,
    NoResult,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MatchStatus::Completed | MatchStatus::Tied | MatchStatus::NoResult
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TossDecision {
    Batting,
    Bowling,
}

/// Where the match stands from the scorer's point of view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum MatchPhase {
    AwaitingPlayers { missing: Vec<PlayerSlot> },
    Live,
    InningsBreak,
    Completed,
    Tied,
    NoResult,
}

/// Everything needed to start a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSetup {
    pub team1: Team,
    pub team2: Team,
    pub overs_limit: u32,
    #[serde(default)]
    pub wickets_limit: Option<u32>,
    /// Team id of the toss winner
    pub toss_winner: String,
    pub elected_to: TossDecision,
    #[serde(default)]
    pub quick_match: bool,
    #[serde(default)]
    pub reprompt_batters_each_over: bool,
}

impl MatchSetup {
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.overs_limit == 0 {
            return Err(ScoringError::InvalidSetup(
                "Overs limit must be at least 1".to_string(),
            ));
        }
        if self.wickets_limit == Some(0) {
            return Err(ScoringError::InvalidSetup(
                "Wickets limit must be at least 1 when set".to_string(),
            ));
        }
        if self.team1.id.trim().is_empty() || self.team2.id.trim().is_empty() {
            return Err(ScoringError::InvalidSetup(
                "Team ids cannot be empty".to_string(),
            ));
        }
        if self.team1.id == self.team2.id {
            return Err(ScoringError::InvalidSetup(
                "A team cannot play itself".to_string(),
            ));
        }
        if self.toss_winner != self.team1.id && self.toss_winner != self.team2.id {
            return Err(ScoringError::InvalidSetup(format!(
                "Toss winner {} is not playing this match",
                self.toss_winner
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub match_id: String,
    pub team1: Team,
    pub team2: Team,
    pub overs_limit: u32,
    pub wickets_limit: Option<u32>,
    pub toss_winner: String,
    pub elected_to: TossDecision,
    pub quick_match: bool,
    pub reprompt_batters_each_over: bool,
    pub is_first_inning: bool,
    pub status: MatchStatus,
    /// Team id of the winner
    pub winner: Option<String>,
    pub man_of_the_match: Option<PlayerId>,
    /// First-innings total the chase is measured against
    pub target_baseline: Option<RunningTotal>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: Option<DateTime<Utc>>,
}

impl MatchState {
    pub fn new(match_id: String, setup: MatchSetup, started_at: DateTime<Utc>) -> Self {
        Self {
            match_id,
            team1: setup.team1,
            team2: setup.team2,
            overs_limit: setup.overs_limit,
            wickets_limit: setup.wickets_limit,
            toss_winner: setup.toss_winner,
            elected_to: setup.elected_to,
            quick_match: setup.quick_match,
            reprompt_batters_each_over: setup.reprompt_batters_each_over,
            is_first_inning: true,
            status: MatchStatus::Live,
            winner: None,
            man_of_the_match: None,
            target_baseline: None,
            start_date_time: started_at,
            end_date_time: None,
        }
    }

    pub fn current_innings(&self) -> InningsNumber {
        if self.is_first_inning {
            InningsNumber::First
        } else {
            InningsNumber::Second
        }
    }

    /// The side that bats first: the toss winner if it chose to bat
    pub fn first_batting_team(&self) -> &Team {
        let toss_winner_is_team1 = self.toss_winner == self.team1.id;
        match (self.elected_to, toss_winner_is_team1) {
            (TossDecision::Batting, true) | (TossDecision::Bowling, false) => &self.team1,
            (TossDecision::Batting, false) | (TossDecision::Bowling, true) => &self.team2,
        }
    }

    pub fn batting_team(&self, innings: InningsNumber) -> &Team {
        let first = self.first_batting_team();
        match innings {
            InningsNumber::First => first,
            InningsNumber::Second => self.other_team(&first.id),
        }
    }

    pub fn bowling_team(&self, innings: InningsNumber) -> &Team {
        self.other_team(&self.batting_team(innings).id)
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        [&self.team1, &self.team2]
            .into_iter()
            .find(|team| team.id == team_id)
    }

    fn other_team(&self, team_id: &str) -> &Team {
        if self.team1.id == team_id {
            &self.team2
        } else {
            &self.team1
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Runs the chasing side needs to win
    pub fn target_runs(&self) -> Option<u32> {
        self.target_baseline.map(|baseline| baseline.total_runs + 1)
    }
}
