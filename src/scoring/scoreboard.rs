use serde::{Deserialize, Serialize};

use super::ball::{PlayerId, BALLS_PER_OVER};
use super::ledger::{InningsNumber, Over};
use super::match_state::{MatchPhase, MatchStatus};
use super::players::ActivePlayers;
use super::running_total::RunningTotal;
use super::session::MatchSession;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtrasSummary {
    pub no_balls: u32,
    pub wides: u32,
}

impl ExtrasSummary {
    pub fn total(&self) -> u32 {
        self.no_balls + self.wides
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverSummary {
    pub index: u32,
    pub bowler_id: Option<PlayerId>,
    pub runs: u32,
    pub wickets: u32,
    /// Ball notations in bowling order, e.g. `[".", "4", "1wd", "W"]`
    pub balls: Vec<String>,
}

impl From<&Over> for OverSummary {
    fn from(over: &Over) -> Self {
        Self {
            index: over.index(),
            bowler_id: over
                .balls_in_bowling_order()
                .next()
                .and_then(|ball| ball.bowler_id.clone()),
            runs: over.runs(),
            wickets: over.wickets(),
            balls: over.balls_in_bowling_order().map(|b| b.notation()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningsCard {
    pub innings: InningsNumber,
    pub batting_team_id: String,
    pub total: RunningTotal,
    pub overs: String,
    pub run_rate: f64,
    pub extras: ExtrasSummary,
    pub over_summaries: Vec<OverSummary>,
}

/// Read-only view of a match for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub match_id: String,
    pub status: MatchStatus,
    pub phase: MatchPhase,
    pub overs_limit: u32,
    pub innings: Vec<InningsCard>,
    pub target: Option<u32>,
    /// Runs per over the chasing side still needs; 0.0 once no balls remain
    pub required_run_rate: Option<f64>,
    pub winner: Option<String>,
    pub man_of_the_match: Option<PlayerId>,
    pub active_players: ActivePlayers,
}

impl Scoreboard {
    pub fn from_session(session: &MatchSession) -> Self {
        let state = session.state();

        let mut innings = vec![innings_card(session, InningsNumber::First)];
        if !state.is_first_inning {
            innings.push(innings_card(session, InningsNumber::Second));
        }

        let required_run_rate = match (state.target_runs(), state.status) {
            (Some(target), MatchStatus::Live) => {
                let chase = session.totals(InningsNumber::Second);
                let remaining_balls =
                    (state.overs_limit * BALLS_PER_OVER).saturating_sub(chase.legal_balls());
                let needed = target.saturating_sub(chase.total_runs);
                Some(if remaining_balls == 0 {
                    0.0
                } else {
                    needed as f64 * BALLS_PER_OVER as f64 / remaining_balls as f64
                })
            }
            _ => None,
        };

        Self {
            match_id: state.match_id.clone(),
            status: state.status,
            phase: session.phase(),
            overs_limit: state.overs_limit,
            innings,
            target: state.target_runs(),
            required_run_rate,
            winner: state.winner.clone(),
            man_of_the_match: state.man_of_the_match.clone(),
            active_players: session.active_players().clone(),
        }
    }
}

fn innings_card(session: &MatchSession, innings: InningsNumber) -> InningsCard {
    let total = session.totals(innings);
    let ledger = session.ledger();

    let extras = ledger
        .balls_in_bowling_order(innings)
        .fold(ExtrasSummary::default(), |mut extras, ball| {
            if ball.is_no_ball() {
                extras.no_balls += ball.extra_runs();
            } else if ball.is_wide_ball() {
                extras.wides += ball.extra_runs();
            }
            extras
        });

    InningsCard {
        innings,
        batting_team_id: session.state().batting_team(innings).id.clone(),
        total,
        overs: total.overs_display(),
        run_rate: total.run_rate(),
        extras,
        over_summaries: ledger
            .get_innings(innings)
            .iter()
            .map(OverSummary::from)
            .collect(),
    }
}
