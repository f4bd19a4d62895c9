//! Pure innings/match transitions driven by the running totals after a ball.

use serde::{Deserialize, Serialize};

use super::ball::BallEvent;
use super::ledger::InningsNumber;
use super::match_state::{MatchState, MatchStatus};
use super::running_total::RunningTotal;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    OverCompleted {
        innings: InningsNumber,
        over_index: u32,
    },
    InningsCompleted {
        innings: InningsNumber,
        total: RunningTotal,
    },
    ChaseAchieved {
        winner: String,
    },
    TargetDefended {
        winner: String,
    },
    MatchTied,
}

impl Transition {
    pub fn ends_match(&self) -> bool {
        matches!(
            self,
            Transition::ChaseAchieved { .. }
                | Transition::TargetDefended { .. }
                | Transition::MatchTied
        )
    }
}

/// All overs bowled, or the wicket limit reached when one is set.
/// An innings with no balls is never exhausted.
pub fn innings_exhausted(state: &MatchState, total: &RunningTotal) -> bool {
    if total.is_empty() {
        return false;
    }
    let overs_done = total.total_overs >= state.overs_limit && total.total_balls == 0;
    let all_out = state
        .wickets_limit
        .is_some_and(|limit| total.total_wickets >= limit);
    overs_done || all_out
}

/// Computes the state after `ball` was applied to `current` (the running
/// total of the innings in progress).
pub fn advance(
    state: &MatchState,
    first_innings: RunningTotal,
    current: RunningTotal,
    over_index: u32,
    ball: &BallEvent,
) -> (MatchState, Vec<Transition>) {
    let mut next = state.clone();
    let mut transitions = Vec::new();
    let innings = state.current_innings();

    if ball.is_over_end {
        transitions.push(Transition::OverCompleted {
            innings,
            over_index,
        });
    }

    match innings {
        InningsNumber::First => {
            if innings_exhausted(state, &current) {
                next.is_first_inning = false;
                next.status = MatchStatus::InningsBreak;
                next.target_baseline = Some(current);
                transitions.push(Transition::InningsCompleted {
                    innings,
                    total: current,
                });
            }
        }
        InningsNumber::Second => {
            let baseline = state.target_baseline.unwrap_or(first_innings);
            let chasing = state.batting_team(InningsNumber::Second).id.clone();
            let defending = state.batting_team(InningsNumber::First).id.clone();

            if current.total_runs > baseline.total_runs {
                next.status = MatchStatus::Completed;
                next.winner = Some(chasing.clone());
                transitions.push(Transition::InningsCompleted {
                    innings,
                    total: current,
                });
                transitions.push(Transition::ChaseAchieved { winner: chasing });
            } else if innings_exhausted(state, &current) {
                transitions.push(Transition::InningsCompleted {
                    innings,
                    total: current,
                });
                if current.total_runs == baseline.total_runs {
                    next.status = MatchStatus::Tied;
                    next.winner = None;
                    transitions.push(Transition::MatchTied);
                } else {
                    next.status = MatchStatus::Completed;
                    next.winner = Some(defending.clone());
                    transitions.push(Transition::TargetDefended { winner: defending });
                }
            }
        }
    }

    (next, transitions)
}

/// Reverts whatever innings or match transition the removed ball caused.
/// `undone_innings` is the innings the ball was taken from.
pub fn rewind(state: &MatchState, undone_innings: InningsNumber) -> MatchState {
    let mut previous = state.clone();

    if previous.status.is_terminal() {
        previous.status = MatchStatus::Live;
        previous.winner = None;
        previous.man_of_the_match = None;
        previous.end_date_time = None;
    }

    if undone_innings == InningsNumber::First && !state.is_first_inning {
        previous.is_first_inning = true;
        previous.status = MatchStatus::Live;
        previous.target_baseline = None;
    }

    previous
}
