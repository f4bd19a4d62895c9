use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ball::{
    BallEvent, BallInput, DismissedBatter, PlayerId, BALLS_PER_OVER, MAX_RUNS_OFF_BAT,
};
use super::errors::{InvalidStateReason, ScoringError};
use super::ledger::{InningsNumber, Ledger};
use super::match_state::{MatchPhase, MatchSetup, MatchState, MatchStatus};
use super::players::{ActivePlayers, Player, PlayerSlot, Role, Team};
use super::running_total::RunningTotal;
use super::state_machine::{self, Transition};
use crate::stats::{select_man_of_the_match, PlayerStatsTracker, StatsTable};

/// Result of a recorded ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallOutcome {
    pub innings: InningsNumber,
    pub over_index: u32,
    /// 1-based position of the ball within its over, extras included
    pub ball_number: usize,
    pub ball: BallEvent,
    pub total: RunningTotal,
    pub transitions: Vec<Transition>,
}

impl BallOutcome {
    pub fn ended_match(&self) -> bool {
        self.transitions.iter().any(Transition::ends_match)
    }
}

/// Result of an undone ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoOutcome {
    pub innings: InningsNumber,
    pub over_index: u32,
    pub ball_number: usize,
    pub ball: BallEvent,
    pub total: RunningTotal,
    /// The undo moved the match back into the first innings or out of a result
    pub reopened: bool,
}

/// One match: its ledger, running totals, player stats and selection state.
///
/// All engine operations go through this value; nothing is shared between
/// sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSession {
    state: MatchState,
    ledger: Ledger,
    totals: [RunningTotal; 2],
    stats: StatsTable,
    active: ActivePlayers,
}

impl MatchSession {
    pub fn start(match_id: String, setup: MatchSetup) -> Result<Self, ScoringError> {
        setup.validate()?;
        let state = MatchState::new(match_id, setup, Utc::now());

        info!(
            match_id = %state.match_id,
            batting_first = %state.first_batting_team().id,
            overs_limit = state.overs_limit,
            quick_match = state.quick_match,
            "Match started"
        );

        Ok(Self {
            state,
            ledger: Ledger::new(),
            totals: [RunningTotal::default(); 2],
            stats: StatsTable::new(),
            active: ActivePlayers::default(),
        })
    }

    pub fn match_id(&self) -> &str {
        &self.state.match_id
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn stats(&self) -> &StatsTable {
        &self.stats
    }

    pub fn active_players(&self) -> &ActivePlayers {
        &self.active
    }

    pub fn totals(&self, innings: InningsNumber) -> RunningTotal {
        match innings {
            InningsNumber::First => self.totals[0],
            InningsNumber::Second => self.totals[1],
        }
    }

    pub fn current_totals(&self) -> RunningTotal {
        self.totals(self.state.current_innings())
    }

    pub fn batting_team(&self) -> &Team {
        self.state.batting_team(self.state.current_innings())
    }

    pub fn bowling_team(&self) -> &Team {
        self.state.bowling_team(self.state.current_innings())
    }

    pub fn phase(&self) -> MatchPhase {
        match self.state.status {
            MatchStatus::Live => {
                let missing = self.active.missing_slots();
                if self.state.quick_match || missing.is_empty() {
                    MatchPhase::Live
                } else {
                    MatchPhase::AwaitingPlayers { missing }
                }
            }
            MatchStatus::InningsBreak => MatchPhase::InningsBreak,
            MatchStatus::Completed => MatchPhase::Completed,
            MatchStatus::Tied => MatchPhase::Tied,
            MatchStatus::NoResult => MatchPhase::NoResult,
        }
    }

    /// Both running totals equal the fold of their ledger innings
    pub fn totals_consistent(&self) -> bool {
        [InningsNumber::First, InningsNumber::Second]
            .into_iter()
            .all(|innings| {
                RunningTotal::from_balls(self.ledger.balls_in_bowling_order(innings))
                    == self.totals(innings)
            })
    }

    /// Fills the given slots. Batters come from the batting side and the
    /// bowler from the bowling side; team membership is checked by the caller
    /// against the roster.
    pub fn select_players(&mut self, assignments: &[(PlayerSlot, Player)]) -> Result<(), ScoringError> {
        if self.state.quick_match {
            return Err(ScoringError::invalid_selection(
                "Quick matches do not track players",
            ));
        }
        if self.state.is_terminal() {
            return Err(ScoringError::InvalidState(InvalidStateReason::MatchOver));
        }

        let mut next = self.active.clone();
        for (slot, player) in assignments {
            if slot.role() == Role::Batter {
                let already_out = self
                    .stats
                    .stats_for(&player.id)
                    .is_some_and(|s| s.batting.is_out && s.team_id == self.batting_team().id);
                if already_out {
                    return Err(ScoringError::invalid_selection(format!(
                        "{} is already out",
                        player.name
                    )));
                }
            }
            match slot {
                PlayerSlot::Striker => next.striker = Some(player.id.clone()),
                PlayerSlot::NonStriker => next.non_striker = Some(player.id.clone()),
                PlayerSlot::Bowler => next.bowler = Some(player.id.clone()),
            }
        }

        if next.striker.is_some() && next.striker == next.non_striker {
            return Err(ScoringError::invalid_selection(
                "Striker and non-striker must be different players",
            ));
        }
        if let Some(bowler) = &next.bowler {
            if next.is_batting(bowler) {
                return Err(ScoringError::invalid_selection(
                    "The bowler cannot also be batting",
                ));
            }
        }

        let batting_team = self.batting_team().id.clone();
        let bowling_team = self.bowling_team().id.clone();
        for (slot, player) in assignments {
            let team_id = match slot {
                PlayerSlot::Bowler => &bowling_team,
                _ => &batting_team,
            };
            if self.stats.ensure_player(&player.id, &player.name, team_id) {
                debug!(match_id = %self.state.match_id, player_id = %player.id, "Stats row created");
            }
        }

        self.active = next;
        Ok(())
    }

    pub fn submit_ball(&mut self, input: &BallInput) -> Result<BallOutcome, ScoringError> {
        if self.state.status != MatchStatus::Live {
            return Err(ScoringError::not_live(self.state.status));
        }

        let tracked = !self.state.quick_match;
        if tracked {
            if let Some(slot) = self.active.missing_slots().first() {
                return Err(ScoringError::missing_player(*slot));
            }
            if input.is_wicket && input.dismissed.is_none() {
                return Err(ScoringError::AmbiguousDismissal);
            }
        }
        if !input.is_wicket && input.dismissed.is_some() {
            return Err(ScoringError::InvalidBall(
                "A dismissed batter was given for a ball that is not a wicket".to_string(),
            ));
        }
        if input.runs_off_bat > MAX_RUNS_OFF_BAT {
            return Err(ScoringError::InvalidBall(format!(
                "{} runs off the bat is more than the {} one ball can score",
                input.runs_off_bat, MAX_RUNS_OFF_BAT
            )));
        }

        let innings = self.state.current_innings();
        let before = self.totals(innings);
        let over_index = before.total_overs;
        let is_legal = input.extra.is_none();

        let dismissed_id = if tracked && input.is_wicket {
            match input.dismissed {
                Some(DismissedBatter::Striker) => self.active.striker.clone(),
                Some(DismissedBatter::NonStriker) => self.active.non_striker.clone(),
                None => None,
            }
        } else {
            None
        };

        let ball = BallEvent {
            runs_off_bat: input.runs_off_bat,
            is_wicket: input.is_wicket,
            extra: input.extra,
            is_over_end: is_legal && before.total_balls == BALLS_PER_OVER - 1,
            striker_id: self.active.striker.clone().filter(|_| tracked),
            non_striker_id: self.active.non_striker.clone().filter(|_| tracked),
            bowler_id: self.active.bowler.clone().filter(|_| tracked),
            dismissed_id,
        };

        let ball_number = self.ledger.append_ball(innings, over_index, ball.clone())?;

        let total = before.apply(&ball);
        self.set_totals(innings, total);

        if tracked {
            self.stats = PlayerStatsTracker::apply_ball(&self.stats, &ball);

            match input.dismissed {
                Some(DismissedBatter::Striker) if ball.is_wicket => self.active.striker = None,
                Some(DismissedBatter::NonStriker) if ball.is_wicket => {
                    self.active.non_striker = None
                }
                _ => {}
            }
            self.active = PlayerStatsTracker::rotate_strike(&self.active, &ball);
        }

        let (next_state, transitions) = state_machine::advance(
            &self.state,
            self.totals[0],
            total,
            over_index,
            &ball,
        );
        self.state = next_state;

        if ball.is_over_end && tracked && self.state.status == MatchStatus::Live {
            self.active.bowler = None;
            if self.state.reprompt_batters_each_over {
                self.active.striker = None;
                self.active.non_striker = None;
            }
        }

        if self.state.status == MatchStatus::InningsBreak {
            self.active.clear();
            info!(
                match_id = %self.state.match_id,
                total = %total,
                target = ?self.state.target_runs(),
                "First innings completed"
            );
        }

        if transitions.iter().any(Transition::ends_match) {
            self.finish();
        }

        debug_assert!(self.totals_consistent());
        debug!(
            match_id = %self.state.match_id,
            innings = %innings,
            over = over_index,
            ball = %ball,
            total = %total,
            "Ball recorded"
        );

        Ok(BallOutcome {
            innings,
            over_index,
            ball_number,
            ball,
            total,
            transitions,
        })
    }

    /// Removes the most recent ball and reverses its effect exactly. When the
    /// second innings has no balls yet, the last first-innings ball is undone.
    pub fn undo_last_ball(&mut self) -> Result<UndoOutcome, ScoringError> {
        if self.state.status == MatchStatus::NoResult {
            return Err(ScoringError::not_live(self.state.status));
        }

        let mut innings = self.state.current_innings();
        if innings == InningsNumber::Second && self.ledger.is_empty(InningsNumber::Second) {
            innings = InningsNumber::First;
        }

        let over = self
            .ledger
            .latest_over(innings)
            .ok_or(ScoringError::NothingToUndo)?;
        let over_index = over.index();
        let ball = over.latest_ball().cloned().ok_or(ScoringError::NothingToUndo)?;

        let runs_earlier_in_over: u32 = over
            .balls()
            .iter()
            .skip(1)
            .filter(|b| b.bowler_id == ball.bowler_id)
            .map(BallEvent::total_runs)
            .sum();

        let tracked = !self.state.quick_match;
        if tracked {
            self.stats = PlayerStatsTracker::reverse_ball(&self.stats, &ball, runs_earlier_in_over);
        }

        let total = self.totals(innings).reverse(&ball);
        self.set_totals(innings, total);

        let (_, ball_number) = self.ledger.remove_last_ball(innings, over_index)?;

        let before = (self.state.status, self.state.is_first_inning);
        self.state = state_machine::rewind(&self.state, innings);
        let reopened = before != (self.state.status, self.state.is_first_inning);

        if tracked {
            self.active = ActivePlayers {
                striker: ball.striker_id.clone(),
                non_striker: ball.non_striker_id.clone(),
                bowler: ball.bowler_id.clone(),
            };
        }

        debug_assert!(self.totals_consistent());
        info!(
            match_id = %self.state.match_id,
            innings = %innings,
            over = over_index,
            ball = %ball,
            total = %total,
            reopened,
            "Ball undone"
        );

        Ok(UndoOutcome {
            innings,
            over_index,
            ball_number,
            ball,
            total,
            reopened,
        })
    }

    pub fn begin_second_innings(&mut self) -> Result<(), ScoringError> {
        if self.state.status != MatchStatus::InningsBreak {
            return Err(ScoringError::InvalidState(
                InvalidStateReason::NotAtInningsBreak(self.state.status),
            ));
        }
        self.state.status = MatchStatus::Live;
        info!(
            match_id = %self.state.match_id,
            chasing = %self.batting_team().id,
            target = ?self.state.target_runs(),
            "Second innings started"
        );
        Ok(())
    }

    pub fn abandon(&mut self) -> Result<(), ScoringError> {
        if self.state.is_terminal() {
            return Err(ScoringError::InvalidState(InvalidStateReason::MatchOver));
        }
        self.state.status = MatchStatus::NoResult;
        self.state.end_date_time = Some(Utc::now());
        self.active.clear();
        info!(match_id = %self.state.match_id, "Match abandoned");
        Ok(())
    }

    fn finish(&mut self) {
        if !self.state.quick_match {
            self.state.man_of_the_match = select_man_of_the_match(&self.stats);
        }
        self.state.end_date_time = Some(Utc::now());
        self.active.clear();

        info!(
            match_id = %self.state.match_id,
            status = %self.state.status,
            winner = ?self.state.winner,
            man_of_the_match = ?self.state.man_of_the_match,
            "Match ended"
        );
    }

    fn set_totals(&mut self, innings: InningsNumber, total: RunningTotal) {
        match innings {
            InningsNumber::First => self.totals[0] = total,
            InningsNumber::Second => self.totals[1] = total,
        }
    }

    pub fn player_name(&self, player_id: &PlayerId) -> Option<&str> {
        self.stats.stats_for(player_id).map(|s| s.name.as_str())
    }
}
