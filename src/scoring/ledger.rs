use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

use super::ball::{BallEvent, BALLS_PER_OVER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InningsNumber {
    First,
    Second,
}

impl InningsNumber {
    pub fn number(self) -> u8 {
        match self {
            InningsNumber::First => 1,
            InningsNumber::Second => 2,
        }
    }

    fn slot(self) -> usize {
        match self {
            InningsNumber::First => 0,
            InningsNumber::Second => 1,
        }
    }
}

impl fmt::Display for InningsNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Over {requested} cannot be opened in innings {innings}: next over is {expected}")]
    OverOutOfSequence {
        innings: InningsNumber,
        requested: u32,
        expected: u32,
    },

    #[error("Over {over} in innings {innings} already has six legal balls")]
    OverAlreadyComplete { innings: InningsNumber, over: u32 },

    #[error("Over {over} in innings {innings} is not the latest over")]
    NotLatestOver { innings: InningsNumber, over: u32 },

    #[error("Over {over} in innings {innings} does not exist")]
    OverNotFound { innings: InningsNumber, over: u32 },
}

/// One bowler's set of deliveries. Balls are kept most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Over {
    index: u32,
    balls: VecDeque<BallEvent>,
}

impl Over {
    fn new(index: u32) -> Self {
        Self {
            index,
            balls: VecDeque::new(),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Most recent ball first
    pub fn balls(&self) -> &VecDeque<BallEvent> {
        &self.balls
    }

    /// Oldest ball first, the order they were bowled in
    pub fn balls_in_bowling_order(&self) -> impl Iterator<Item = &BallEvent> {
        self.balls.iter().rev()
    }

    pub fn latest_ball(&self) -> Option<&BallEvent> {
        self.balls.front()
    }

    pub fn legal_balls(&self) -> u32 {
        self.balls.iter().filter(|b| b.is_legal()).count() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.legal_balls() >= BALLS_PER_OVER
    }

    pub fn runs(&self) -> u32 {
        self.balls.iter().map(BallEvent::total_runs).sum()
    }

    pub fn wickets(&self) -> u32 {
        self.balls.iter().filter(|b| b.is_wicket).count() as u32
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }
}

/// Overs of both innings, oldest over first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    innings: [Vec<Over>; 2],
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a ball and returns its 1-based position in the over.
    ///
    /// The first ball of a new over creates the over; a new over may only be
    /// opened once the previous one holds six legal balls.
    pub fn append_ball(
        &mut self,
        innings: InningsNumber,
        over_index: u32,
        ball: BallEvent,
    ) -> Result<usize, LedgerError> {
        let overs = &mut self.innings[innings.slot()];

        match overs.last() {
            Some(last) if last.index == over_index => {
                if last.is_complete() {
                    return Err(LedgerError::OverAlreadyComplete {
                        innings,
                        over: over_index,
                    });
                }
            }
            Some(last) => {
                let expected = if last.is_complete() {
                    last.index + 1
                } else {
                    last.index
                };
                if over_index != expected || !last.is_complete() {
                    return Err(LedgerError::OverOutOfSequence {
                        innings,
                        requested: over_index,
                        expected,
                    });
                }
                overs.push(Over::new(over_index));
            }
            None => {
                if over_index != 0 {
                    return Err(LedgerError::OverOutOfSequence {
                        innings,
                        requested: over_index,
                        expected: 0,
                    });
                }
                overs.push(Over::new(over_index));
            }
        }

        // Both arms above leave the target over at the end
        let over = overs
            .last_mut()
            .ok_or(LedgerError::OverNotFound {
                innings,
                over: over_index,
            })?;
        over.balls.push_front(ball);
        Ok(over.balls.len())
    }

    /// Removes the most recent ball of the latest over, dropping the over
    /// record once it is empty. Returns the ball and the 1-based position it
    /// occupied.
    pub fn remove_last_ball(
        &mut self,
        innings: InningsNumber,
        over_index: u32,
    ) -> Result<(BallEvent, usize), LedgerError> {
        let overs = &mut self.innings[innings.slot()];

        let latest_index = overs.last().map(|o| o.index);
        if latest_index != Some(over_index) {
            if overs.iter().any(|o| o.index == over_index) {
                return Err(LedgerError::NotLatestOver {
                    innings,
                    over: over_index,
                });
            }
            return Err(LedgerError::OverNotFound {
                innings,
                over: over_index,
            });
        }

        let over = overs.last_mut().ok_or(LedgerError::OverNotFound {
            innings,
            over: over_index,
        })?;

        let position = over.balls.len();
        let ball = over.balls.pop_front().ok_or(LedgerError::OverNotFound {
            innings,
            over: over_index,
        })?;

        if over.balls.is_empty() {
            overs.pop();
        }

        Ok((ball, position))
    }

    pub fn get_over(&self, innings: InningsNumber, over_index: u32) -> Option<&Over> {
        self.innings[innings.slot()]
            .iter()
            .find(|o| o.index == over_index)
    }

    pub fn get_innings(&self, innings: InningsNumber) -> &[Over] {
        &self.innings[innings.slot()]
    }

    pub fn latest_over(&self, innings: InningsNumber) -> Option<&Over> {
        self.innings[innings.slot()].last()
    }

    pub fn ball_count(&self, innings: InningsNumber) -> usize {
        self.innings[innings.slot()].iter().map(Over::len).sum()
    }

    pub fn is_empty(&self, innings: InningsNumber) -> bool {
        self.innings[innings.slot()].is_empty()
    }

    /// Every ball of the innings in bowling order
    pub fn balls_in_bowling_order(
        &self,
        innings: InningsNumber,
    ) -> impl Iterator<Item = &BallEvent> {
        self.innings[innings.slot()]
            .iter()
            .flat_map(|over| over.balls_in_bowling_order())
    }
}
