use serde::{Deserialize, Serialize};
use std::fmt;

use super::ball::{BallEvent, BALLS_PER_OVER};

/// Denormalized innings score. Always equal to the fold of the innings' balls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunningTotal {
    pub total_runs: u32,
    pub total_wickets: u32,
    pub total_overs: u32,
    /// Legal balls bowled in the current over, 0..=5
    pub total_balls: u32,
}

impl RunningTotal {
    pub fn from_balls<'a>(balls: impl IntoIterator<Item = &'a BallEvent>) -> Self {
        balls
            .into_iter()
            .fold(Self::default(), |total, ball| total.apply(ball))
    }

    pub fn apply(self, ball: &BallEvent) -> Self {
        let mut next = self;
        next.total_runs += ball.total_runs();
        next.total_wickets += u32::from(ball.is_wicket);

        if ball.is_legal() {
            next.total_balls += 1;
            if next.total_balls == BALLS_PER_OVER {
                next.total_overs += 1;
                next.total_balls = 0;
            }
        }

        next
    }

    /// Exact inverse of [`RunningTotal::apply`] for the most recent ball
    pub fn reverse(self, ball: &BallEvent) -> Self {
        let mut previous = self;
        previous.total_runs = previous.total_runs.saturating_sub(ball.total_runs());
        previous.total_wickets = previous
            .total_wickets
            .saturating_sub(u32::from(ball.is_wicket));

        if ball.is_legal() {
            if previous.total_balls == 0 {
                previous.total_overs = previous.total_overs.saturating_sub(1);
                previous.total_balls = BALLS_PER_OVER - 1;
            } else {
                previous.total_balls -= 1;
            }
        }

        previous
    }

    pub fn legal_balls(&self) -> u32 {
        self.total_overs * BALLS_PER_OVER + self.total_balls
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overs in scorecard notation, e.g. `12.3`
    pub fn overs_display(&self) -> String {
        format!("{}.{}", self.total_overs, self.total_balls)
    }

    /// Runs per over, 0.0 before any legal ball
    pub fn run_rate(&self) -> f64 {
        let balls = self.legal_balls();
        if balls == 0 {
            0.0
        } else {
            self.total_runs as f64 * BALLS_PER_OVER as f64 / balls as f64
        }
    }
}

impl fmt::Display for RunningTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({})",
            self.total_runs,
            self.total_wickets,
            self.overs_display()
        )
    }
}
