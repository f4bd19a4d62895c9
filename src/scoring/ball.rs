use serde::{Deserialize, Serialize};
use std::fmt;

pub type PlayerId = String;

/// Balls that make up one legal over
pub const BALLS_PER_OVER: u32 = 6;

/// Most runs a single delivery can be credited off the bat
pub const MAX_RUNS_OFF_BAT: u32 = 7;

/// An extra that is added to the batter's runs and does not count as a legal delivery.
///
/// Modelled as a single optional value so a ball can never be both a no-ball and a wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extra {
    NoBall,
    Wide,
}

/// Which of the two batters was dismissed on a wicket ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissedBatter {
    Striker,
    NonStriker,
}

/// What the scorer submits for one delivery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallInput {
    pub runs_off_bat: u32,
    #[serde(default)]
    pub is_wicket: bool,
    #[serde(default)]
    pub extra: Option<Extra>,
    #[serde(default)]
    pub dismissed: Option<DismissedBatter>,
}

impl BallInput {
    pub fn runs(runs_off_bat: u32) -> Self {
        Self {
            runs_off_bat,
            ..Self::default()
        }
    }

    pub fn dot() -> Self {
        Self::runs(0)
    }

    pub fn no_ball(runs_off_bat: u32) -> Self {
        Self::runs(runs_off_bat).with_extra(Extra::NoBall)
    }

    pub fn wide(runs_off_bat: u32) -> Self {
        Self::runs(runs_off_bat).with_extra(Extra::Wide)
    }

    pub fn wicket(dismissed: DismissedBatter) -> Self {
        Self {
            is_wicket: true,
            dismissed: Some(dismissed),
            ..Self::default()
        }
    }

    /// Setting an extra replaces any previous one
    pub fn with_extra(mut self, extra: Extra) -> Self {
        self.extra = Some(extra);
        self
    }

    pub fn with_wicket(mut self, dismissed: Option<DismissedBatter>) -> Self {
        self.is_wicket = true;
        self.dismissed = dismissed;
        self
    }
}

/// One recorded delivery. Immutable once it is in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallEvent {
    pub runs_off_bat: u32,
    pub is_wicket: bool,
    pub extra: Option<Extra>,
    pub is_over_end: bool,
    pub striker_id: Option<PlayerId>,
    pub non_striker_id: Option<PlayerId>,
    pub bowler_id: Option<PlayerId>,
    pub dismissed_id: Option<PlayerId>,
}

impl BallEvent {
    pub fn is_no_ball(&self) -> bool {
        self.extra == Some(Extra::NoBall)
    }

    pub fn is_wide_ball(&self) -> bool {
        self.extra == Some(Extra::Wide)
    }

    /// Counts toward the six balls of an over
    pub fn is_legal(&self) -> bool {
        self.extra.is_none()
    }

    pub fn extra_runs(&self) -> u32 {
        u32::from(self.extra.is_some())
    }

    pub fn total_runs(&self) -> u32 {
        self.runs_off_bat + self.extra_runs()
    }

    pub fn is_four(&self) -> bool {
        self.runs_off_bat == 4
    }

    pub fn is_six(&self) -> bool {
        self.runs_off_bat == 6
    }

    /// Short scorecard notation, e.g. `.`, `4`, `W`, `2nb`, `1wd`
    pub fn notation(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.extra {
            Some(Extra::NoBall) => "nb",
            Some(Extra::Wide) => "wd",
            None => "",
        };

        if self.is_wicket {
            if self.total_runs() > 0 {
                write!(f, "W+{}{}", self.total_runs(), suffix)
            } else {
                write!(f, "W{}", suffix)
            }
        } else if self.extra.is_some() {
            write!(f, "{}{}", self.total_runs(), suffix)
        } else if self.runs_off_bat == 0 {
            write!(f, ".")
        } else {
            write!(f, "{}", self.runs_off_bat)
        }
    }
}
