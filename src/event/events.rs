use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{BallEvent, InningsNumber, MatchStatus, PlayerId, RunningTotal};

/// Final outcome handed to match-end listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: String,
    pub status: MatchStatus,
    pub winner: Option<String>,
    pub man_of_the_match: Option<PlayerId>,
    pub first_innings: RunningTotal,
    pub second_innings: RunningTotal,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Things that have already happened to a match.
///
/// Published on the match's channel after the change is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    BallRecorded {
        match_id: String,
        innings: InningsNumber,
        over_index: u32,
        ball: BallEvent,
        total: RunningTotal,
    },

    BallUndone {
        match_id: String,
        innings: InningsNumber,
        over_index: u32,
        ball: BallEvent,
        total: RunningTotal,
    },

    OverCompleted {
        match_id: String,
        innings: InningsNumber,
        over_index: u32,
    },

    InningsCompleted {
        match_id: String,
        innings: InningsNumber,
        total: RunningTotal,
    },

    MatchEnded {
        match_id: String,
        result: MatchResult,
    },

    MatchAbandoned {
        match_id: String,
    },
}

impl MatchEvent {
    pub fn match_id(&self) -> &str {
        match self {
            MatchEvent::BallRecorded { match_id, .. } => match_id,
            MatchEvent::BallUndone { match_id, .. } => match_id,
            MatchEvent::OverCompleted { match_id, .. } => match_id,
            MatchEvent::InningsCompleted { match_id, .. } => match_id,
            MatchEvent::MatchEnded { match_id, .. } => match_id,
            MatchEvent::MatchAbandoned { match_id } => match_id,
        }
    }
}
