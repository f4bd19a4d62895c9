use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::scoring::{PlayerId, BALLS_PER_OVER};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattingStats {
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    /// Runs per hundred balls; 0.0 until a legal ball has been faced
    pub strike_rate: f64,
    pub is_out: bool,
}

impl BattingStats {
    pub(crate) fn recompute(&mut self) {
        self.strike_rate = if self.balls_faced == 0 {
            0.0
        } else {
            self.runs as f64 / self.balls_faced as f64 * 100.0
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BowlingStats {
    pub overs_bowled: u32,
    pub balls_bowled_in_current_over: u32,
    pub runs_conceded: u32,
    pub runs_in_current_over: u32,
    pub wickets: u32,
    pub extras: u32,
    pub fours_conceded: u32,
    pub sixes_conceded: u32,
    pub dot_balls: u32,
    pub maidens: u32,
    /// Runs over the part of the current over bowled so far; once the over
    /// closes, runs over completed overs (at least one)
    pub bowling_economy: f64,
}

impl BowlingStats {
    pub fn legal_balls(&self) -> u32 {
        self.overs_bowled * BALLS_PER_OVER + self.balls_bowled_in_current_over
    }

    pub fn has_bowled(&self) -> bool {
        self.legal_balls() > 0 || self.runs_conceded > 0 || self.extras > 0
    }

    pub(crate) fn recompute(&mut self) {
        let overs = if self.balls_bowled_in_current_over > 0 {
            self.balls_bowled_in_current_over as f64 / BALLS_PER_OVER as f64
        } else {
            self.overs_bowled.max(1) as f64
        };
        self.bowling_economy = self.runs_conceded as f64 / overs;
    }
}

/// A player's batting and bowling figures for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatchStat {
    pub player_id: PlayerId,
    pub name: String,
    pub team_id: String,
    pub batting: BattingStats,
    pub bowling: BowlingStats,
}

impl PlayerMatchStat {
    pub fn new(player_id: PlayerId, name: String, team_id: String) -> Self {
        Self {
            player_id,
            name,
            team_id,
            batting: BattingStats::default(),
            bowling: BowlingStats::default(),
        }
    }

    pub fn has_batted(&self) -> bool {
        self.batting.balls_faced > 0 || self.batting.runs > 0 || self.batting.is_out
    }
}

/// Per-match stats keyed by player id, iterated in the order players first
/// joined the match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PlayerMatchStat>", into = "Vec<PlayerMatchStat>")]
pub struct StatsTable {
    rows: Vec<PlayerMatchStat>,
    index: HashMap<PlayerId, usize>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the row on first involvement; existing rows are left untouched
    pub fn ensure_player(&mut self, player_id: &str, name: &str, team_id: &str) -> bool {
        if self.index.contains_key(player_id) {
            return false;
        }
        self.index.insert(player_id.to_string(), self.rows.len());
        self.rows.push(PlayerMatchStat::new(
            player_id.to_string(),
            name.to_string(),
            team_id.to_string(),
        ));
        true
    }

    pub fn stats_for(&self, player_id: &str) -> Option<&PlayerMatchStat> {
        self.index.get(player_id).map(|&i| &self.rows[i])
    }

    pub fn stats_for_mut(&mut self, player_id: &str) -> Option<&mut PlayerMatchStat> {
        match self.index.get(player_id) {
            Some(&i) => self.rows.get_mut(i),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerMatchStat> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<PlayerMatchStat>> for StatsTable {
    fn from(rows: Vec<PlayerMatchStat>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.player_id.clone(), i))
            .collect();
        Self { rows, index }
    }
}

impl From<StatsTable> for Vec<PlayerMatchStat> {
    fn from(table: StatsTable) -> Self {
        table.rows
    }
}
