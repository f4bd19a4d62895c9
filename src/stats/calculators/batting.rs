use super::super::{PerformanceCalculator, PlayerMatchStat};

const RUN_WEIGHT: f64 = 1.2;
const FOUR_WEIGHT: f64 = 1.5;
const SIX_WEIGHT: f64 = 3.0;
const BALL_FACED_WEIGHT: f64 = 0.5;
const NOT_OUT_BONUS: f64 = 5.0;

pub struct BattingImpactCalculator;

impl Default for BattingImpactCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl BattingImpactCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl PerformanceCalculator for BattingImpactCalculator {
    fn calculate(&self, stat: &PlayerMatchStat, current_score: f64) -> f64 {
        let batting = &stat.batting;
        if !stat.has_batted() {
            return current_score;
        }

        let mut score = batting.runs as f64 * RUN_WEIGHT
            + batting.fours as f64 * FOUR_WEIGHT
            + batting.sixes as f64 * SIX_WEIGHT
            + batting.balls_faced as f64 * BALL_FACED_WEIGHT;

        if !batting.is_out {
            score += NOT_OUT_BONUS;
        }

        current_score + score
    }

    fn priority(&self) -> u32 {
        crate::stats::calculator_priority::BASE_SCORE
    }

    fn name(&self) -> &'static str {
        "batting_impact"
    }
}
