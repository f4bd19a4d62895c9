use super::super::{PerformanceCalculator, PlayerMatchStat};

/// Strike rate only counts once an innings has some substance
const MIN_BALLS_FACED: u32 = 10;

/// (minimum strike rate, adjustment), checked top to bottom
const BONUS_TIERS: [(f64, f64); 3] = [(200.0, 15.0), (150.0, 10.0), (120.0, 5.0)];
/// (strike rate below, adjustment), checked top to bottom
const PENALTY_TIERS: [(f64, f64); 2] = [(50.0, -10.0), (80.0, -5.0)];

pub struct StrikeRateTierCalculator;

impl Default for StrikeRateTierCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl StrikeRateTierCalculator {
    pub fn new() -> Self {
        Self
    }

    fn adjustment(strike_rate: f64) -> f64 {
        if let Some((_, bonus)) = BONUS_TIERS.iter().find(|(min, _)| strike_rate >= *min) {
            return *bonus;
        }
        PENALTY_TIERS
            .iter()
            .find(|(below, _)| strike_rate < *below)
            .map(|(_, penalty)| *penalty)
            .unwrap_or_default()
    }
}

impl PerformanceCalculator for StrikeRateTierCalculator {
    fn calculate(&self, stat: &PlayerMatchStat, current_score: f64) -> f64 {
        if stat.batting.balls_faced < MIN_BALLS_FACED {
            return current_score;
        }
        current_score + Self::adjustment(stat.batting.strike_rate)
    }

    fn priority(&self) -> u32 {
        crate::stats::calculator_priority::RATE_ADJUSTMENT
    }

    fn name(&self) -> &'static str {
        "strike_rate_tier"
    }
}
