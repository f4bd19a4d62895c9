use super::super::{PerformanceCalculator, PlayerMatchStat};

const WICKET_WEIGHT: f64 = 8.0;
const MAIDEN_WEIGHT: f64 = 6.0;
const RUN_CONCEDED_PENALTY: f64 = 0.4;
const FOUR_CONCEDED_PENALTY: f64 = 1.0;
const SIX_CONCEDED_PENALTY: f64 = 2.0;
const DOT_BALL_WEIGHT: f64 = 1.5;
const EXTRA_PENALTY: f64 = 1.5;

pub struct BowlingImpactCalculator;

impl Default for BowlingImpactCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl BowlingImpactCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl PerformanceCalculator for BowlingImpactCalculator {
    fn calculate(&self, stat: &PlayerMatchStat, current_score: f64) -> f64 {
        let bowling = &stat.bowling;
        if !bowling.has_bowled() {
            return current_score;
        }

        let score = bowling.wickets as f64 * WICKET_WEIGHT
            + bowling.maidens as f64 * MAIDEN_WEIGHT
            + bowling.dot_balls as f64 * DOT_BALL_WEIGHT
            - bowling.runs_conceded as f64 * RUN_CONCEDED_PENALTY
            - bowling.fours_conceded as f64 * FOUR_CONCEDED_PENALTY
            - bowling.sixes_conceded as f64 * SIX_CONCEDED_PENALTY
            - bowling.extras as f64 * EXTRA_PENALTY;

        current_score + score
    }

    fn priority(&self) -> u32 {
        crate::stats::calculator_priority::BASE_SCORE
    }

    fn name(&self) -> &'static str {
        "bowling_impact"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::BowlingStats;

    #[test]
    fn rewards_wickets_maidens_and_dots() {
        let mut stat = PlayerMatchStat::new("p".into(), "P".into(), "t".into());
        stat.bowling = BowlingStats {
            overs_bowled: 4,
            runs_conceded: 20,
            wickets: 3,
            maidens: 1,
            dot_balls: 12,
            fours_conceded: 2,
            sixes_conceded: 1,
            extras: 2,
            ..BowlingStats::default()
        };

        // 24 + 6 + 18 - 8 - 2 - 2 - 3
        let score = BowlingImpactCalculator::new().calculate(&stat, 0.0);
        assert!((score - 33.0).abs() < 1e-9);
    }

    #[test]
    fn non_bowler_keeps_current_score() {
        let stat = PlayerMatchStat::new("p".into(), "P".into(), "t".into());
        assert_eq!(BowlingImpactCalculator::new().calculate(&stat, 12.5), 12.5);
    }
}
