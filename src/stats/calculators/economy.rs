use super::super::{PerformanceCalculator, PlayerMatchStat};

/// Two overs before economy is judged
const MIN_LEGAL_BALLS: u32 = 12;

/// (economy below, adjustment), checked top to bottom
const BONUS_TIERS: [(f64, f64); 3] = [(4.0, 15.0), (6.0, 10.0), (8.0, 5.0)];
/// (economy above, adjustment), checked top to bottom
const PENALTY_TIERS: [(f64, f64); 2] = [(12.0, -10.0), (10.0, -5.0)];

pub struct EconomyTierCalculator;

impl Default for EconomyTierCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl EconomyTierCalculator {
    pub fn new() -> Self {
        Self
    }

    fn adjustment(economy: f64) -> f64 {
        if let Some((_, bonus)) = BONUS_TIERS.iter().find(|(below, _)| economy < *below) {
            return *bonus;
        }
        PENALTY_TIERS
            .iter()
            .find(|(above, _)| economy > *above)
            .map(|(_, penalty)| *penalty)
            .unwrap_or_default()
    }
}

impl PerformanceCalculator for EconomyTierCalculator {
    fn calculate(&self, stat: &PlayerMatchStat, current_score: f64) -> f64 {
        if stat.bowling.legal_balls() < MIN_LEGAL_BALLS {
            return current_score;
        }
        current_score + Self::adjustment(stat.bowling.bowling_economy)
    }

    fn priority(&self) -> u32 {
        crate::stats::calculator_priority::RATE_ADJUSTMENT
    }

    fn name(&self) -> &'static str {
        "economy_tier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(3.5, 15.0)]
    #[case(5.0, 10.0)]
    #[case(7.9, 5.0)]
    #[case(9.0, 0.0)]
    #[case(11.0, -5.0)]
    #[case(14.0, -10.0)]
    fn applies_tiers(#[case] economy: f64, #[case] expected: f64) {
        let mut stat = PlayerMatchStat::new("p".into(), "P".into(), "t".into());
        stat.bowling.overs_bowled = 3;
        stat.bowling.bowling_economy = economy;
        assert_eq!(EconomyTierCalculator::new().calculate(&stat, 0.0), expected);
    }

    #[test]
    fn one_over_spell_is_not_adjusted() {
        let mut stat = PlayerMatchStat::new("p".into(), "P".into(), "t".into());
        stat.bowling.overs_bowled = 1;
        stat.bowling.bowling_economy = 2.0;
        assert_eq!(EconomyTierCalculator::new().calculate(&stat, 4.0), 4.0);
    }
}
