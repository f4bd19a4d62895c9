use std::sync::Arc;

use super::{
    calculators::{
        BattingImpactCalculator, BowlingImpactCalculator, EconomyTierCalculator,
        StrikeRateTierCalculator,
    },
    PerformanceCalculator, PlayerMatchStat, StatsTable,
};
use crate::scoring::PlayerId;

/// Scores every player through a priority-ordered chain of calculators and
/// picks the best performance.
pub struct ManOfTheMatchSelector {
    calculators: Vec<Arc<dyn PerformanceCalculator>>,
}

impl Default for ManOfTheMatchSelector {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ManOfTheMatchSelector {
    pub fn builder() -> ManOfTheMatchSelectorBuilder {
        ManOfTheMatchSelectorBuilder::new()
    }

    pub fn score(&self, stat: &PlayerMatchStat) -> f64 {
        self.calculators
            .iter()
            .fold(0.0, |score, calculator| calculator.calculate(stat, score))
    }

    /// Highest score wins; on equal scores the player who joined the match
    /// first keeps the award.
    pub fn select(&self, table: &StatsTable) -> Option<PlayerId> {
        let mut best: Option<(&PlayerMatchStat, f64)> = None;

        for stat in table.iter() {
            let score = self.score(stat);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((stat, score)),
            }
        }

        best.map(|(stat, _)| stat.player_id.clone())
    }
}

pub struct ManOfTheMatchSelectorBuilder {
    calculators: Vec<Arc<dyn PerformanceCalculator>>,
}

impl ManOfTheMatchSelectorBuilder {
    fn new() -> Self {
        Self {
            calculators: vec![
                Arc::new(BattingImpactCalculator::new()),
                Arc::new(BowlingImpactCalculator::new()),
                Arc::new(StrikeRateTierCalculator::new()),
                Arc::new(EconomyTierCalculator::new()),
            ],
        }
    }

    pub fn with_calculator(mut self, calculator: Arc<dyn PerformanceCalculator>) -> Self {
        self.calculators.push(calculator);
        self
    }

    pub fn without_defaults(mut self) -> Self {
        self.calculators.clear();
        self
    }

    pub fn build(mut self) -> ManOfTheMatchSelector {
        // Stable sort keeps registration order within a priority
        self.calculators.sort_by_key(|c| c.priority());
        ManOfTheMatchSelector {
            calculators: self.calculators,
        }
    }
}

/// Man of the Match with the default scoring formula
pub fn select_man_of_the_match(table: &StatsTable) -> Option<PlayerId> {
    ManOfTheMatchSelector::default().select(table)
}
