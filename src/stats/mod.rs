pub mod calculators;
pub mod selector;

pub mod models;
mod tracker;

pub use models::*;
pub use selector::{select_man_of_the_match, ManOfTheMatchSelector};
pub use tracker::PlayerStatsTracker;

/// Priority constants for performance calculators.
/// Lower values run first. Later calculators receive the score
/// accumulated so far and return the adjusted score.
pub mod calculator_priority {
    /// Raw batting and bowling contributions
    pub const BASE_SCORE: u32 = 100;
    /// Rate-based bonuses and penalties (strike rate, economy)
    pub const RATE_ADJUSTMENT: u32 = 200;
}

pub trait PerformanceCalculator: Send + Sync {
    fn calculate(&self, stat: &PlayerMatchStat, current_score: f64) -> f64;

    fn priority(&self) -> u32;

    fn name(&self) -> &'static str;
}
