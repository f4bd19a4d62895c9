mod batting;
mod bowling;
mod economy;
mod strike_rate;

pub use batting::BattingImpactCalculator;
pub use bowling::BowlingImpactCalculator;
pub use economy::EconomyTierCalculator;
pub use strike_rate::StrikeRateTierCalculator;
