pub mod actions;
pub mod ball_sequences;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::{bowl, bowl_all, fill_missing_players, start_second_innings};
#[allow(unused_imports)]
pub use ball_sequences::BallSequenceBuilder;
#[allow(unused_imports)]
pub use mocks::RecordingMatchEndSignal;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
