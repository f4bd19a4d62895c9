// Match events for scoreboard readers and the match-end signal.

pub use bus::EventBus;
pub use events::{MatchEvent, MatchResult};
pub use handler::{LoggingMatchEndSignal, MatchEndSignal};

mod bus;
mod events;
mod handler;
