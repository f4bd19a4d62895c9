use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use super::events::MatchResult;

/// Side effect run once each time a match reaches a result
#[async_trait]
pub trait MatchEndSignal: Send + Sync {
    async fn match_ended(&self, result: &MatchResult);

    fn name(&self) -> &'static str;
}

/// Logs the result and counts how often it fired
#[derive(Debug, Default)]
pub struct LoggingMatchEndSignal {
    fired: AtomicUsize,
}

impl LoggingMatchEndSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fired_count(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchEndSignal for LoggingMatchEndSignal {
    async fn match_ended(&self, result: &MatchResult) {
        self.fired.fetch_add(1, Ordering::SeqCst);
        info!(
            match_id = %result.match_id,
            status = %result.status,
            winner = ?result.winner,
            first_innings = %result.first_innings,
            second_innings = %result.second_innings,
            "Match result recorded"
        );
    }

    fn name(&self) -> &'static str {
        "LoggingMatchEndSignal"
    }
}
