use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use scorebook::{MatchEndSignal, MatchResult};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Keeps every result it is signalled with
#[derive(Clone, Default)]
pub struct RecordingMatchEndSignal {
    results: Arc<RwLock<Vec<MatchResult>>>,
}

impl RecordingMatchEndSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn results(&self) -> Vec<MatchResult> {
        self.results.read().await.clone()
    }

    pub async fn fired_count(&self) -> usize {
        self.results.read().await.len()
    }
}

#[async_trait]
impl MatchEndSignal for RecordingMatchEndSignal {
    async fn match_ended(&self, result: &MatchResult) {
        self.results.write().await.push(result.clone());
    }

    fn name(&self) -> &'static str {
        "RecordingMatchEndSignal"
    }
}
