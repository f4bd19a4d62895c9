use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{BallAddress, PersistenceError, PersistenceSink};
use crate::scoring::{BallEvent, MatchState};
use crate::stats::StatsTable;

/// Over documents keyed by over key; balls inside keyed by insertion position
type OverDocuments = HashMap<String, BTreeMap<usize, Value>>;

/// Keeps every written document as JSON in memory
#[derive(Debug, Default)]
pub struct InMemoryPersistenceSink {
    overs: Arc<RwLock<OverDocuments>>,
    match_states: Arc<RwLock<HashMap<String, Value>>>,
    player_stats: Arc<RwLock<HashMap<String, Value>>>,
    reject_writes: AtomicBool,
}

impl InMemoryPersistenceSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every write fails with [`PersistenceError::Rejected`]
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn check_accepting(&self) -> Result<(), PersistenceError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            warn!("In-memory sink is rejecting writes");
            return Err(PersistenceError::Rejected(
                "sink is not accepting writes".to_string(),
            ));
        }
        Ok(())
    }

    /// Balls of one over document as `(ball_{n}, document)` in insertion order
    pub async fn over_document(&self, over_key: &str) -> Vec<(String, Value)> {
        let overs = self.overs.read().await;
        overs
            .get(over_key)
            .map(|balls| {
                balls
                    .iter()
                    .map(|(number, doc)| (format!("ball_{}", number), doc.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn over_document_keys(&self) -> Vec<String> {
        let overs = self.overs.read().await;
        let mut keys: Vec<String> = overs.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn stored_ball_count(&self) -> usize {
        let overs = self.overs.read().await;
        overs.values().map(BTreeMap::len).sum()
    }

    pub async fn match_state(&self, match_id: &str) -> Option<Value> {
        self.match_states.read().await.get(match_id).cloned()
    }

    pub async fn player_stats(&self, match_id: &str) -> Option<Value> {
        self.player_stats.read().await.get(match_id).cloned()
    }
}

#[async_trait]
impl PersistenceSink for InMemoryPersistenceSink {
    #[instrument(skip(self, ball), fields(over = %address.over_document_key(), ball = %address.ball_key()))]
    async fn save_ball(
        &self,
        address: &BallAddress,
        ball: &BallEvent,
    ) -> Result<(), PersistenceError> {
        self.check_accepting()?;
        let document = serde_json::to_value(ball)?;

        let mut overs = self.overs.write().await;
        overs
            .entry(address.over_document_key())
            .or_default()
            .insert(address.ball_number, document);

        debug!("Ball document stored");
        Ok(())
    }

    #[instrument(skip(self), fields(over = %address.over_document_key(), ball = %address.ball_key()))]
    async fn delete_ball(&self, address: &BallAddress) -> Result<(), PersistenceError> {
        self.check_accepting()?;

        let key = address.over_document_key();
        let mut overs = self.overs.write().await;
        if let Some(balls) = overs.get_mut(&key) {
            balls.remove(&address.ball_number);
            if balls.is_empty() {
                overs.remove(&key);
                debug!("Over document removed");
            }
        }
        Ok(())
    }

    #[instrument(skip(self, state), fields(match_id = %state.match_id))]
    async fn save_match_state(&self, state: &MatchState) -> Result<(), PersistenceError> {
        self.check_accepting()?;
        let document = serde_json::to_value(state)?;
        self.match_states
            .write()
            .await
            .insert(state.match_id.clone(), document);
        Ok(())
    }

    #[instrument(skip(self, stats))]
    async fn save_player_stats(
        &self,
        match_id: &str,
        stats: &StatsTable,
    ) -> Result<(), PersistenceError> {
        self.check_accepting()?;
        let document = serde_json::to_value(stats)?;
        self.player_stats
            .write()
            .await
            .insert(match_id.to_string(), document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ball::test_support::ball;
    use crate::scoring::InningsNumber;

    fn address(ball_number: usize) -> BallAddress {
        BallAddress {
            match_id: "m".to_string(),
            team_id: "lions".to_string(),
            innings: InningsNumber::First,
            over_index: 0,
            ball_number,
        }
    }

    #[tokio::test]
    async fn deleting_the_last_ball_drops_the_over_document() {
        let sink = InMemoryPersistenceSink::new();
        sink.save_ball(&address(1), &ball(1)).await.unwrap();
        sink.save_ball(&address(2), &ball(4)).await.unwrap();

        let over = sink.over_document("m_lions_1_0").await;
        assert_eq!(over.len(), 2);
        assert_eq!(over[1].0, "ball_2");
        assert_eq!(over[1].1["runs_off_bat"], 4);

        sink.delete_ball(&address(2)).await.unwrap();
        sink.delete_ball(&address(1)).await.unwrap();

        assert!(sink.over_document_keys().await.is_empty());
    }

    #[tokio::test]
    async fn rejected_writes_store_nothing() {
        let sink = InMemoryPersistenceSink::new();
        sink.set_reject_writes(true);

        let result = sink.save_ball(&address(1), &ball(0)).await;

        assert!(matches!(result, Err(PersistenceError::Rejected(_))));
        assert_eq!(sink.stored_ball_count().await, 0);

        sink.set_reject_writes(false);
        sink.save_ball(&address(1), &ball(0)).await.unwrap();
        assert_eq!(sink.stored_ball_count().await, 1);
    }
}
