use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{MatchSession, ScoringError};

/// Storage for live match sessions
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn create_match(&self, session: MatchSession) -> Result<(), ScoringError>;
    async fn get_match(&self, match_id: &str) -> Result<Option<MatchSession>, ScoringError>;
    /// Replaces the stored session wholesale
    async fn save_match(&self, session: MatchSession) -> Result<(), ScoringError>;
    async fn list_match_ids(&self) -> Result<Vec<String>, ScoringError>;
}

#[derive(Debug, Default)]
pub struct InMemoryMatchRepository {
    matches: Arc<RwLock<HashMap<String, MatchSession>>>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self {
            matches: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    #[instrument(skip(self, session), fields(match_id = %session.match_id()))]
    async fn create_match(&self, session: MatchSession) -> Result<(), ScoringError> {
        let mut matches = self.matches.write().await;
        if matches.contains_key(session.match_id()) {
            warn!("Match already exists in memory");
            return Err(ScoringError::InvalidSetup(format!(
                "Match {} already exists",
                session.match_id()
            )));
        }
        matches.insert(session.match_id().to_string(), session);
        debug!("Match created in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_match(&self, match_id: &str) -> Result<Option<MatchSession>, ScoringError> {
        let matches = self.matches.read().await;
        let session = matches.get(match_id).cloned();
        if session.is_none() {
            debug!("Match not found in memory");
        }
        Ok(session)
    }

    #[instrument(skip(self, session), fields(match_id = %session.match_id()))]
    async fn save_match(&self, session: MatchSession) -> Result<(), ScoringError> {
        let mut matches = self.matches.write().await;
        if !matches.contains_key(session.match_id()) {
            return Err(ScoringError::MatchNotFound(session.match_id().to_string()));
        }
        matches.insert(session.match_id().to_string(), session);
        Ok(())
    }

    async fn list_match_ids(&self) -> Result<Vec<String>, ScoringError> {
        let matches = self.matches.read().await;
        let mut ids: Vec<String> = matches.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
