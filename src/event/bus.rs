use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::MatchEvent;

const MATCH_CHANNEL_CAPACITY: usize = 100;

/// Per-match broadcast channels for scoreboard readers
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    /// match_id -> sender
    match_channels: Arc<RwLock<HashMap<String, broadcast::Sender<MatchEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            match_channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Emits an event to all subscribers of the event's match
    pub async fn emit(&self, event: MatchEvent) {
        let sender = self.sender_for(event.match_id()).await;
        let match_id = event.match_id().to_string();

        match sender.send(event) {
            Ok(receiver_count) => {
                debug!(match_id = %match_id, receivers = receiver_count, "Match event emitted");
            }
            Err(_) => {
                debug!(match_id = %match_id, "Match event emitted with no receivers");
            }
        }
    }

    pub async fn subscribe_to_match(&self, match_id: &str) -> broadcast::Receiver<MatchEvent> {
        self.sender_for(match_id).await.subscribe()
    }

    /// Drops the channel; current receivers see it close
    pub async fn close_match(&self, match_id: &str) {
        let mut match_channels = self.match_channels.write().await;
        if match_channels.remove(match_id).is_some() {
            debug!(match_id = %match_id, "Match channel closed");
        }
    }

    async fn sender_for(&self, match_id: &str) -> broadcast::Sender<MatchEvent> {
        {
            let match_channels = self.match_channels.read().await;
            if let Some(sender) = match_channels.get(match_id) {
                return sender.clone();
            }
        }

        debug!(match_id = %match_id, "Creating match channel");
        let mut match_channels = self.match_channels.write().await;
        match_channels
            .entry(match_id.to_string())
            .or_insert_with(|| broadcast::channel(MATCH_CHANNEL_CAPACITY).0)
            .clone()
    }
}
