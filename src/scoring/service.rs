use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock};
use tracing::{debug, error, info, instrument, warn};

use super::{
    ActivePlayers, BallInput, BallOutcome, InningsNumber, MatchPhase, MatchRepository,
    MatchSession, MatchSetup, Player, PlayerSelection, PlayerSlot, Role, Scoreboard,
    ScoringError, Transition, UndoOutcome,
};
use crate::event::{EventBus, LoggingMatchEndSignal, MatchEndSignal, MatchEvent, MatchResult};
use crate::persistence::{BallAddress, InMemoryPersistenceSink, PendingWrite, PersistenceSink};
use crate::roster::{InMemoryRosterProvider, RosterProvider};

const MATCH_ID_ATTEMPTS: usize = 5;

/// Lock for one match; whoever holds it owns the match's queue of unwritten
/// sink calls
type MatchSlot = Arc<AsyncMutex<Vec<PendingWrite>>>;
type MatchGuard = OwnedMutexGuard<Vec<PendingWrite>>;

/// Runs engine operations against stored sessions.
///
/// Mutations of one match are serialized; each works on a copy of the
/// session that replaces the stored one only when the whole operation
/// succeeded. Matches never wait on each other, sink writes included.
pub struct MatchService {
    repository: Arc<dyn MatchRepository>,
    roster: Arc<dyn RosterProvider>,
    sink: Arc<dyn PersistenceSink>,
    event_bus: EventBus,
    end_signal: Arc<dyn MatchEndSignal>,
    match_slots: Arc<RwLock<HashMap<String, MatchSlot>>>,
}

impl MatchService {
    pub fn builder(repository: Arc<dyn MatchRepository>) -> MatchServiceBuilder {
        MatchServiceBuilder::new(repository)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    #[instrument(skip(self, setup))]
    pub async fn start_match(&self, setup: MatchSetup) -> Result<MatchSession, ScoringError> {
        for _ in 0..MATCH_ID_ATTEMPTS {
            let match_id = petname::Petnames::default().generate_one(2, "-");
            if self.repository.get_match(&match_id).await?.is_some() {
                debug!(match_id = %match_id, "Match id taken, generating another");
                continue;
            }

            let session = MatchSession::start(match_id, setup)?;
            self.repository.create_match(session.clone()).await?;

            let mut guard = self.lock_match(session.match_id()).await;
            self.flush_writes(
                session.match_id(),
                &mut guard,
                vec![PendingWrite::SaveMatchState {
                    state: session.state().clone(),
                }],
            )
            .await;
            return Ok(session);
        }

        warn!("Could not find a free match id");
        Err(ScoringError::InvalidSetup(
            "Could not allocate a match id".to_string(),
        ))
    }

    pub async fn get_match(&self, match_id: &str) -> Result<MatchSession, ScoringError> {
        self.repository
            .get_match(match_id)
            .await?
            .ok_or_else(|| ScoringError::MatchNotFound(match_id.to_string()))
    }

    pub async fn scoreboard(&self, match_id: &str) -> Result<Scoreboard, ScoringError> {
        let session = self.get_match(match_id).await?;
        Ok(Scoreboard::from_session(&session))
    }

    pub async fn phase(&self, match_id: &str) -> Result<MatchPhase, ScoringError> {
        Ok(self.get_match(match_id).await?.phase())
    }

    /// Roster players who could fill `role` right now. Batters already out
    /// or at the crease are left out.
    #[instrument(skip(self))]
    pub async fn eligible_players(
        &self,
        match_id: &str,
        role: Role,
    ) -> Result<Vec<Player>, ScoringError> {
        let session = self.get_match(match_id).await?;
        let team_id = match role {
            Role::Batter => session.batting_team().id.clone(),
            Role::Bowler => session.bowling_team().id.clone(),
        };

        let players = self
            .roster
            .get_eligible_players(&team_id, role)
            .await
            .map_err(|e| ScoringError::invalid_selection(e.to_string()))?;

        Ok(players
            .into_iter()
            .filter(|player| match role {
                Role::Batter => {
                    let out = session
                        .stats()
                        .stats_for(&player.id)
                        .is_some_and(|s| s.batting.is_out && s.team_id == team_id);
                    !out && !session.active_players().is_batting(&player.id)
                }
                Role::Bowler => true,
            })
            .collect())
    }

    #[instrument(skip(self, selection))]
    pub async fn select_players(
        &self,
        match_id: &str,
        selection: &PlayerSelection,
    ) -> Result<ActivePlayers, ScoringError> {
        if selection.is_empty() {
            return Err(ScoringError::invalid_selection("No players given"));
        }

        let mut guard = self.lock_match(match_id).await;
        let result = self.select_players_locked(match_id, selection, &mut guard).await;
        self.settle(match_id, guard).await;
        result
    }

    async fn select_players_locked(
        &self,
        match_id: &str,
        selection: &PlayerSelection,
        queue: &mut Vec<PendingWrite>,
    ) -> Result<ActivePlayers, ScoringError> {
        let mut session = self.get_match(match_id).await?;
        let assignments = self.resolve_selection(&session, selection).await?;

        session.select_players(&assignments).inspect_err(|e| {
            warn!(match_id = %match_id, error = %e, "Player selection rejected");
        })?;
        self.repository.save_match(session.clone()).await?;

        self.flush_writes(
            match_id,
            queue,
            vec![PendingWrite::SavePlayerStats {
                match_id: match_id.to_string(),
                stats: session.stats().clone(),
            }],
        )
        .await;

        Ok(session.active_players().clone())
    }

    #[instrument(skip(self, input))]
    pub async fn submit_ball(
        &self,
        match_id: &str,
        input: &BallInput,
    ) -> Result<BallOutcome, ScoringError> {
        let mut guard = self.lock_match(match_id).await;
        let result = self.submit_ball_locked(match_id, input, &mut guard).await;
        self.settle(match_id, guard).await;
        result
    }

    async fn submit_ball_locked(
        &self,
        match_id: &str,
        input: &BallInput,
        queue: &mut Vec<PendingWrite>,
    ) -> Result<BallOutcome, ScoringError> {
        let mut session = self.get_match(match_id).await?;
        let outcome = session.submit_ball(input).inspect_err(|e| {
            warn!(match_id = %match_id, reason = e.reason_code(), error = %e, "Ball rejected");
        })?;
        self.repository.save_match(session.clone()).await?;

        let address = BallAddress {
            match_id: match_id.to_string(),
            team_id: session.state().batting_team(outcome.innings).id.clone(),
            innings: outcome.innings,
            over_index: outcome.over_index,
            ball_number: outcome.ball_number,
        };
        let mut writes = vec![
            PendingWrite::SaveBall {
                address,
                ball: outcome.ball.clone(),
            },
            PendingWrite::SaveMatchState {
                state: session.state().clone(),
            },
        ];
        if !session.state().quick_match {
            writes.push(PendingWrite::SavePlayerStats {
                match_id: match_id.to_string(),
                stats: session.stats().clone(),
            });
        }
        self.flush_writes(match_id, queue, writes).await;

        self.event_bus
            .emit(MatchEvent::BallRecorded {
                match_id: match_id.to_string(),
                innings: outcome.innings,
                over_index: outcome.over_index,
                ball: outcome.ball.clone(),
                total: outcome.total,
            })
            .await;
        self.publish_transitions(&session, &outcome.transitions).await;

        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub async fn undo_last_ball(&self, match_id: &str) -> Result<UndoOutcome, ScoringError> {
        let mut guard = self.lock_match(match_id).await;
        let result = self.undo_last_ball_locked(match_id, &mut guard).await;
        self.settle(match_id, guard).await;
        result
    }

    async fn undo_last_ball_locked(
        &self,
        match_id: &str,
        queue: &mut Vec<PendingWrite>,
    ) -> Result<UndoOutcome, ScoringError> {
        let mut session = self.get_match(match_id).await?;
        let outcome = session.undo_last_ball().inspect_err(|e| {
            warn!(match_id = %match_id, reason = e.reason_code(), error = %e, "Undo rejected");
        })?;
        self.repository.save_match(session.clone()).await?;

        let address = BallAddress {
            match_id: match_id.to_string(),
            team_id: session.state().batting_team(outcome.innings).id.clone(),
            innings: outcome.innings,
            over_index: outcome.over_index,
            ball_number: outcome.ball_number,
        };
        let mut writes = vec![
            PendingWrite::DeleteBall { address },
            PendingWrite::SaveMatchState {
                state: session.state().clone(),
            },
        ];
        if !session.state().quick_match {
            writes.push(PendingWrite::SavePlayerStats {
                match_id: match_id.to_string(),
                stats: session.stats().clone(),
            });
        }
        self.flush_writes(match_id, queue, writes).await;

        self.event_bus
            .emit(MatchEvent::BallUndone {
                match_id: match_id.to_string(),
                innings: outcome.innings,
                over_index: outcome.over_index,
                ball: outcome.ball.clone(),
                total: outcome.total,
            })
            .await;

        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub async fn begin_second_innings(&self, match_id: &str) -> Result<MatchSession, ScoringError> {
        self.mutate_state(match_id, MatchSession::begin_second_innings)
            .await
    }

    #[instrument(skip(self))]
    pub async fn abandon_match(&self, match_id: &str) -> Result<MatchSession, ScoringError> {
        let session = self.mutate_state(match_id, MatchSession::abandon).await?;
        self.event_bus
            .emit(MatchEvent::MatchAbandoned {
                match_id: match_id.to_string(),
            })
            .await;
        Ok(session)
    }

    /// Writes the queued sink calls for a match in their original order.
    /// Stops at the first failure and keeps it and everything after it queued.
    #[instrument(skip(self))]
    pub async fn retry_pending_writes(&self, match_id: &str) -> Result<usize, ScoringError> {
        let mut guard = self.lock_match(match_id).await;
        let queued = guard.len();
        let remaining = self.flush_writes(match_id, &mut guard, Vec::new()).await;
        self.settle(match_id, guard).await;

        if remaining > 0 {
            return Err(ScoringError::PersistenceFailure(format!(
                "{} of {} writes still pending",
                remaining, queued
            )));
        }
        info!(match_id = %match_id, written = queued, "Pending writes flushed");
        Ok(queued)
    }

    pub async fn pending_writes(&self, match_id: &str) -> Vec<PendingWrite> {
        let slot = self.match_slots.read().await.get(match_id).cloned();
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => Vec::new(),
        }
    }

    pub async fn pending_write_count(&self, match_id: &str) -> usize {
        let slot = self.match_slots.read().await.get(match_id).cloned();
        match slot {
            Some(slot) => slot.lock().await.len(),
            None => 0,
        }
    }

    async fn mutate_state<F>(&self, match_id: &str, op: F) -> Result<MatchSession, ScoringError>
    where
        F: FnOnce(&mut MatchSession) -> Result<(), ScoringError>,
    {
        let mut guard = self.lock_match(match_id).await;
        let result = self.mutate_state_locked(match_id, op, &mut guard).await;
        self.settle(match_id, guard).await;
        result
    }

    async fn mutate_state_locked<F>(
        &self,
        match_id: &str,
        op: F,
        queue: &mut Vec<PendingWrite>,
    ) -> Result<MatchSession, ScoringError>
    where
        F: FnOnce(&mut MatchSession) -> Result<(), ScoringError>,
    {
        let mut session = self.get_match(match_id).await?;
        op(&mut session).inspect_err(|e| {
            warn!(match_id = %match_id, error = %e, "Match update rejected");
        })?;
        self.repository.save_match(session.clone()).await?;

        self.flush_writes(
            match_id,
            queue,
            vec![PendingWrite::SaveMatchState {
                state: session.state().clone(),
            }],
        )
        .await;

        Ok(session)
    }

    async fn resolve_selection(
        &self,
        session: &MatchSession,
        selection: &PlayerSelection,
    ) -> Result<Vec<(PlayerSlot, Player)>, ScoringError> {
        let mut assignments = Vec::new();

        for (slot, player_id) in selection.entries() {
            let role = slot.role();
            let team = match role {
                Role::Batter => session.batting_team(),
                Role::Bowler => session.bowling_team(),
            };

            let eligible = self
                .roster
                .get_eligible_players(&team.id, role)
                .await
                .map_err(|e| ScoringError::invalid_selection(e.to_string()))?;

            let player = eligible
                .into_iter()
                .find(|p| &p.id == player_id)
                .ok_or_else(|| {
                    ScoringError::invalid_selection(format!(
                        "{} cannot play as {} for {}",
                        player_id, slot, team.name
                    ))
                })?;
            assignments.push((slot, player));
        }

        Ok(assignments)
    }

    async fn publish_transitions(&self, session: &MatchSession, transitions: &[Transition]) {
        let match_id = session.match_id().to_string();

        for transition in transitions {
            match transition {
                Transition::OverCompleted {
                    innings,
                    over_index,
                } => {
                    self.event_bus
                        .emit(MatchEvent::OverCompleted {
                            match_id: match_id.clone(),
                            innings: *innings,
                            over_index: *over_index,
                        })
                        .await;
                }
                Transition::InningsCompleted { innings, total } => {
                    self.event_bus
                        .emit(MatchEvent::InningsCompleted {
                            match_id: match_id.clone(),
                            innings: *innings,
                            total: *total,
                        })
                        .await;
                }
                Transition::ChaseAchieved { .. }
                | Transition::TargetDefended { .. }
                | Transition::MatchTied => {
                    let result = match_result(session);
                    self.end_signal.match_ended(&result).await;
                    debug!(
                        match_id = %match_id,
                        signal = self.end_signal.name(),
                        "Match-end signal fired"
                    );
                    self.event_bus
                        .emit(MatchEvent::MatchEnded {
                            match_id: match_id.clone(),
                            result,
                        })
                        .await;
                }
            }
        }
    }

    /// Queues `writes` behind anything already pending for the match, then
    /// drains the queue in order. Returns how many writes are still pending.
    async fn flush_writes(
        &self,
        match_id: &str,
        queue: &mut Vec<PendingWrite>,
        writes: Vec<PendingWrite>,
    ) -> usize {
        queue.extend(writes);

        let mut written = 0;
        for write in queue.iter() {
            match write.write_to(self.sink.as_ref()).await {
                Ok(()) => written += 1,
                Err(e) => {
                    error!(
                        match_id = %match_id,
                        op = write.kind(),
                        error = %e,
                        "Persistence write failed, keeping it queued"
                    );
                    break;
                }
            }
        }
        queue.drain(..written);
        queue.len()
    }

    /// Waits for exclusive use of a match. A slot released while we waited
    /// on it is stale, so we go round again for the live one.
    async fn lock_match(&self, match_id: &str) -> MatchGuard {
        loop {
            let slot = self.match_slot(match_id).await;
            let guard = slot.clone().lock_owned().await;

            let live = self
                .match_slots
                .read()
                .await
                .get(match_id)
                .is_some_and(|current| Arc::ptr_eq(current, &slot));
            if live {
                return guard;
            }
            debug!(match_id = %match_id, "Match slot released while waiting, retrying");
        }
    }

    async fn match_slot(&self, match_id: &str) -> MatchSlot {
        {
            let guard = self.match_slots.read().await;
            if let Some(slot) = guard.get(match_id) {
                return slot.clone();
            }
        }

        let mut guard = self.match_slots.write().await;
        guard
            .entry(match_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(Vec::new())))
            .clone()
    }

    /// Gives up the match lock. The slot itself is dropped once nothing is
    /// queued and the match is over or unknown.
    async fn settle(&self, match_id: &str, guard: MatchGuard) {
        if !guard.is_empty() {
            return;
        }

        let settled = match self.repository.get_match(match_id).await {
            Ok(Some(session)) => session.state().is_terminal(),
            Ok(None) => true,
            Err(e) => {
                warn!(match_id = %match_id, error = %e, "Could not check match, keeping its slot");
                false
            }
        };
        if settled {
            self.match_slots.write().await.remove(match_id);
            debug!(match_id = %match_id, "Match slot released");
        }
        drop(guard);
    }

    #[cfg(test)]
    async fn open_match_slots(&self) -> usize {
        self.match_slots.read().await.len()
    }
}

fn match_result(session: &MatchSession) -> MatchResult {
    let state = session.state();
    MatchResult {
        match_id: state.match_id.clone(),
        status: state.status,
        winner: state.winner.clone(),
        man_of_the_match: state.man_of_the_match.clone(),
        first_innings: session.totals(InningsNumber::First),
        second_innings: session.totals(InningsNumber::Second),
        ended_at: state.end_date_time,
    }
}

pub struct MatchServiceBuilder {
    repository: Arc<dyn MatchRepository>,
    roster: Option<Arc<dyn RosterProvider>>,
    sink: Option<Arc<dyn PersistenceSink>>,
    event_bus: Option<EventBus>,
    end_signal: Option<Arc<dyn MatchEndSignal>>,
}

impl MatchServiceBuilder {
    fn new(repository: Arc<dyn MatchRepository>) -> Self {
        Self {
            repository,
            roster: None,
            sink: None,
            event_bus: None,
            end_signal: None,
        }
    }

    pub fn with_roster(mut self, roster: Arc<dyn RosterProvider>) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn PersistenceSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn with_end_signal(mut self, end_signal: Arc<dyn MatchEndSignal>) -> Self {
        self.end_signal = Some(end_signal);
        self
    }

    pub fn build(self) -> MatchService {
        MatchService {
            repository: self.repository,
            roster: self
                .roster
                .unwrap_or_else(|| Arc::new(InMemoryRosterProvider::new())),
            sink: self
                .sink
                .unwrap_or_else(|| Arc::new(InMemoryPersistenceSink::new())),
            event_bus: self.event_bus.unwrap_or_default(),
            end_signal: self
                .end_signal
                .unwrap_or_else(|| Arc::new(LoggingMatchEndSignal::new())),
            match_slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
