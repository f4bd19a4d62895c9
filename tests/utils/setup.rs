use std::sync::Arc;

use scorebook::{
    roster::InMemoryRosterProvider,
    scoring::{
        InMemoryMatchRepository, MatchService, MatchSession, MatchSetup, Player, PlayerSelection,
        Role, Team, TossDecision,
    },
    InMemoryPersistenceSink,
};

use super::mocks::RecordingMatchEndSignal;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const SQUAD_SIZE: usize = 6;

pub struct TestSetup {
    pub service: Arc<MatchService>,
    pub sink: Arc<InMemoryPersistenceSink>,
    pub signal: Arc<RecordingMatchEndSignal>,
    pub match_id: String,
}

impl TestSetup {
    pub async fn session(&self) -> MatchSession {
        self.service
            .get_match(&self.match_id)
            .await
            .expect("match should exist")
    }
}

/// Lions (`lions-1`..`lions-6`) bat first against Tigers (`tigers-1`..)
pub struct TestSetupBuilder {
    overs_limit: u32,
    wickets_limit: Option<u32>,
    quick_match: bool,
    reprompt_batters_each_over: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            overs_limit: 20,
            wickets_limit: Some(10),
            quick_match: false,
            reprompt_batters_each_over: false,
        }
    }

    pub fn with_overs(mut self, overs_limit: u32) -> Self {
        self.overs_limit = overs_limit;
        self
    }

    pub fn with_wickets(mut self, wickets_limit: Option<u32>) -> Self {
        self.wickets_limit = wickets_limit;
        self
    }

    pub fn quick_match(mut self) -> Self {
        self.quick_match = true;
        self
    }

    pub fn reprompting_batters(mut self) -> Self {
        self.reprompt_batters_each_over = true;
        self
    }

    pub async fn build(self) -> TestSetup {
        let roster = Arc::new(InMemoryRosterProvider::new());
        for team in ["lions", "tigers"] {
            for n in 1..=SQUAD_SIZE {
                let id = format!("{}-{}", team, n);
                roster
                    .add_player(team, Player::new(&id, &id), &[Role::Batter, Role::Bowler])
                    .await
                    .unwrap();
            }
        }

        let sink = Arc::new(InMemoryPersistenceSink::new());
        let signal = Arc::new(RecordingMatchEndSignal::new());
        let service = Arc::new(
            MatchService::builder(Arc::new(InMemoryMatchRepository::new()))
                .with_roster(roster)
                .with_sink(sink.clone())
                .with_end_signal(signal.clone())
                .build(),
        );

        let session = service
            .start_match(MatchSetup {
                team1: Team::new("lions", "Lions"),
                team2: Team::new("tigers", "Tigers"),
                overs_limit: self.overs_limit,
                wickets_limit: self.wickets_limit,
                toss_winner: "tigers".to_string(),
                elected_to: TossDecision::Bowling,
                quick_match: self.quick_match,
                reprompt_batters_each_over: self.reprompt_batters_each_over,
            })
            .await
            .unwrap();
        let match_id = session.match_id().to_string();

        if !self.quick_match {
            service
                .select_players(
                    &match_id,
                    &PlayerSelection::all("lions-1", "lions-2", "tigers-1"),
                )
                .await
                .unwrap();
        }

        TestSetup {
            service,
            sink,
            signal,
            match_id,
        }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}
