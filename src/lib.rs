// Library crate for the scorebook server
// This file exposes the public API for integration tests

pub mod config;
pub mod event;
pub mod persistence;
pub mod roster;
pub mod scoring;
pub mod shared;
pub mod stats;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Re-export commonly used types for easier access in tests
pub use event::{EventBus, MatchEndSignal, MatchEvent, MatchResult};
pub use persistence::{BallAddress, InMemoryPersistenceSink, PendingWrite, PersistenceSink};
pub use roster::{InMemoryRosterProvider, RosterProvider};
pub use scoring::{MatchService, MatchSession, ScoringError};
pub use shared::{AppError, AppState};

/// All HTTP routes with tracing and CORS layers applied
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/matches", post(scoring::handlers::create_match))
        .route("/matches/:id", get(scoring::handlers::get_match))
        .route("/matches/:id/scoreboard", get(scoring::handlers::get_scoreboard))
        .route("/matches/:id/players", put(scoring::handlers::select_players))
        .route(
            "/matches/:id/eligible/:role",
            get(scoring::handlers::eligible_players),
        )
        .route("/matches/:id/balls", post(scoring::handlers::submit_ball))
        .route(
            "/matches/:id/balls/last",
            delete(scoring::handlers::undo_last_ball),
        )
        .route(
            "/matches/:id/second-innings",
            post(scoring::handlers::begin_second_innings),
        )
        .route("/matches/:id/abandon", post(scoring::handlers::abandon_match))
        .route(
            "/matches/:id/retry-writes",
            post(scoring::handlers::retry_writes),
        )
        .route(
            "/teams/:team_id/players",
            post(roster::handlers::register_player),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
