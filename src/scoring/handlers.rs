use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::{
    types::{
        BallResponse, CreateMatchRequest, MatchResponse, RetryWritesResponse, UndoResponse,
    },
    BallInput, Player, PlayerSelection, Role, Scoreboard,
};
use crate::shared::{AppError, AppState};

/// POST /matches
#[instrument(name = "create_match", skip(state, request))]
pub async fn create_match(
    State(state): State<AppState>,
    Json(request): Json<CreateMatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let setup = request.into_setup(&state.scoring_defaults);
    let session = state.match_service.start_match(setup).await?;

    info!(match_id = %session.match_id(), "Match created");
    let pending = state
        .match_service
        .pending_write_count(session.match_id())
        .await;
    Ok(Json(MatchResponse::new(&session, pending)))
}

/// GET /matches/:id
#[instrument(name = "get_match", skip(state))]
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchResponse>, AppError> {
    let session = state.match_service.get_match(&match_id).await?;
    let pending = state.match_service.pending_write_count(&match_id).await;
    Ok(Json(MatchResponse::new(&session, pending)))
}

/// GET /matches/:id/scoreboard
#[instrument(name = "get_scoreboard", skip(state))]
pub async fn get_scoreboard(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<Scoreboard>, AppError> {
    Ok(Json(state.match_service.scoreboard(&match_id).await?))
}

/// PUT /matches/:id/players
#[instrument(name = "select_players", skip(state, selection))]
pub async fn select_players(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Json(selection): Json<PlayerSelection>,
) -> Result<Json<MatchResponse>, AppError> {
    state
        .match_service
        .select_players(&match_id, &selection)
        .await?;
    get_match(State(state), Path(match_id)).await
}

/// GET /matches/:id/eligible/:role
#[instrument(name = "eligible_players", skip(state))]
pub async fn eligible_players(
    State(state): State<AppState>,
    Path((match_id, role)): Path<(String, Role)>,
) -> Result<Json<Vec<Player>>, AppError> {
    Ok(Json(
        state.match_service.eligible_players(&match_id, role).await?,
    ))
}

/// POST /matches/:id/balls
#[instrument(name = "submit_ball", skip(state, input))]
pub async fn submit_ball(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Json(input): Json<BallInput>,
) -> Result<Json<BallResponse>, AppError> {
    let outcome = state.match_service.submit_ball(&match_id, &input).await?;
    let phase = state.match_service.phase(&match_id).await?;
    let pending_writes = state.match_service.pending_write_count(&match_id).await;

    Ok(Json(BallResponse {
        outcome,
        phase,
        pending_writes,
    }))
}

/// DELETE /matches/:id/balls/last
#[instrument(name = "undo_last_ball", skip(state))]
pub async fn undo_last_ball(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<UndoResponse>, AppError> {
    let outcome = state.match_service.undo_last_ball(&match_id).await?;
    let phase = state.match_service.phase(&match_id).await?;
    let pending_writes = state.match_service.pending_write_count(&match_id).await;

    Ok(Json(UndoResponse {
        outcome,
        phase,
        pending_writes,
    }))
}

/// POST /matches/:id/second-innings
#[instrument(name = "begin_second_innings", skip(state))]
pub async fn begin_second_innings(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchResponse>, AppError> {
    let session = state.match_service.begin_second_innings(&match_id).await?;
    let pending = state.match_service.pending_write_count(&match_id).await;
    Ok(Json(MatchResponse::new(&session, pending)))
}

/// POST /matches/:id/abandon
#[instrument(name = "abandon_match", skip(state))]
pub async fn abandon_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchResponse>, AppError> {
    let session = state.match_service.abandon_match(&match_id).await?;
    let pending = state.match_service.pending_write_count(&match_id).await;
    Ok(Json(MatchResponse::new(&session, pending)))
}

/// POST /matches/:id/retry-writes
#[instrument(name = "retry_writes", skip(state))]
pub async fn retry_writes(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<RetryWritesResponse>, AppError> {
    let written = state.match_service.retry_pending_writes(&match_id).await?;
    Ok(Json(RetryWritesResponse { written }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::{app, scoring::MatchPhase};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde::de::DeserializeOwned;
    use tower::ServiceExt; // for `oneshot`

    const CREATE_BODY: &str = r#"{
        "team1": {"id": "lions", "name": "Lions"},
        "team2": {"id": "tigers", "name": "Tigers"},
        "toss_winner": "lions",
        "elected_to": "batting",
        "overs_limit": 1
    }"#;

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
        serde_json::from_slice(body).unwrap()
    }

    async fn app_with_match() -> (Router, String) {
        let state = AppStateBuilder::new().with_default_rosters().await.build();
        let app = app(state);
        let (status, body) = send(&app, "POST", "/matches", Some(CREATE_BODY)).await;
        assert_eq!(status, StatusCode::OK);
        let created: MatchResponse = parse(&body);
        (app, created.state.match_id)
    }

    #[tokio::test]
    async fn created_match_awaits_players() {
        let (app, match_id) = app_with_match().await;

        let (status, body) = send(&app, "GET", &format!("/matches/{}", match_id), None).await;

        assert_eq!(status, StatusCode::OK);
        let response: MatchResponse = parse(&body);
        assert!(matches!(response.phase, MatchPhase::AwaitingPlayers { .. }));
        assert_eq!(response.state.overs_limit, 1);
        assert_eq!(response.state.wickets_limit, Some(10));
    }

    #[tokio::test]
    async fn ball_without_players_names_the_missing_slot() {
        let (app, match_id) = app_with_match().await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/matches/{}/balls", match_id),
            Some(r#"{"runs_off_bat": 1}"#),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        let error: serde_json::Value = parse(&body);
        assert_eq!(error["reason"], "missing_player");
        assert_eq!(error["missing_slot"], "striker");
    }

    #[tokio::test]
    async fn scoring_flow_over_http() {
        let (app, match_id) = app_with_match().await;

        let (status, body) = send(
            &app,
            "GET",
            &format!("/matches/{}/eligible/bowler", match_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let bowlers: Vec<Player> = parse(&body);
        assert_eq!(bowlers.len(), 3);

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/matches/{}/players", match_id),
            Some(r#"{"striker": "a", "non_striker": "b", "bowler": "x"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/matches/{}/balls", match_id),
            Some(r#"{"runs_off_bat": 4}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let ball: BallResponse = parse(&body);
        assert_eq!(ball.outcome.total.total_runs, 4);
        assert_eq!(ball.pending_writes, 0);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/matches/{}/balls", match_id),
            Some(r#"{"runs_off_bat": 0, "is_wicket": true}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: serde_json::Value = parse(&body);
        assert_eq!(error["reason"], "ambiguous_dismissal");

        let (status, body) = send(
            &app,
            "POST",
            &format!("/matches/{}/balls", match_id),
            Some(r#"{"runs_off_bat": 4294967295, "extra": "wide"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: serde_json::Value = parse(&body);
        assert_eq!(error["reason"], "invalid_ball");

        let (status, body) = send(
            &app,
            "DELETE",
            &format!("/matches/{}/balls/last", match_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let undo: UndoResponse = parse(&body);
        assert_eq!(undo.outcome.total.total_runs, 0);

        let (status, body) = send(
            &app,
            "DELETE",
            &format!("/matches/{}/balls/last", match_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        let error: serde_json::Value = parse(&body);
        assert_eq!(error["reason"], "nothing_to_undo");

        let (status, body) = send(
            &app,
            "GET",
            &format!("/matches/{}/scoreboard", match_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let board: Scoreboard = parse(&body);
        assert_eq!(board.innings[0].overs, "0.0");
    }

    #[tokio::test]
    async fn abandoned_match_and_unknown_ids() {
        let (app, match_id) = app_with_match().await;

        let (status, body) =
            send(&app, "POST", &format!("/matches/{}/abandon", match_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let response: MatchResponse = parse(&body);
        assert_eq!(response.phase, MatchPhase::NoResult);

        let (status, _) = send(
            &app,
            "POST",
            &format!("/matches/{}/second-innings", match_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, "GET", "/matches/no-such-match", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/matches/{}/retry-writes", match_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let retried: RetryWritesResponse = parse(&body);
        assert_eq!(retried.written, 0);
    }

    #[tokio::test]
    async fn invalid_setup_is_a_bad_request() {
        let state = AppStateBuilder::new().build();
        let app = app(state);

        let (status, body) = send(
            &app,
            "POST",
            "/matches",
            Some(
                r#"{"team1": {"id": "lions", "name": "Lions"},
                    "team2": {"id": "lions", "name": "Lions"},
                    "toss_winner": "lions", "elected_to": "batting"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: serde_json::Value = parse(&body);
        assert_eq!(error["reason"], "invalid_setup");
    }
}
