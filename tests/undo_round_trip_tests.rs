mod utils;

use futures::future::join_all;
use rstest::rstest;
use utils::{bowl, bowl_all, fill_missing_players, start_second_innings, BallSequenceBuilder, TestSetup, TestSetupBuilder};

use scorebook::scoring::{BallInput, InningsNumber, MatchPhase, MatchStatus, PlayerSlot};
use scorebook::stats::{BattingStats, BowlingStats};
use scorebook::{MatchSession, ScoringError};

// ============================================================================
// Helpers
// ============================================================================

/// Plays up to `max_balls` random balls, starting the second innings when
/// needed. Returns how many balls were recorded.
async fn play(setup: &TestSetup, balls: &mut BallSequenceBuilder, max_balls: usize) -> usize {
    let mut recorded = 0;
    while recorded < max_balls {
        match setup.session().await.state().status {
            MatchStatus::Live => {
                bowl(setup, balls.next_ball()).await;
                recorded += 1;
            }
            MatchStatus::InningsBreak => start_second_innings(setup).await,
            _ => break,
        }
    }
    recorded
}

async fn undo(setup: &TestSetup, times: usize) {
    for _ in 0..times {
        setup.service.undo_last_ball(&setup.match_id).await.unwrap();
    }
}

/// Everything except stats rows created after `before` must match; those
/// rows have to be back at zero.
fn assert_restored(before: &MatchSession, after: &MatchSession) {
    assert_eq!(after.state(), before.state());
    assert_eq!(after.ledger(), before.ledger());
    assert_eq!(after.totals(InningsNumber::First), before.totals(InningsNumber::First));
    assert_eq!(after.totals(InningsNumber::Second), before.totals(InningsNumber::Second));
    assert_eq!(after.active_players(), before.active_players());

    for row in after.stats().iter() {
        match before.stats().stats_for(&row.player_id) {
            Some(original) => assert_eq!(row, original),
            None => {
                assert_eq!(row.batting, BattingStats::default(), "{}", row.player_id);
                assert_eq!(row.bowling, BowlingStats::default(), "{}", row.player_id);
            }
        }
    }
    assert!(after.totals_consistent());
}

// ============================================================================
// Round trips
// ============================================================================

#[rstest]
#[case(1)]
#[case(42)]
#[case(2024)]
#[case(31337)]
#[tokio::test]
async fn undoing_every_ball_restores_the_fresh_match(#[case] seed: u64) {
    let setup = TestSetupBuilder::new()
        .with_overs(2)
        .with_wickets(Some(5))
        .build()
        .await;
    let before = setup.session().await;

    let mut balls = BallSequenceBuilder::new(seed).with_wicket_percent(12);
    let recorded = play(&setup, &mut balls, 60).await;
    assert!(recorded > 0);

    undo(&setup, recorded).await;

    let after = setup.session().await;
    assert_restored(&before, &after);
    assert!(after.ledger().is_empty(InningsNumber::First));

    let err = setup
        .service
        .undo_last_ball(&setup.match_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ScoringError::NothingToUndo));
}

#[rstest]
#[case(5, 3)]
#[case(12, 7)]
#[case(20, 11)]
#[tokio::test]
async fn undoing_a_tail_restores_the_earlier_snapshot(
    #[case] seed: u64,
    #[case] prefix: usize,
) {
    let setup = TestSetupBuilder::new()
        .with_overs(3)
        .with_wickets(Some(5))
        .build()
        .await;
    let mut balls = BallSequenceBuilder::new(seed);

    play(&setup, &mut balls, prefix).await;
    if setup.session().await.state().status != MatchStatus::Live {
        return;
    }
    fill_missing_players(&setup).await;
    let snapshot = setup.session().await;

    let tail = play(&setup, &mut balls, 15).await;
    undo(&setup, tail).await;

    assert_restored(&snapshot, &setup.session().await);
}

#[tokio::test]
async fn undoing_the_result_reopens_the_match() {
    let setup = TestSetupBuilder::new().with_overs(1).build().await;
    bowl_all(&setup, vec![BallInput::runs(1); 6]).await;
    start_second_innings(&setup).await;
    bowl_all(&setup, vec![BallInput::runs(2), BallInput::runs(6)]).await;
    assert_eq!(setup.session().await.state().status, MatchStatus::Completed);

    let outcome = setup.service.undo_last_ball(&setup.match_id).await.unwrap();

    assert!(outcome.reopened);
    let session = setup.session().await;
    assert_eq!(session.state().status, MatchStatus::Live);
    assert_eq!(session.state().winner, None);
    assert_eq!(session.state().man_of_the_match, None);
    assert_eq!(session.state().end_date_time, None);
    assert_eq!(session.current_totals().total_runs, 2);
    assert_eq!(session.phase(), MatchPhase::Live);

    // the match can be finished again and signals once more
    bowl(&setup, BallInput::runs(6)).await;
    assert_eq!(setup.signal.fired_count().await, 2);
}

// ============================================================================
// Over and innings boundaries
// ============================================================================

#[tokio::test]
async fn undoing_the_sixth_ball_reopens_the_over() {
    let setup = TestSetupBuilder::new().build().await;
    bowl_all(&setup, vec![BallInput::runs(1); 6]).await;

    let session = setup.session().await;
    assert_eq!(session.current_totals().total_overs, 1);
    assert_eq!(session.active_players().bowler, None);

    let outcome = setup.service.undo_last_ball(&setup.match_id).await.unwrap();

    assert_eq!(outcome.over_index, 0);
    assert_eq!(outcome.ball_number, 6);
    assert!(outcome.ball.is_over_end);
    assert!(!outcome.reopened);

    let session = setup.session().await;
    let total = session.current_totals();
    assert_eq!((total.total_overs, total.total_balls), (0, 5));
    assert_eq!(total.total_runs, 5);
    assert_eq!(session.active_players().bowler.as_deref(), Some("tigers-1"));
    assert_eq!(session.phase(), MatchPhase::Live);
    assert_eq!(
        session.ledger().get_over(InningsNumber::First, 0).map(|o| o.len()),
        Some(5)
    );

    let bowler = session.stats().stats_for("tigers-1").unwrap();
    assert_eq!(bowler.bowling.overs_bowled, 0);
    assert_eq!(bowler.bowling.balls_bowled_in_current_over, 5);
    assert_eq!(bowler.bowling.runs_in_current_over, 5);
}

#[tokio::test]
async fn undoing_the_first_ball_of_an_over_drops_the_over() {
    let setup = TestSetupBuilder::new().build().await;
    bowl_all(&setup, vec![BallInput::dot(); 6]).await;
    bowl(&setup, BallInput::runs(4)).await;

    let session = setup.session().await;
    let new_bowler = session.active_players().bowler.clone();
    assert_ne!(new_bowler.as_deref(), Some("tigers-1"));
    assert!(session.ledger().get_over(InningsNumber::First, 1).is_some());

    setup.service.undo_last_ball(&setup.match_id).await.unwrap();

    let session = setup.session().await;
    assert!(session.ledger().get_over(InningsNumber::First, 1).is_none());
    assert_eq!(session.current_totals().total_overs, 1);
    assert_eq!(session.active_players().bowler, new_bowler);

    // the maiden comes back off when the over is reopened
    assert_eq!(
        session.stats().stats_for("tigers-1").unwrap().bowling.maidens,
        1
    );
    setup.service.undo_last_ball(&setup.match_id).await.unwrap();
    assert_eq!(
        setup
            .session()
            .await
            .stats()
            .stats_for("tigers-1")
            .unwrap()
            .bowling
            .maidens,
        0
    );
}

#[tokio::test]
async fn undo_with_an_empty_second_innings_reaches_back_into_the_first() {
    let setup = TestSetupBuilder::new().with_overs(1).build().await;
    bowl_all(&setup, vec![BallInput::dot(); 5]).await;
    bowl(&setup, BallInput::runs(3)).await;
    start_second_innings(&setup).await;

    let outcome = setup.service.undo_last_ball(&setup.match_id).await.unwrap();

    assert_eq!(outcome.innings, InningsNumber::First);
    assert!(outcome.reopened);
    let session = setup.session().await;
    assert!(session.state().is_first_inning);
    assert_eq!(session.state().target_baseline, None);
    assert_eq!(session.batting_team().id, "lions");
    assert_eq!(
        session.active_players().missing_slots(),
        Vec::<PlayerSlot>::new()
    );
    assert!(setup
        .sink
        .over_document(&format!("{}_lions_1_0", setup.match_id))
        .await
        .iter()
        .all(|(key, _)| key != "ball_6"));
}

#[tokio::test]
async fn undo_on_a_fresh_match_has_nothing_to_remove() {
    let setup = TestSetupBuilder::new().build().await;

    let err = setup
        .service
        .undo_last_ball(&setup.match_id)
        .await
        .unwrap_err();

    assert_eq!(err.reason_code(), "nothing_to_undo");
    assert_eq!(setup.sink.stored_ball_count().await, 0);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_are_serialized() {
    let setup = TestSetupBuilder::new().quick_match().build().await;

    let submissions = (0..30).map(|_| {
        let service = setup.service.clone();
        let match_id = setup.match_id.clone();
        tokio::spawn(async move { service.submit_ball(&match_id, &BallInput::runs(1)).await })
    });
    let results = join_all(submissions).await;

    for result in results {
        assert!(result.unwrap().is_ok());
    }

    let session = setup.session().await;
    let total = session.current_totals();
    assert_eq!(total.total_runs, 30);
    assert_eq!((total.total_overs, total.total_balls), (5, 0));
    assert!(session.totals_consistent());
    for over in session.ledger().get_innings(InningsNumber::First) {
        assert_eq!(over.len(), 6);
        assert!(over.latest_ball().unwrap().is_over_end);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn submissions_and_undos_interleave_safely() {
    let setup = TestSetupBuilder::new().quick_match().build().await;
    bowl_all(&setup, vec![BallInput::runs(2); 10]).await;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let service = setup.service.clone();
        let match_id = setup.match_id.clone();
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                service
                    .submit_ball(&match_id, &BallInput::runs(1))
                    .await
                    .map(|_| ())
            } else {
                service.undo_last_ball(&match_id).await.map(|_| ())
            }
        }));
    }
    for result in join_all(tasks).await {
        assert!(result.unwrap().is_ok());
    }

    let session = setup.session().await;
    assert!(session.totals_consistent());
    assert_eq!(session.ledger().ball_count(InningsNumber::First), 10);
    assert_eq!(
        setup.sink.stored_ball_count().await,
        session.ledger().ball_count(InningsNumber::First)
    );
}
