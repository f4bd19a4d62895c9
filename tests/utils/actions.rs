use scorebook::scoring::{
    BallInput, BallOutcome, MatchPhase, MatchSession, PlayerSelection, PlayerSlot, Role,
};

use super::setup::TestSetup;

// ============================================================================
// Scorer Actions
// ============================================================================

/// Answers every outstanding player prompt with the first eligible player.
/// A new bowler is never the one who bowled the previous over.
pub async fn fill_missing_players(setup: &TestSetup) {
    let service = &setup.service;
    let match_id = &setup.match_id;

    let missing = match service.phase(match_id).await.unwrap() {
        MatchPhase::AwaitingPlayers { missing } => missing,
        _ => return,
    };

    for slot in missing {
        let selection = match slot {
            PlayerSlot::Striker | PlayerSlot::NonStriker => {
                let batters = service.eligible_players(match_id, Role::Batter).await.unwrap();
                let batter = batters.first().expect("a batter should be available");
                if slot == PlayerSlot::Striker {
                    PlayerSelection::striker(&batter.id)
                } else {
                    PlayerSelection::non_striker(&batter.id)
                }
            }
            PlayerSlot::Bowler => {
                let previous = last_bowler(&setup.session().await);
                let bowlers = service.eligible_players(match_id, Role::Bowler).await.unwrap();
                let bowler = bowlers
                    .iter()
                    .find(|p| Some(&p.id) != previous.as_ref())
                    .expect("a bowler should be available");
                PlayerSelection::bowler(&bowler.id)
            }
        };
        service.select_players(match_id, &selection).await.unwrap();
    }
}

fn last_bowler(session: &MatchSession) -> Option<String> {
    let innings = session.state().current_innings();
    session
        .ledger()
        .latest_over(innings)
        .and_then(|over| over.latest_ball())
        .and_then(|ball| ball.bowler_id.clone())
}

/// Fills any empty slot and then records the ball
pub async fn bowl(setup: &TestSetup, input: BallInput) -> BallOutcome {
    fill_missing_players(setup).await;
    setup
        .service
        .submit_ball(&setup.match_id, &input)
        .await
        .unwrap()
}

/// Bowls each input in order
pub async fn bowl_all(setup: &TestSetup, inputs: impl IntoIterator<Item = BallInput>) -> Vec<BallOutcome> {
    let mut outcomes = Vec::new();
    for input in inputs {
        outcomes.push(bowl(setup, input).await);
    }
    outcomes
}

pub async fn start_second_innings(setup: &TestSetup) {
    setup
        .service
        .begin_second_innings(&setup.match_id)
        .await
        .unwrap();
}
