use tracing::warn;

use super::models::{PlayerMatchStat, StatsTable};
use crate::scoring::{ActivePlayers, BallEvent, BALLS_PER_OVER};

/// Applies and reverses the effect of single balls on the match stats table.
///
/// Both directions return a new table; the input is never modified.
pub struct PlayerStatsTracker;

impl PlayerStatsTracker {
    pub fn apply_ball(table: &StatsTable, ball: &BallEvent) -> StatsTable {
        let mut next = table.clone();

        if let Some(striker) = Self::row(&mut next, ball.striker_id.as_deref()) {
            let batting = &mut striker.batting;
            batting.runs += ball.runs_off_bat;
            if ball.is_legal() {
                batting.balls_faced += 1;
            }
            batting.fours += u32::from(ball.is_four());
            batting.sixes += u32::from(ball.is_six());
            batting.recompute();
        }

        if let Some(dismissed) = Self::row(&mut next, ball.dismissed_id.as_deref()) {
            dismissed.batting.is_out = true;
        }

        if let Some(bowler) = Self::row(&mut next, ball.bowler_id.as_deref()) {
            let bowling = &mut bowler.bowling;
            bowling.runs_conceded += ball.total_runs();
            bowling.runs_in_current_over += ball.total_runs();
            if ball.is_legal() {
                bowling.balls_bowled_in_current_over += 1;
            }
            if ball.is_over_end {
                if bowling.runs_in_current_over == 0 {
                    bowling.maidens += 1;
                }
                bowling.balls_bowled_in_current_over = 0;
                bowling.runs_in_current_over = 0;
                bowling.overs_bowled += 1;
            }
            bowling.extras += ball.extra_runs();
            bowling.fours_conceded += u32::from(ball.is_four());
            bowling.sixes_conceded += u32::from(ball.is_six());
            bowling.wickets += u32::from(ball.is_wicket);
            bowling.dot_balls += u32::from(ball.runs_off_bat == 0);
            bowling.recompute();
        }

        next
    }

    /// Exact inverse of [`PlayerStatsTracker::apply_ball`] for the most recent ball.
    ///
    /// `runs_earlier_in_over` is what the bowler had conceded in the over
    /// before this ball; it is only read when the ball ended the over.
    pub fn reverse_ball(
        table: &StatsTable,
        ball: &BallEvent,
        runs_earlier_in_over: u32,
    ) -> StatsTable {
        let mut previous = table.clone();

        if let Some(striker) = Self::row(&mut previous, ball.striker_id.as_deref()) {
            let batting = &mut striker.batting;
            batting.runs = batting.runs.saturating_sub(ball.runs_off_bat);
            if ball.is_legal() {
                batting.balls_faced = batting.balls_faced.saturating_sub(1);
            }
            batting.fours = batting.fours.saturating_sub(u32::from(ball.is_four()));
            batting.sixes = batting.sixes.saturating_sub(u32::from(ball.is_six()));
            batting.recompute();
        }

        if let Some(dismissed) = Self::row(&mut previous, ball.dismissed_id.as_deref()) {
            dismissed.batting.is_out = false;
        }

        if let Some(bowler) = Self::row(&mut previous, ball.bowler_id.as_deref()) {
            let bowling = &mut bowler.bowling;
            bowling.runs_conceded = bowling.runs_conceded.saturating_sub(ball.total_runs());
            if ball.is_over_end {
                if runs_earlier_in_over + ball.total_runs() == 0 {
                    bowling.maidens = bowling.maidens.saturating_sub(1);
                }
                bowling.overs_bowled = bowling.overs_bowled.saturating_sub(1);
                bowling.balls_bowled_in_current_over = BALLS_PER_OVER - 1;
                bowling.runs_in_current_over = runs_earlier_in_over;
            } else {
                if ball.is_legal() {
                    bowling.balls_bowled_in_current_over =
                        bowling.balls_bowled_in_current_over.saturating_sub(1);
                }
                bowling.runs_in_current_over = bowling
                    .runs_in_current_over
                    .saturating_sub(ball.total_runs());
            }
            bowling.extras = bowling.extras.saturating_sub(ball.extra_runs());
            bowling.fours_conceded = bowling
                .fours_conceded
                .saturating_sub(u32::from(ball.is_four()));
            bowling.sixes_conceded = bowling
                .sixes_conceded
                .saturating_sub(u32::from(ball.is_six()));
            bowling.wickets = bowling.wickets.saturating_sub(u32::from(ball.is_wicket));
            bowling.dot_balls = bowling
                .dot_balls
                .saturating_sub(u32::from(ball.runs_off_bat == 0));
            bowling.recompute();
        }

        previous
    }

    /// Strike changes on a 1 or 3 off the bat, and again at the end of the over
    pub fn should_swap_strike(ball: &BallEvent) -> bool {
        let odd_runs = matches!(ball.runs_off_bat, 1 | 3);
        odd_runs ^ ball.is_over_end
    }

    pub fn rotate_strike(active: &ActivePlayers, ball: &BallEvent) -> ActivePlayers {
        let mut next = active.clone();
        if Self::should_swap_strike(ball) {
            next.swap_strike();
        }
        next
    }

    fn row<'a>(table: &'a mut StatsTable, player_id: Option<&str>) -> Option<&'a mut PlayerMatchStat> {
        let player_id = player_id?;
        let row = table.stats_for_mut(player_id);
        if row.is_none() {
            warn!(player_id = %player_id, "No stats row for player involved in ball");
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ball::{test_support::*, Extra};
    use rstest::rstest;

    fn table() -> StatsTable {
        let mut table = StatsTable::new();
        table.ensure_player("striker", "Striker", "bat");
        table.ensure_player("non-striker", "Non Striker", "bat");
        table.ensure_player("bowler", "Bowler", "bowl");
        table
    }

    fn active() -> ActivePlayers {
        ActivePlayers {
            striker: Some("striker".into()),
            non_striker: Some("non-striker".into()),
            bowler: Some("bowler".into()),
        }
    }

    #[test]
    fn boundary_updates_batter_and_bowler() {
        let next = PlayerStatsTracker::apply_ball(&table(), &ball(4));

        let striker = next.stats_for("striker").unwrap();
        assert_eq!(striker.batting.runs, 4);
        assert_eq!(striker.batting.balls_faced, 1);
        assert_eq!(striker.batting.fours, 1);
        assert_eq!(striker.batting.strike_rate, 400.0);

        let bowler = next.stats_for("bowler").unwrap();
        assert_eq!(bowler.bowling.runs_conceded, 4);
        assert_eq!(bowler.bowling.fours_conceded, 1);
        assert_eq!(bowler.bowling.balls_bowled_in_current_over, 1);
        assert_eq!(bowler.bowling.dot_balls, 0);
    }

    #[test]
    fn wide_counts_as_extra_without_a_ball_faced() {
        let next = PlayerStatsTracker::apply_ball(&table(), &extra_ball(0, Extra::Wide));

        let striker = next.stats_for("striker").unwrap();
        assert_eq!(striker.batting.balls_faced, 0);
        assert_eq!(striker.batting.strike_rate, 0.0);

        let bowler = next.stats_for("bowler").unwrap();
        assert_eq!(bowler.bowling.extras, 1);
        assert_eq!(bowler.bowling.runs_conceded, 1);
        assert_eq!(bowler.bowling.balls_bowled_in_current_over, 0);
    }

    #[test]
    fn dismissal_marks_the_selected_batter_out() {
        let wicket = BallEvent {
            is_wicket: true,
            dismissed_id: Some("non-striker".into()),
            ..ball(0)
        };
        let next = PlayerStatsTracker::apply_ball(&table(), &wicket);

        assert!(next.stats_for("non-striker").unwrap().batting.is_out);
        assert!(!next.stats_for("striker").unwrap().batting.is_out);
        assert_eq!(next.stats_for("bowler").unwrap().bowling.wickets, 1);

        let restored = PlayerStatsTracker::reverse_ball(&next, &wicket, 0);
        assert_eq!(restored, table());
    }

    #[test]
    fn maiden_over_is_credited_and_reversed() {
        let mut current = table();
        for _ in 0..5 {
            current = PlayerStatsTracker::apply_ball(&current, &ball(0));
        }
        let before_last = current.clone();
        current = PlayerStatsTracker::apply_ball(&current, &over_end_ball(0));

        let bowling = &current.stats_for("bowler").unwrap().bowling;
        assert_eq!(bowling.maidens, 1);
        assert_eq!(bowling.overs_bowled, 1);
        assert_eq!(bowling.balls_bowled_in_current_over, 0);
        assert_eq!(bowling.dot_balls, 6);

        let restored = PlayerStatsTracker::reverse_ball(&current, &over_end_ball(0), 0);
        assert_eq!(restored, before_last);
    }

    #[test]
    fn reversing_over_end_restores_runs_in_over() {
        let mut current = table();
        for runs in [1, 0, 2, 0, 0] {
            current = PlayerStatsTracker::apply_ball(&current, &ball(runs));
        }
        let before_last = current.clone();
        current = PlayerStatsTracker::apply_ball(&current, &over_end_ball(1));
        assert_eq!(current.stats_for("bowler").unwrap().bowling.maidens, 0);

        let restored = PlayerStatsTracker::reverse_ball(&current, &over_end_ball(1), 3);
        assert_eq!(restored, before_last);
        assert_eq!(
            restored.stats_for("bowler").unwrap().bowling.balls_bowled_in_current_over,
            5
        );
    }

    #[rstest]
    #[case(0, false, false)]
    #[case(1, false, true)]
    #[case(2, false, false)]
    #[case(3, false, true)]
    #[case(4, false, false)]
    #[case(1, true, false)]
    #[case(0, true, true)]
    #[case(4, true, true)]
    fn strike_rotation_follows_odd_runs_and_over_end(
        #[case] runs: u32,
        #[case] over_end: bool,
        #[case] swapped: bool,
    ) {
        let event = BallEvent {
            is_over_end: over_end,
            ..ball(runs)
        };
        let next = PlayerStatsTracker::rotate_strike(&active(), &event);
        let expected_striker = if swapped { "non-striker" } else { "striker" };
        assert_eq!(next.striker.as_deref(), Some(expected_striker));
    }

    #[test]
    fn extra_run_alone_does_not_rotate_strike() {
        let next = PlayerStatsTracker::rotate_strike(&active(), &extra_ball(0, Extra::NoBall));
        assert_eq!(next, active());
    }

    #[test]
    fn players_without_rows_are_ignored() {
        let anonymous = BallEvent {
            striker_id: None,
            non_striker_id: None,
            bowler_id: None,
            ..ball(6)
        };
        let next = PlayerStatsTracker::apply_ball(&table(), &anonymous);
        assert_eq!(next, table());
    }
}
