use rand::{rngs::StdRng, Rng, SeedableRng};

use scorebook::scoring::{BallInput, DismissedBatter};

// ============================================================================
// Ball Sequences
// ============================================================================

/// Generates reproducible, always-valid ball inputs from a seed
pub struct BallSequenceBuilder {
    rng: StdRng,
    wicket_percent: u32,
    extras_percent: u32,
}

impl BallSequenceBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            wicket_percent: 8,
            extras_percent: 12,
        }
    }

    pub fn with_wicket_percent(mut self, percent: u32) -> Self {
        self.wicket_percent = percent;
        self
    }

    pub fn with_extras_percent(mut self, percent: u32) -> Self {
        self.extras_percent = percent;
        self
    }

    pub fn next_ball(&mut self) -> BallInput {
        let roll = self.rng.random_range(0..100);

        if roll < self.wicket_percent {
            let dismissed = if self.rng.random_range(0..4) == 0 {
                DismissedBatter::NonStriker
            } else {
                DismissedBatter::Striker
            };
            let mut input = BallInput::wicket(dismissed);
            input.runs_off_bat = self.rng.random_range(0..2);
            if self.rng.random_range(0..5) == 0 {
                input = input.with_extra(scorebook::scoring::Extra::NoBall);
            }
            return input;
        }

        if roll < self.wicket_percent + self.extras_percent {
            let runs = self.rng.random_range(0..3);
            return if self.rng.random_bool(0.5) {
                BallInput::wide(runs)
            } else {
                BallInput::no_ball(runs)
            };
        }

        const RUNS: [u32; 10] = [0, 0, 0, 1, 1, 2, 3, 4, 4, 6];
        BallInput::runs(RUNS[self.rng.random_range(0..RUNS.len())])
    }

    pub fn build(mut self, len: usize) -> Vec<BallInput> {
        (0..len).map(|_| self.next_ball()).collect()
    }
}
