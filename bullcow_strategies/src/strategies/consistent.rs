use std::fmt::Display;

use lazy_static::lazy_static;
use rand::{seq::SliceRandom, RngCore};

use bullcow_rs::{
    strategy::{Code, History, Move, Secret},
    Strategy,
};

use crate::util::{OPENERS, QUIPS};

/// A strategy that only guesses codes consistent with every answer so far.
///
/// Each turn it replays the whole transcript against every possible code
/// and keeps the ones that would have produced exactly the answers seen.
/// The secret is always among them, so the pool collapses fast and the
/// strategy cracks most codes in a handful of turns. It is essentially
/// [`Exclusion`](crate::Exclusion) taken to its logical end, at the price
/// of scanning all 720 codes every turn.
///
/// When a transcript contradicts itself and the pool empties, the
/// strategy falls back to a random code rather than refusing to play.
#[derive(Debug)]
pub struct Consistent;

impl Strategy for Consistent {
    fn guess(&self, history: &History, rng: &mut dyn RngCore) -> Move {
        lazy_static! {
            static ref ALL_CODES: Vec<Code> = Code::all().collect();
        }

        if history.is_empty() {
            return Move::new(
                Code::random(rng),
                *OPENERS.choose(rng).expect("the quip list is not empty"),
            );
        }

        let viable: Vec<Code> = ALL_CODES
            .iter()
            .filter(|candidate| {
                history
                    .turns()
                    .iter()
                    .all(|turn| Secret::new(**candidate).check(&turn.guess()) == turn.feedback())
            })
            .copied()
            .collect();

        let code = viable
            .choose(rng)
            .copied()
            .unwrap_or_else(|| Code::random(rng));

        Move::new(code, *QUIPS.choose(rng).expect("the quip list is not empty"))
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}

impl Display for Consistent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bullcow_strategies::Consistent")
    }
}
