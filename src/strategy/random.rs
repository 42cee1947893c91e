//! A single artless strategy to show how they are written.

use std::fmt::Display;

use rand::{seq::SliceRandom, RngCore};

use crate::strategy::{Code, History, Move, Strategy};

static SHRUGS: &[&str] = &[
    "Pure chance, zero fear.",
    "Spinning the wheel again.",
    "My gut says this one.",
    "No plan survives contact with the codemaker.",
];

/// A Bulls and Cows strategy that guesses a fresh random code every turn.
///
/// This exists to show how [`Strategy`](super::Strategy) is implemented and
/// to serve as a baseline for the test harness: anything worth shipping
/// should beat it. It ignores feedback entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Random;

impl Strategy for Random {
    fn guess(&self, _history: &History, rng: &mut dyn RngCore) -> Move {
        let quip = *SHRUGS.choose(rng).expect("the quip list is not empty");

        Move::new(Code::random(rng), quip)
    }

    fn version(&self) -> &'static str {
        "0.1.2"
    }
}

impl Display for Random {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bullcow_rs::Random")
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn guesses_are_valid_and_quips_are_canned() {
        let mut rng = StdRng::seed_from_u64(7);
        let history = History::new();

        for _ in 0..50 {
            let mv = Random.guess(&history, &mut rng);
            assert!(Code::is_valid(&mv.code.to_string()));
            assert!(SHRUGS.contains(&mv.banter.as_str()));
        }
    }

    #[test]
    fn seeded_runs_repeat_exactly() {
        let history = History::new();

        let mut first = StdRng::seed_from_u64(104);
        let mut second = StdRng::seed_from_u64(104);

        for _ in 0..20 {
            assert_eq!(
                Random.guess(&history, &mut first),
                Random.guess(&history, &mut second)
            );
        }
    }
}
