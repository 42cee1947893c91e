use std::fmt::Display;

use rand::{seq::SliceRandom, RngCore};

use bullcow_rs::{
    strategy::{Code, History, Move},
    Strategy,
};

use crate::util::{Deductions, OPENERS, QUIPS};

/// A strategy that rules digits out and fishes among the rest.
///
/// An answer of no bulls and no cows proves all three guessed digits
/// absent, so the strategy drops them for good. Each turn it draws three
/// digits, preferring candidates no guess has tried yet, then candidates
/// it has already probed, and only then the excluded pile (which a real
/// game never forces, since the secret's own digits can never be ruled
/// out). The draw is shuffled so position carries no pattern.
#[derive(Debug)]
pub struct Exclusion;

impl Strategy for Exclusion {
    fn guess(&self, history: &History, rng: &mut dyn RngCore) -> Move {
        if history.is_empty() {
            return Move::new(
                Code::random(rng),
                *OPENERS.choose(rng).expect("the quip list is not empty"),
            );
        }

        let deductions = Deductions::from_history(history);
        let fresh = deductions.fresh();
        let candidates = deductions.candidates();

        let mut picks: Vec<u8> = Vec::with_capacity(3);
        let pools = [
            fresh,
            candidates.difference(fresh),
            deductions.excluded(),
        ];
        for pool in pools {
            let mut digits: Vec<u8> = pool.iter().collect();
            digits.shuffle(rng);
            for digit in digits {
                if picks.len() == 3 {
                    break;
                }
                picks.push(digit);
            }
        }
        picks.shuffle(rng);

        let code =
            Code::new([picks[0], picks[1], picks[2]]).expect("the digit pools are disjoint");

        Move::new(code, *QUIPS.choose(rng).expect("the quip list is not empty"))
    }

    fn version(&self) -> &'static str {
        "0.2.1"
    }
}

impl Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bullcow_strategies::Exclusion")
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use bullcow_rs::strategy::{Code, Feedback, History, Secret};

    use super::*;

    #[test]
    fn opens_with_a_canned_line() {
        let mut rng = StdRng::seed_from_u64(104);
        let mv = Exclusion.guess(&History::new(), &mut rng);
        assert!(OPENERS.contains(&mv.banter.as_str()));
    }

    #[test]
    fn a_missed_probe_never_comes_back() {
        let mut history = History::new();
        history.record(Code::from_str("045").unwrap(), Feedback::new(0, 0));

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mv = Exclusion.guess(&history, &mut rng);
            for digit in [0, 4, 5] {
                assert!(!mv.code.contains(digit), "guessed {}", mv.code);
            }
        }
    }

    #[test]
    fn untried_digits_come_first() {
        let mut history = History::new();
        history.record(Code::from_str("012").unwrap(), Feedback::new(0, 2));

        // Nothing is excluded, but seven digits are still fresh.
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mv = Exclusion.guess(&history, &mut rng);
            for digit in [0, 1, 2] {
                assert!(!mv.code.contains(digit), "guessed {}", mv.code);
            }
        }
    }

    #[test]
    fn exhausting_the_pool_still_yields_a_guess() {
        let mut history = History::new();
        for probe in ["012", "345", "678"] {
            history.record(Code::from_str(probe).unwrap(), Feedback::new(0, 0));
        }

        // Only one candidate digit is left, so the guess has to borrow
        // from the excluded pile.
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mv = Exclusion.guess(&history, &mut rng);
            assert!(mv.code.contains(9), "guessed {}", mv.code);
        }
    }

    #[test]
    fn exclusions_only_grow_over_a_game() {
        let secret = Secret::new(Code::from_str("172").unwrap());
        let mut rng = StdRng::seed_from_u64(7);
        let mut history = History::new();

        let mut ruled_out = 0;
        for _ in 0..40 {
            let mv = Exclusion.guess(&history, &mut rng);
            let deductions = Deductions::from_history(&history);
            for digit in 0..10 {
                if deductions.excluded().contains(digit) {
                    assert!(!mv.code.contains(digit));
                }
            }

            let feedback = secret.check(&mv.code);
            history.record(mv.code, feedback);

            let after = Deductions::from_history(&history).excluded().len();
            assert!(after >= ruled_out);
            ruled_out = after;

            if feedback.is_win() {
                break;
            }
        }
    }

    #[test]
    fn table_talk_stays_digit_free() {
        let secret = Secret::new(Code::from_str("506").unwrap());
        let mut rng = StdRng::seed_from_u64(11);
        let mut history = History::new();

        for _ in 0..15 {
            let mv = Exclusion.guess(&history, &mut rng);
            assert!(!mv.banter.chars().any(|c| c.is_ascii_digit()), "{}", mv.banter);

            let feedback = secret.check(&mv.code);
            history.record(mv.code, feedback);
            if feedback.is_win() {
                break;
            }
        }
    }

    #[test]
    fn cracks_a_fixed_code_within_the_cap() {
        for (seed, code) in [(1, "172"), (2, "045"), (3, "398")] {
            let secret = Secret::new(Code::from_str(code).unwrap());
            let mut rng = StdRng::seed_from_u64(seed);
            let mut history = History::new();

            for _ in 0..1000 {
                let mv = Exclusion.guess(&history, &mut rng);
                let feedback = secret.check(&mv.code);
                history.record(mv.code, feedback);
                if feedback.is_win() {
                    break;
                }
            }

            assert!(history.solved(), "did not crack {} in 1000 turns", code);
        }
    }
}
