//! Tools for defining Bulls and Cows strategies.

use std::fmt::{Debug, Display};

use itertools::Itertools;
use rand::{seq::index::sample, Rng, RngCore};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CodeError, Result};

pub mod random;
pub use random::Random;

/// A Bulls and Cows code.
///
/// This struct represents a code of three decimal digits, and its
/// construction is validated to ensure that every instance holds three
/// *distinct* digits. Functions taking a [`Code`] never need to re-check
/// that invariant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Code {
    digits: [u8; 3],
}

impl Code {
    /// The number of possible codes: ten choices for the first digit, nine
    /// for the second, eight for the third.
    pub const COUNT: usize = 720;

    /// Creates a new [`Code`] from three digits.
    ///
    /// Returns an error if any value is larger than nine or if the same
    /// digit appears twice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bullcow_rs::strategy::Code;
    /// #
    /// let code = Code::new([3, 9, 8])?;
    /// assert_eq!(code.to_string(), "398");
    ///
    /// assert!(Code::new([3, 3, 9]).is_err());
    /// assert!(Code::new([3, 12, 9]).is_err());
    /// #
    /// # Ok::<_, bullcow_rs::BullcowError>(())
    /// ```
    pub fn new(digits: [u8; 3]) -> Result<Self> {
        if let Some(&bad) = digits.iter().find(|&&d| d > 9) {
            return Err(CodeError::DigitRange(bad).into());
        }

        if digits[0] == digits[1] || digits[0] == digits[2] {
            Err(CodeError::RepeatedDigit(digits[0]).into())
        } else if digits[1] == digits[2] {
            Err(CodeError::RepeatedDigit(digits[1]).into())
        } else {
            Ok(Code { digits })
        }
    }

    /// Creates a new [`Code`] from a three character string.
    ///
    /// Returns an error if the string is not exactly three characters, if
    /// any character is not a decimal digit, or if a digit repeats.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bullcow_rs::strategy::Code;
    /// #
    /// let code = Code::from_str("398")?;
    /// assert_eq!(code.digits(), [3, 9, 8]);
    ///
    /// assert!(Code::from_str("39").is_err());
    /// assert!(Code::from_str("3a9").is_err());
    /// assert!(Code::from_str("339").is_err());
    /// #
    /// # Ok::<_, bullcow_rs::BullcowError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(code: &str) -> Result<Self> {
        let len = code.chars().count();
        if len != 3 {
            return Err(CodeError::Length(len).into());
        }

        let mut digits = [0; 3];
        for (slot, c) in digits.iter_mut().zip(code.chars()) {
            *slot = c.to_digit(10).ok_or(CodeError::NotADigit(c))? as u8;
        }

        Self::new(digits)
    }

    /// Creates a new [`Code`] from an index into the enumeration of all
    /// possible codes, ordered lexicographically by digits.
    ///
    /// Returns an error if the index is [`COUNT`](Self::COUNT) or larger.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bullcow_rs::strategy::Code;
    /// #
    /// assert_eq!(Code::from_index(0)?, Code::from_str("012")?);
    /// assert_eq!(Code::from_index(Code::COUNT - 1)?, Code::from_str("987")?);
    ///
    /// assert!(Code::from_index(Code::COUNT).is_err());
    /// #
    /// # Ok::<_, bullcow_rs::BullcowError>(())
    /// ```
    pub fn from_index(index: usize) -> Result<Self> {
        if index >= Self::COUNT {
            return Err(CodeError::InvalidIndex(index).into());
        }

        // Unrank: each removal shrinks the pool, so the quotients select
        // among 10, then 9, then 8 remaining digits.
        let mut pool: Vec<u8> = (0..10).collect();
        let first = pool.remove(index / 72);
        let second = pool.remove((index % 72) / 8);
        let third = pool.remove(index % 8);

        Ok(Code {
            digits: [first, second, third],
        })
    }

    /// Draws a uniformly random [`Code`] from the provided generator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rand::{rngs::StdRng, SeedableRng};
    /// # use bullcow_rs::strategy::Code;
    ///
    /// let mut rng = StdRng::seed_from_u64(104);
    /// let code = Code::random(&mut rng);
    /// assert!(Code::is_valid(&code.to_string()));
    /// ```
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let picks = sample(rng, 10, 3);

        Code {
            digits: [
                picks.index(0) as u8,
                picks.index(1) as u8,
                picks.index(2) as u8,
            ],
        }
    }

    /// Returns an iterator over every possible code, in the same order as
    /// [`from_index()`](Self::from_index()).
    pub fn all() -> impl Iterator<Item = Code> {
        (0..10_u8).permutations(3).map(|digits| Code {
            digits: [digits[0], digits[1], digits[2]],
        })
    }

    /// Checks whether a string parses as a code.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bullcow_rs::strategy::Code;
    /// #
    /// assert!(Code::is_valid("398"));
    /// assert!(!Code::is_valid("3980"));
    /// ```
    pub fn is_valid(code: &str) -> bool {
        Self::from_str(code).is_ok()
    }

    /// Returns the three digits of the code in order.
    pub fn digits(&self) -> [u8; 3] {
        self.digits
    }

    /// Returns true if the given digit appears anywhere in the code.
    pub fn contains(&self, digit: u8) -> bool {
        self.digits.contains(&digit)
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.digits[0], self.digits[1], self.digits[2])
    }
}

/// The answer a codemaker gives to a single guess.
///
/// Bulls count digits of the guess that sit in the same position in the
/// secret; cows count digits that appear in the secret but in a different
/// position. Each guess position contributes to at most one of the two, so
/// `bulls + cows` never exceeds three.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Feedback {
    bulls: u8,
    cows: u8,
}

impl Feedback {
    /// Creates feedback from raw counts, for replaying recorded games.
    pub fn new(bulls: u8, cows: u8) -> Self {
        debug_assert!(bulls <= 3 && cows <= 3 && bulls + cows <= 3);
        Feedback { bulls, cows }
    }

    /// The number of guess digits in the right position.
    pub fn bulls(&self) -> u8 {
        self.bulls
    }

    /// The number of guess digits in the secret but in the wrong position.
    pub fn cows(&self) -> u8 {
        self.cows
    }

    /// The number of guess digits that appear in the secret at all.
    pub fn total(&self) -> u8 {
        self.bulls + self.cows
    }

    /// Returns true if this feedback means the guess was the secret.
    pub fn is_win(&self) -> bool {
        self.bulls == 3
    }

    /// Returns true if no digit of the guess appears in the secret.
    ///
    /// A miss is the strongest answer a guesser can receive: all three
    /// guessed digits are provably absent from the secret.
    pub fn is_miss(&self) -> bool {
        self.bulls == 0 && self.cows == 0
    }
}

impl Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_win() {
            write!(f, "code cracked")
        } else if self.is_miss() {
            write!(f, "no matches")
        } else {
            if self.bulls > 0 {
                write!(f, "{} in the right spot", self.bulls)?;
                if self.cows > 0 {
                    write!(f, ", ")?;
                }
            }
            if self.cows > 0 {
                write!(f, "{} in the wrong spot", self.cows)?;
            }
            Ok(())
        }
    }
}

/// A secret code to be guessed.
///
/// The side holding the secret scores guesses with
/// [`check()`](Secret::check()); strategies never see this struct, only the
/// [`Feedback`] it produces.
///
/// # Examples
///
/// ```rust
/// # use bullcow_rs::strategy::{Code, Secret};
/// #
/// let secret = Secret::new(Code::from_str("172")?);
/// let feedback = secret.check(&Code::from_str("127")?);
///
/// assert_eq!((feedback.bulls(), feedback.cows()), (1, 2));
/// #
/// # Ok::<_, bullcow_rs::BullcowError>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Secret {
    code: Code,
}

impl Secret {
    /// Creates a new secret from a [`Code`].
    pub fn new(code: Code) -> Self {
        Secret { code }
    }

    /// Draws a uniformly random secret from the provided generator.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Secret {
            code: Code::random(rng),
        }
    }

    /// Scores a guess against this secret.
    ///
    /// Each position of the guess is graded independently: a digit in the
    /// same position as in the secret is a bull, a digit that appears
    /// elsewhere in the secret is a cow. Both codes hold distinct digits,
    /// so no further double-counting guard is needed.
    pub fn check(&self, guess: &Code) -> Feedback {
        let mut bulls = 0;
        let mut cows = 0;

        for (mine, theirs) in self.code.digits.iter().zip(guess.digits.iter()) {
            if mine == theirs {
                bulls += 1;
            } else if self.code.contains(*theirs) {
                cows += 1;
            }
        }

        Feedback { bulls, cows }
    }

    /// Returns the code behind this secret.
    pub fn reveal(&self) -> Code {
        self.code
    }
}

/// One completed turn of a game: a guess and the feedback it earned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Turn {
    guess: Code,
    feedback: Feedback,
}

impl Turn {
    /// Creates a turn from its parts.
    pub fn new(guess: Code, feedback: Feedback) -> Self {
        Turn { guess, feedback }
    }

    /// The code that was guessed.
    pub fn guess(&self) -> Code {
        self.guess
    }

    /// The feedback the codemaker answered with.
    pub fn feedback(&self) -> Feedback {
        self.feedback
    }
}

impl Display for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.guess, self.feedback)
    }
}

/// The scored guesses of one game, oldest first.
///
/// A [`Strategy`] receives the history of its own previous guesses on every
/// call and recomputes whatever it needs from scratch, so strategies stay
/// stateless between turns. The caller appends each `(guess, feedback)`
/// pair after scoring it.
///
/// # Examples
///
/// ```rust
/// # use bullcow_rs::strategy::{Code, History, Secret};
/// #
/// let secret = Secret::new(Code::from_str("398")?);
/// let mut history = History::new();
///
/// let guess = Code::from_str("124")?;
/// history.record(guess, secret.check(&guess));
///
/// assert_eq!(history.len(), 1);
/// assert!(history.turns()[0].feedback().is_miss());
/// assert!(!history.solved());
/// #
/// # Ok::<_, bullcow_rs::BullcowError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a scored guess to the history.
    pub fn record(&mut self, guess: Code, feedback: Feedback) {
        self.turns.push(Turn::new(guess, feedback));
    }

    /// Returns a slice of the recorded turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        self.turns.as_slice()
    }

    /// Returns the number of recorded turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true if no turns have been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Returns the most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Returns true if the last recorded turn cracked the code.
    pub fn solved(&self) -> bool {
        matches!(self.turns.last(), Some(turn) if turn.feedback().is_win())
    }
}

impl Display for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some((last, rest)) = self.turns.split_last() {
            for turn in rest {
                writeln!(f, "{}", turn)?;
            }
            write!(f, "{}", last)?;
        }
        Ok(())
    }
}

/// A guess produced by a [`Strategy`], with a line of table talk.
///
/// The banter accompanies the guess when a game is shown to a human. It
/// must never leak information about the digits of the guess; keeping it
/// free of digits entirely is the easiest way to honor that.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move {
    /// The code to guess next.
    pub code: Code,

    /// A short remark to show alongside the guess.
    pub banter: String,
}

impl Move {
    /// Creates a move from a code and a remark.
    pub fn new(code: Code, banter: impl Into<String>) -> Self {
        Move {
            code,
            banter: banter.into(),
        }
    }
}

/// Trait defining a Bulls and Cows strategy.
///
/// To write a strategy, define a new struct and implement this trait on it.
/// A strategy is called once per turn with the [`History`] of its own
/// scored guesses and must return a [`Move`]. It never errors: however
/// degenerate the history, it has to produce *some* legal code.
///
/// # How to implement
///
/// First, make a new struct and implement [`Display`] on it. The test
/// harness uses [`Display`] to format the name of the strategy, so do not
/// use linebreaks.
///
/// ```rust
/// use std::fmt::Display;
///
/// #[derive(Debug)]
/// struct HighRoller;
///
/// impl Display for HighRoller {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "HighRoller")
///     }
/// }
/// ```
///
/// Then, implement [`Strategy`] itself. All randomness must come from the
/// generator passed in, so that seeded runs reproduce exactly.
///
/// ```rust
/// # use std::fmt::Display;
/// use rand::RngCore;
/// use bullcow_rs::{strategy::{Code, History, Move}, Strategy};
///
/// # #[derive(Debug)]
/// # struct HighRoller;
/// #
/// # impl Display for HighRoller {
/// #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
/// #         write!(f, "HighRoller")
/// #     }
/// # }
/// #
/// impl Strategy for HighRoller {
///     fn guess(&self, _history: &History, rng: &mut dyn RngCore) -> Move {
///         Move::new(Code::random(rng), "All in.")
///     }
///
///     fn version(&self) -> &'static str {
///         "0.1.0"
///     }
/// }
/// ```
pub trait Strategy: Display + Debug + Sync {
    /// Produces the next guess given the scored guesses so far.
    ///
    /// This is the main function to implement in this trait. The returned
    /// [`Move`] carries the guess and a remark to show a human opponent;
    /// the caller is responsible for scoring the guess and recording it in
    /// the history before the next call.
    fn guess(&self, history: &History, rng: &mut dyn RngCore) -> Move;

    /// Provides a version for this strategy.
    ///
    /// You should ensure that this changes each time you update the logic
    /// of the strategy in order to produce meaningful comparisons. The
    /// value of this function for a particular instance of the strategy
    /// should not change once it is configured.
    fn version(&self) -> &'static str;
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::BullcowError;

    macro_rules! feedback_test {
        (I $secret:ident; $guess:expr, $bulls:expr, $cows:expr) => {{
            let feedback = $secret.check(&Code::from_str($guess)?);
            assert_eq!(
                (feedback.bulls(), feedback.cows()),
                ($bulls, $cows),
                "guessed {} against {}",
                $guess,
                $secret.reveal(),
            );
        }};

        ($fn_name:ident[$secret:expr => $( [$guess:expr, $bulls:expr, $cows:expr] );*]) => {
            #[test]
            fn $fn_name() -> Result<(), BullcowError> {
                let secret = Secret::new(Code::from_str($secret)?);

                $(feedback_test!(I secret; $guess, $bulls, $cows);)*

                Ok(())
            }
        };
    }

    feedback_test! { cracked [ "398" => ["398", 3, 0]] }

    feedback_test! { every_digit_misplaced ["398" => ["839", 0, 3]] }

    feedback_test! { complete_miss ["398" => ["124", 0, 0]] }

    feedback_test! { single_cow_from_shared_digit ["398" => ["123", 0, 1]] }

    feedback_test! { two_bulls_one_absent ["398" => ["391", 2, 0]] }

    feedback_test! { bull_then_two_cows ["172" => ["127", 1, 2]] }

    feedback_test! { graded_line_by_line ["527" =>
        ["527", 3, 0];
        ["752", 0, 3];
        ["572", 1, 2];
        ["134", 0, 0];
        ["751", 0, 2]]
    }

    #[test]
    fn accepts_and_rejects_candidate_strings() {
        assert!(Code::is_valid("398"));

        assert!(!Code::is_valid("33"));
        assert!(!Code::is_valid("3a9"));
        assert!(!Code::is_valid("339"));
        assert!(!Code::is_valid("3980"));
    }

    #[test]
    fn parse_errors_name_the_problem() {
        assert!(matches!(
            Code::from_str("33"),
            Err(BullcowError::Code {
                kind: CodeError::Length(2)
            })
        ));
        assert!(matches!(
            Code::from_str("3a9"),
            Err(BullcowError::Code {
                kind: CodeError::NotADigit('a')
            })
        ));
        assert!(matches!(
            Code::from_str("339"),
            Err(BullcowError::Code {
                kind: CodeError::RepeatedDigit(3)
            })
        ));
        assert!(matches!(
            Code::new([3, 12, 9]),
            Err(BullcowError::Code {
                kind: CodeError::DigitRange(12)
            })
        ));
        assert!(matches!(
            Code::from_index(Code::COUNT),
            Err(BullcowError::Code {
                kind: CodeError::InvalidIndex(Code::COUNT)
            })
        ));
    }

    #[test]
    fn enumeration_matches_indexing() -> Result<(), BullcowError> {
        let mut count = 0;
        for (index, code) in Code::all().enumerate() {
            assert_eq!(code, Code::from_index(index)?);
            count += 1;
        }
        assert_eq!(count, Code::COUNT);

        Ok(())
    }

    #[test]
    fn random_codes_cover_positions_evenly() {
        let mut rng = StdRng::seed_from_u64(3981);
        let mut counts = [[0_u32; 10]; 3];

        for _ in 0..30_000 {
            let code = Code::random(&mut rng);
            for (position, digit) in code.digits().iter().enumerate() {
                counts[position][*digit as usize] += 1;
            }
        }

        // Each digit lands in each position with probability 1/10, so every
        // count concentrates tightly around 3000.
        for position in counts.iter() {
            for &count in position.iter() {
                assert!((2000..=4000).contains(&count), "count was {}", count);
            }
        }
    }

    #[test]
    fn history_reports_the_course_of_a_game() -> Result<(), BullcowError> {
        let secret = Secret::new(Code::from_str("172")?);
        let mut history = History::new();

        assert!(history.is_empty());
        assert!(!history.solved());

        let miss = Code::from_str("045")?;
        history.record(miss, secret.check(&miss));
        assert_eq!(history.len(), 1);
        assert!(history.last().unwrap().feedback().is_miss());
        assert!(!history.solved());

        let win = Code::from_str("172")?;
        history.record(win, secret.check(&win));
        assert_eq!(history.len(), 2);
        assert!(history.solved());

        assert_eq!(format!("{}", history), "045 -> no matches\n172 -> code cracked");

        Ok(())
    }

    #[test]
    fn feedback_formats_like_a_codemaker_speaks() {
        assert_eq!(Feedback::new(3, 0).to_string(), "code cracked");
        assert_eq!(Feedback::new(0, 0).to_string(), "no matches");
        assert_eq!(
            Feedback::new(1, 2).to_string(),
            "1 in the right spot, 2 in the wrong spot"
        );
        assert_eq!(Feedback::new(2, 0).to_string(), "2 in the right spot");
        assert_eq!(Feedback::new(0, 1).to_string(), "1 in the wrong spot");
    }

    proptest! {
        #[test]
        fn feedback_is_bounded_and_wins_exactly_on_equality(
            a in 0..Code::COUNT,
            b in 0..Code::COUNT,
        ) {
            let secret = Code::from_index(a).unwrap();
            let guess = Code::from_index(b).unwrap();

            let feedback = Secret::new(secret).check(&guess);

            prop_assert!(feedback.total() <= 3);
            prop_assert_eq!(feedback.is_win(), secret == guess);
        }

        #[test]
        fn every_index_yields_a_distinct_digit_code(index in 0..Code::COUNT) {
            let code = Code::from_index(index).unwrap();
            let digits = code.digits();

            prop_assert!(digits.iter().all(|&d| d <= 9));
            prop_assert_ne!(digits[0], digits[1]);
            prop_assert_ne!(digits[0], digits[2]);
            prop_assert_ne!(digits[1], digits[2]);

            prop_assert_eq!(Code::from_str(&code.to_string()).unwrap(), code);
        }

        #[test]
        fn random_codes_parse_back(seed: u64) {
            let mut rng = StdRng::seed_from_u64(seed);
            let code = Code::random(&mut rng);

            prop_assert!(Code::is_valid(&code.to_string()));
        }
    }
}
