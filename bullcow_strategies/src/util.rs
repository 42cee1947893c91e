//! Utilities shared by the strategies in this crate.

use std::fmt::Display;

use itertools::Itertools;

use bullcow_rs::strategy::History;

/// A set of decimal digits stored as a bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DigitSet {
    mask: u16,
}

impl DigitSet {
    /// The empty set.
    pub const EMPTY: DigitSet = DigitSet { mask: 0 };

    /// The set of all ten digits.
    pub const ALL: DigitSet = DigitSet { mask: 0x3FF };

    /// Adds a digit to the set.
    pub fn insert(&mut self, digit: u8) {
        debug_assert!(digit < 10);
        self.mask |= 1 << digit;
    }

    /// Returns true if `digit` is in the set.
    pub fn contains(&self, digit: u8) -> bool {
        digit < 10 && self.mask & (1 << digit) != 0
    }

    /// The number of digits in the set.
    pub fn len(&self) -> u32 {
        self.mask.count_ones()
    }

    /// Returns true if the set has no digits in it.
    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Iterates over the digits in the set in increasing order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..10_u8).filter(move |d| self.mask & (1 << d) != 0)
    }

    /// The set of digits not in this set.
    pub fn complement(self) -> DigitSet {
        DigitSet {
            mask: !self.mask & 0x3FF,
        }
    }

    /// The digits in this set that are not in `other`.
    pub fn difference(self, other: DigitSet) -> DigitSet {
        DigitSet {
            mask: self.mask & !other.mask,
        }
    }
}

impl FromIterator<u8> for DigitSet {
    fn from_iter<T: IntoIterator<Item = u8>>(iter: T) -> Self {
        let mut set = DigitSet::EMPTY;
        for digit in iter {
            set.insert(digit);
        }
        set
    }
}

impl Display for DigitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.iter().join(", "))
    }
}

/// What a history of scored guesses proves about the secret.
///
/// An answer of no bulls and no cows proves all three guessed digits
/// absent from the secret. No other answer rules a digit out on its own,
/// so everything else only feeds the tried set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deductions {
    excluded: DigitSet,
    tried: DigitSet,
}

impl Deductions {
    /// Reads a game history and collects what it proves.
    pub fn from_history(history: &History) -> Self {
        let mut excluded = DigitSet::EMPTY;
        let mut tried = DigitSet::EMPTY;

        for turn in history.turns() {
            for digit in turn.guess().digits() {
                tried.insert(digit);
                if turn.feedback().is_miss() {
                    excluded.insert(digit);
                }
            }
        }

        Deductions { excluded, tried }
    }

    /// The digits proven absent from the secret.
    pub fn excluded(&self) -> DigitSet {
        self.excluded
    }

    /// The digits that could still be in the secret.
    pub fn candidates(&self) -> DigitSet {
        self.excluded.complement()
    }

    /// The candidate digits that no guess has tried yet.
    pub fn fresh(&self) -> DigitSet {
        self.candidates().difference(self.tried)
    }
}

/// Lines a strategy says when opening a game.
///
/// None of them mention digits, so nothing about the guess itself leaks
/// into the table talk.
pub static OPENERS: [&str; 5] = [
    "Hello! Let's see what you're hiding.",
    "First probe away. Purely scientific.",
    "Opening with a classic fishing expedition.",
    "Warming up my circuits. Here goes.",
    "Let the duel begin.",
];

/// Lines a strategy says once the game is underway.
pub static QUIPS: [&str; 7] = [
    "The net is tightening.",
    "Process of elimination, my dear.",
    "Your code has fewer hiding places now.",
    "Narrowing it down, one miss at a time.",
    "Statistically speaking, you should be worried.",
    "That last answer told me more than you think.",
    "Running out of places to hide it.",
];
