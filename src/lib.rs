#![doc = include_str!("../README.md")]

// Required to rename serde
#[cfg(feature = "serde")]
extern crate serde_crate as serde;

use thiserror::Error;

pub mod strategy;
pub use strategy::Strategy;

pub mod advisor;
pub use advisor::{Advisor, Assisted};

pub mod harness;
pub use harness::Harness;

pub mod perf;
pub use perf::{Perf, Summary};

#[cfg(feature = "stats")]
mod stats;

#[cfg(test)]
pub(crate) mod mock;

/// A convenient alias for results produced by this crate.
pub type Result<T, E = BullcowError> = std::result::Result<T, E>;

/// The errors that `bullcow_rs` can produce.
#[derive(Debug, Error)]
pub enum BullcowError {
    #[error("code encountered error")]
    Code {
        #[from]
        kind: CodeError,
    },

    #[error("general IO error")]
    Printing(#[from] std::io::Error),

    #[error("cannot compare a strategy with itself")]
    SelfComparison,

    #[error("the test harness encountered an error")]
    Harness {
        #[from]
        kind: HarnessError,
    },

    #[cfg(feature = "stats")]
    #[error("a statistical test could not be run on these samples")]
    Stats,
}

#[derive(Debug, Error)]
pub enum CodeError {
    /// The string provided when constructing a code is not exactly three
    /// characters long.
    #[error("a code is exactly three digits, but this has {0} characters")]
    Length(usize),

    /// A character provided when constructing a code is not a decimal digit.
    #[error("the character '{0}' is not a decimal digit")]
    NotADigit(char),

    /// A digit provided when constructing a code is larger than nine.
    #[error("the value {0} is outside the digit range 0-9")]
    DigitRange(u8),

    /// The same digit appears more than once in the code.
    #[error("the digit {0} appears more than once")]
    RepeatedDigit(u8),

    /// The index provided when constructing a code does not correspond to
    /// a code.
    #[error("the index {0} does not correspond to a possible code")]
    InvalidIndex(usize),
}

/// The ways an [`Advisor`](advisor::Advisor) can fail to produce advice.
///
/// None of these are fatal to a game: [`Assisted`](advisor::Assisted)
/// swallows them and plays its fallback strategy's move instead.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// The advisor is missing configuration, such as a credential.
    #[error("the advisor is not configured: {0}")]
    Unavailable(String),

    /// The advisor could not be reached or did not answer in time.
    #[error("could not reach the advisor: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The advisor answered with something that does not contain advice.
    #[error("the advisor replied with something unusable: {0}")]
    Malformed(String),

    /// The advisor suggested a code that breaks the three-distinct-digits
    /// rule.
    #[error("the advisor suggested an illegal code")]
    IllegalCode(#[from] CodeError),
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("test harness already has a baseline")]
    BaselineAlreadySet,

    #[error("cannot save baseline unless one is set to run")]
    BaselineNotRun,

    #[error("could not read or write baseline file")]
    BaselineIo(#[from] std::io::Error),

    #[error("a baseline file of that name does not exist")]
    BaselineDoesntExist,

    #[cfg(feature = "serde")]
    #[error("trouble serializing or deserializing baseline")]
    Serde(#[from] serde_json::Error),

    #[error("no strategies have been added to the harness")]
    NoStrategiesAdded,
}
