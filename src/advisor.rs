//! Outside help for strategies, and the safety net around it.
//!
//! An [`Advisor`] is anything that can look at a game in progress and
//! suggest the next [`Move`]: a remote model, a database of openings, a
//! friend over a socket. Advisors are fallible and untrusted, so they are
//! never handed to the game loop directly. Instead, [`Assisted`] pairs an
//! advisor with an ordinary [`Strategy`] and only forwards advice that
//! arrives intact; anything else is silently replaced by the fallback
//! strategy's own move.

use std::fmt::{Debug, Display};

use rand::{seq::SliceRandom, RngCore};

use crate::{
    strategy::{History, Move, Strategy},
    AdvisorError,
};

static GLITCHES: &[&str] = &[
    "My uplink is glitching. Falling back to instinct.",
    "Connection to the mainframe lost. Improvising.",
    "Static on the line. Trusting my own deductions.",
];

/// A source of move suggestions that is allowed to fail.
///
/// Implementations must be pure with respect to the game: the only input
/// is the [`History`] of scored guesses. An advisor that cannot answer
/// returns an [`AdvisorError`] describing why; it must not panic or block
/// forever, so implementations talking to a network enforce their own
/// timeouts.
pub trait Advisor: Debug + Sync {
    /// Suggests the next move for the given history.
    fn advise(&self, history: &History) -> Result<Move, AdvisorError>;
}

impl Advisor for fn(&History) -> Result<Move, AdvisorError> {
    fn advise(&self, history: &History) -> Result<Move, AdvisorError> {
        (self)(history)
    }
}

/// A strategy that asks an [`Advisor`] first and falls back on refusal.
///
/// The wrapped advisor is consulted every turn. If it produces a usable
/// [`Move`], that move is played as-is. If it fails in any way, the inner
/// strategy takes the turn instead and the banter is swapped for a canned
/// line about the glitch, so the game never stalls and never errors.
///
/// Advice arrives pre-validated by construction: an advisor can only hand
/// back a [`Move`], and building the [`Code`](crate::strategy::Code)
/// inside one already enforces the three-distinct-digits rule.
///
/// # Examples
///
/// ```rust
/// use rand::{rngs::StdRng, SeedableRng};
/// use bullcow_rs::{
///     strategy::{History, Move, Random},
///     AdvisorError, Assisted, Strategy,
/// };
///
/// fn oracle(_history: &History) -> Result<Move, AdvisorError> {
///     Err(AdvisorError::Unavailable("offline".to_string()))
/// }
///
/// let assisted = Assisted::new(
///     oracle as fn(&History) -> Result<Move, AdvisorError>,
///     Random,
/// );
///
/// let mut rng = StdRng::seed_from_u64(9);
/// let mv = assisted.guess(&History::new(), &mut rng);
/// // The oracle refused, so the move came from `Random`.
/// ```
#[derive(Debug)]
pub struct Assisted<A, S> {
    advisor: A,
    fallback: S,
}

impl<A: Advisor, S: Strategy> Assisted<A, S> {
    /// Pairs an advisor with the strategy that covers for it.
    pub fn new(advisor: A, fallback: S) -> Self {
        Assisted { advisor, fallback }
    }
}

impl<A: Advisor, S: Strategy> Strategy for Assisted<A, S> {
    fn guess(&self, history: &History, rng: &mut dyn RngCore) -> Move {
        match self.advisor.advise(history) {
            Ok(mv) => mv,
            Err(_) => {
                let mut mv = self.fallback.guess(history, rng);
                mv.banter = (*GLITCHES
                    .choose(rng)
                    .expect("the glitch list is not empty"))
                .to_string();
                mv
            }
        }
    }

    /// Reports the fallback's version, since the advisor has none.
    fn version(&self) -> &'static str {
        self.fallback.version()
    }
}

impl<A: Advisor, S: Strategy> Display for Assisted<A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (assisted)", self.fallback)
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        mock::Scripted,
        strategy::{Code, Random},
        Result,
    };

    #[test]
    fn forwards_advice_that_arrives_intact() -> Result<()> {
        let assisted = Assisted::new(Scripted::Advice("315"), Random);
        let mut rng = StdRng::seed_from_u64(1);

        let mv = assisted.guess(&History::new(), &mut rng);

        assert_eq!(mv.code, Code::from_str("315")?);
        assert_eq!(mv.banter, "On good authority.");

        Ok(())
    }

    #[test]
    fn covers_for_an_unreachable_advisor() {
        let assisted = Assisted::new(Scripted::Broken, Random);
        let mut rng = StdRng::seed_from_u64(2);

        let mv = assisted.guess(&History::new(), &mut rng);

        assert!(Code::is_valid(&mv.code.to_string()));
        assert!(GLITCHES.contains(&mv.banter.as_str()));
    }

    #[test]
    fn covers_for_illegal_advice() {
        for bad in ["335", "31", "3158", "pet"] {
            let assisted = Assisted::new(Scripted::Advice(bad), Random);
            let mut rng = StdRng::seed_from_u64(3);

            let mv = assisted.guess(&History::new(), &mut rng);

            assert!(Code::is_valid(&mv.code.to_string()));
            assert!(GLITCHES.contains(&mv.banter.as_str()));
        }
    }

    #[test]
    fn a_plain_function_can_advise() {
        fn oracle(_history: &History) -> Result<Move, AdvisorError> {
            Ok(Move::new(Code::from_str("206").unwrap(), "Trust me."))
        }

        let assisted = Assisted::new(
            oracle as fn(&History) -> Result<Move, AdvisorError>,
            Random,
        );
        let mut rng = StdRng::seed_from_u64(4);

        let mv = assisted.guess(&History::new(), &mut rng);
        assert_eq!(mv.banter, "Trust me.");
    }
}
