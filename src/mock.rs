use std::io;

use crate::{
    advisor::Advisor,
    strategy::{Code, History, Move},
    AdvisorError, BullcowError,
};

/// A canned advisor for exercising [`Assisted`](crate::Assisted).
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    /// Suggests the same string every turn, legal or not.
    Advice(&'static str),

    /// Fails with a transport error every turn.
    Broken,
}

impl Advisor for Scripted {
    fn advise(&self, _history: &History) -> Result<Move, AdvisorError> {
        match self {
            Scripted::Advice(s) => match Code::from_str(s) {
                Ok(code) => Ok(Move::new(code, "On good authority.")),
                Err(BullcowError::Code { kind }) => Err(AdvisorError::IllegalCode(kind)),
                Err(e) => Err(AdvisorError::Malformed(e.to_string())),
            },
            Scripted::Broken => Err(AdvisorError::Transport(Box::new(io::Error::new(
                io::ErrorKind::TimedOut,
                "scripted outage",
            )))),
        }
    }
}
