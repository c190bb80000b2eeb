use std::{
    fmt,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parse::{InputErr, ParseErr};

pub mod fo;
pub mod rule;
pub mod saturation;


pub use fo::{FORefutation, Move, State};
pub use rule::resolve;
pub use saturation::{prove, NoTrace, Proof, ResolutionStep, Saturation, Status, TraceSink};

/// Limits for a saturation run. Every limit is off by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct Params {
    pub max_rounds: Option<usize>,
    pub max_clauses: Option<usize>,
    pub timeout_ms: Option<u64>,
    /// Skip clause pairs already resolved in an earlier round.
    pub skip_resolved_pairs: bool,
}

impl Params {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// The instant at which a run started now has to give up.
    pub fn deadline(&self) -> Option<Instant> {
        self.timeout().and_then(|t| Instant::now().checked_add(t))
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}|{:?}|{:?}|{}",
            self.max_rounds, self.max_clauses, self.timeout_ms, self.skip_resolved_pairs
        )
    }
}

/// The limit that stopped a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Rounds(usize),
    Clauses(usize),
    Time(Duration),
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Budget::Rounds(n) => write!(f, "no verdict within {n} rounds"),
            Budget::Clauses(n) => write!(f, "the knowledge base would grow beyond {n} clauses"),
            Budget::Time(d) => write!(f, "no verdict within {} ms", d.as_millis()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Err {
    #[error("Invalid literal '{literal}': {source}")]
    Parse {
        literal: String,
        #[source]
        source: ParseErr,
    },
    #[error("Input is not a sequence of clause sets: {0}")]
    InputFormat(ParseErr),
    #[error("The knowledge base is empty")]
    EmptyKnowledgeBase,
    #[error("Budget exceeded: {0}")]
    BudgetExceeded(Budget),
    #[error("The refutation has already terminated with status {0}")]
    Terminated(Status),
    #[error("Ill-formed state: {0}")]
    IllFormedState(String),
}

impl From<InputErr> for Err {
    fn from(e: InputErr) -> Self {
        match e {
            InputErr::Format(e) => Self::InputFormat(e),
            InputErr::Literal { literal, source } => Self::Parse { literal, source },
            InputErr::EmptyKnowledgeBase => Self::EmptyKnowledgeBase,
        }
    }
}

pub type RefResult<T> = Result<T, Err>;
