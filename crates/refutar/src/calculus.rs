use serde::{Deserialize, Serialize};

/// Answer to a close request: whether the proof is finished and a message
/// for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseMsg {
    pub closed: bool,
    pub msg: String,
}

impl CloseMsg {
    pub fn new(closed: bool, msg: impl Into<String>) -> Self {
        CloseMsg {
            closed,
            msg: msg.into(),
        }
    }
}

/// A proof procedure driven step by step through opaque, sealed states.
pub trait Calculus<'f> {
    type Params;
    type State;
    type Move;
    type Error;

    fn parse_formula(
        formula: &'f str,
        params: Option<Self::Params>,
    ) -> Result<Self::State, Self::Error>;

    fn validate(_state: &Self::State) -> bool {
        true
    }

    fn apply_move(state: Self::State, k_move: Self::Move) -> Result<Self::State, Self::Error>;

    fn check_close(state: &Self::State) -> CloseMsg;
}
