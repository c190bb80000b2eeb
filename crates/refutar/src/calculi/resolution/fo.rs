use serde::{ser::SerializeStruct, Deserialize, Serialize};

use super::{
    saturation::{ResolutionStep, Saturation, Status},
    Err, Params, RefResult,
};
use crate::{
    calculus::CloseMsg,
    clause::{Clause, KnowledgeBase},
    parse::parse_problem,
    tamper_protect::ProtectedState,
    Calculus,
};

#[derive(Debug, Clone)]
pub struct State {
    pub saturation: Saturation,
    pub params: Params,
    /// Steps derived by the most recent move.
    pub trace: Vec<ResolutionStep>,
}

impl State {
    pub fn new(saturation: Saturation, params: Params) -> Self {
        Self {
            saturation,
            params,
            trace: Vec::new(),
        }
    }
}

impl ProtectedState for State {
    fn compute_seal_info(&self) -> String {
        let s = &self.saturation;
        format!(
            "refutationstate|{}|{}|{}|{}|{}|{}|{}",
            s.kb(),
            s.kb().goal_index(),
            s.round(),
            s.steps(),
            s.watermark(),
            s.status(),
            self.params
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Move {
    /// Resolve every pair of clauses once.
    #[serde(rename = "ref-round")]
    Round,
    /// Run rounds until refuted, saturated or out of budget.
    #[serde(rename = "ref-saturate")]
    Saturate,
}

pub struct FORefutation;

impl<'f> Calculus<'f> for FORefutation {
    type Params = Params;
    type State = State;
    type Move = Move;
    type Error = Err;

    fn parse_formula(
        formula: &'f str,
        params: Option<Self::Params>,
    ) -> Result<Self::State, Self::Error> {
        let kb = parse_problem(formula)?.into_knowledge_base();
        Ok(State::new(Saturation::new(kb), params.unwrap_or_default()))
    }

    fn validate(state: &Self::State) -> bool {
        state.saturation.check().is_ok()
    }

    fn apply_move(mut state: Self::State, k_move: Self::Move) -> Result<Self::State, Self::Error> {
        state.trace.clear();
        match k_move {
            Move::Round => apply_round(&mut state)?,
            Move::Saturate => apply_saturate(&mut state)?,
        };
        Ok(state)
    }

    fn check_close(state: &Self::State) -> CloseMsg {
        let s = &state.saturation;
        match s.status() {
            Status::Refuted => CloseMsg::new(
                true,
                format!(
                    "The proof is closed: the empty clause was derived in round {}",
                    s.round()
                ),
            ),
            Status::Saturated => CloseMsg::new(
                false,
                format!(
                    "The proof is not closed: the knowledge base is saturated after {} rounds",
                    s.round()
                ),
            ),
            Status::Searching => CloseMsg::new(false, "The proof is not closed"),
        }
    }
}

fn apply_round(state: &mut State) -> RefResult<Status> {
    let deadline = state.params.deadline();
    state
        .saturation
        .step(&state.params, deadline, &mut state.trace)
}

fn apply_saturate(state: &mut State) -> RefResult<Status> {
    state.saturation.run(&state.params, &mut state.trace)
}

impl Serialize for State {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let s = &self.saturation;
        let mut state = serializer.serialize_struct("RefutationState", 9)?;
        state.serialize_field("clauses", s.kb())?;
        state.serialize_field("goal", &s.kb().goal_index())?;
        state.serialize_field("round", &s.round())?;
        state.serialize_field("status", &s.status())?;
        state.serialize_field("steps", &s.steps())?;
        state.serialize_field("watermark", &s.watermark())?;
        state.serialize_field("params", &self.params)?;
        state.serialize_field("trace", &self.trace)?;
        state.serialize_field("seal", &self.seal())?;
        state.end()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawState {
    clauses: Vec<Clause>,
    goal: usize,
    round: usize,
    status: Status,
    steps: usize,
    watermark: usize,
    params: Params,
    #[serde(default)]
    trace: Vec<ResolutionStep>,
    seal: String,
}

impl TryFrom<RawState> for State {
    type Error = String;

    fn try_from(raw: RawState) -> Result<Self, Self::Error> {
        let kb = KnowledgeBase::from_parts(raw.clauses, raw.goal)
            .ok_or("Stored clauses are duplicated or the goal index is out of range")?;
        let saturation =
            Saturation::from_parts(kb, raw.round, raw.status, raw.steps, raw.watermark)
                .map_err(|e| e.to_string())?;
        let state = State {
            saturation,
            params: raw.params,
            trace: raw.trace,
        };
        if !state.verify_seal(&raw.seal) {
            return Err("Invalid tamper protection seal".to_string());
        }
        Ok(state)
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawState::deserialize(deserializer)?;
        State::try_from(raw).map_err(serde::de::Error::custom)
    }
}
