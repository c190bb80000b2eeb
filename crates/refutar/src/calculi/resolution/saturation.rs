use std::{fmt, time::Instant};

use indexmap::IndexSet;
use log::{debug, info, log_enabled, warn, Level};
use serde::{ser::SerializeStruct, Deserialize, Serialize};

use super::{rule::resolve, Budget, Err, Params, RefResult};
use crate::clause::{Clause, KnowledgeBase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Searching,
    /// The empty clause was derived.
    Refuted,
    /// A full round produced nothing new.
    Saturated,
}

impl Status {
    pub fn is_terminated(self) -> bool {
        self != Status::Searching
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Searching => write!(f, "SEARCHING"),
            Status::Refuted => write!(f, "REFUTED"),
            Status::Saturated => write!(f, "SATURATED"),
        }
    }
}

/// One derived resolvent together with its parents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolutionStep {
    pub step: usize,
    pub round: usize,
    pub left: Clause,
    pub right: Clause,
    pub resolvent: Clause,
}

impl ResolutionStep {
    pub fn is_refutation(&self) -> bool {
        self.resolvent.is_empty()
    }
}

impl fmt::Display for ResolutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Step {}: resolving {} and {} gives {}",
            self.step, self.left, self.right, self.resolvent
        )
    }
}

impl Serialize for ResolutionStep {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut step = serializer.serialize_struct("ResolutionStep", 6)?;
        step.serialize_field("step", &self.step)?;
        step.serialize_field("round", &self.round)?;
        step.serialize_field("left", &self.left)?;
        step.serialize_field("right", &self.right)?;
        step.serialize_field("resolvent", &self.resolvent)?;
        step.serialize_field("emptyClause", &self.is_refutation())?;
        step.end()
    }
}

/// Receives every resolvent of a committed round, in derivation order.
pub trait TraceSink {
    fn record(&mut self, step: ResolutionStep);

    /// Sinks that drop everything let the driver skip building steps.
    fn enabled(&self) -> bool {
        true
    }
}

impl TraceSink for Vec<ResolutionStep> {
    fn record(&mut self, step: ResolutionStep) {
        self.push(step);
    }
}

impl<T: TraceSink + ?Sized> TraceSink for &mut T {
    fn record(&mut self, step: ResolutionStep) {
        (**self).record(step)
    }

    fn enabled(&self) -> bool {
        (**self).enabled()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn record(&mut self, _step: ResolutionStep) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Level saturation of a knowledge base under binary resolution.
///
/// Each round resolves every pair of clauses present when the round starts.
/// The resolvents only join the knowledge base once the round is complete.
/// A round that fails on a budget leaves the saturation untouched.
#[derive(Debug, Clone)]
pub struct Saturation {
    kb: KnowledgeBase,
    round: usize,
    status: Status,
    steps: usize,
    watermark: usize,
}

impl Saturation {
    pub fn new(kb: KnowledgeBase) -> Self {
        let status = if kb.has_empty_clause() {
            Status::Refuted
        } else {
            Status::Searching
        };
        Saturation {
            kb,
            round: 0,
            status,
            steps: 0,
            watermark: 0,
        }
    }

    /// Restores a saturation from its stored fields.
    pub fn from_parts(
        kb: KnowledgeBase,
        round: usize,
        status: Status,
        steps: usize,
        watermark: usize,
    ) -> RefResult<Self> {
        let s = Saturation {
            kb,
            round,
            status,
            steps,
            watermark,
        };
        s.check()?;
        Ok(s)
    }

    pub fn kb(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Knowledge base size at the start of the previous round.
    pub fn watermark(&self) -> usize {
        self.watermark
    }

    pub fn is_terminated(&self) -> bool {
        self.status.is_terminated()
    }

    /// Checks that the fields describe a reachable saturation.
    pub fn check(&self) -> RefResult<()> {
        let ill = |msg: &str| Err::IllFormedState(msg.to_string());

        if self.kb.goal_index() >= self.kb.size() {
            return Err(ill("goal index outside the knowledge base"));
        }
        if self.watermark > self.kb.size() {
            return Err(ill("pair watermark beyond the knowledge base"));
        }
        if self.round == 0 && (self.watermark != 0 || self.steps != 0) {
            return Err(ill("steps recorded before the first round"));
        }
        if (self.status == Status::Refuted) != self.kb.has_empty_clause() {
            return Err(ill("refuted iff the empty clause is present"));
        }
        Ok(())
    }

    /// Runs a single round.
    pub fn step<S: TraceSink + ?Sized>(
        &mut self,
        params: &Params,
        deadline: Option<Instant>,
        sink: &mut S,
    ) -> RefResult<Status> {
        if self.is_terminated() {
            return Err(Err::Terminated(self.status));
        }
        if let Some(max) = params.max_rounds {
            if self.round >= max {
                warn!("giving up after {} rounds", self.round);
                return Err(Err::BudgetExceeded(Budget::Rounds(max)));
            }
        }

        let round = self.round + 1;
        let start = self.kb.size();
        let floor = if params.skip_resolved_pairs {
            self.watermark
        } else {
            0
        };

        let clauses: Vec<&Clause> = self.kb.clauses().collect();
        let mut derived: Vec<(usize, usize, Clause)> = Vec::new();
        let mut found: IndexSet<Clause> = IndexSet::new();

        for i in 0..start {
            for j in floor.max(i + 1)..start {
                if let (Some(d), Some(timeout)) = (deadline, params.timeout()) {
                    if Instant::now() >= d {
                        warn!("giving up in round {round} after {} ms", timeout.as_millis());
                        return Err(Err::BudgetExceeded(Budget::Time(timeout)));
                    }
                }
                for r in resolve(clauses[i], clauses[j]) {
                    found.insert(r.clone());
                    derived.push((i, j, r));
                }
            }
        }

        let refuted = found.iter().any(Clause::is_empty);
        let fresh: Vec<Clause> = found
            .into_iter()
            .filter(|c| !self.kb.contains(c))
            .collect();

        if !refuted && !fresh.is_empty() {
            if let Some(max) = params.max_clauses {
                if start + fresh.len() > max {
                    warn!(
                        "giving up in round {round}: {} new clauses on top of {start}",
                        fresh.len()
                    );
                    return Err(Err::BudgetExceeded(Budget::Clauses(max)));
                }
            }
        }

        let record = sink.enabled() || log_enabled!(Level::Debug);
        for (i, j, resolvent) in derived {
            self.steps += 1;
            if !record {
                continue;
            }
            let step = ResolutionStep {
                step: self.steps,
                round,
                left: clauses[i].clone(),
                right: clauses[j].clone(),
                resolvent,
            };
            debug!("{step}");
            sink.record(step);
        }

        self.status = if refuted {
            Status::Refuted
        } else if fresh.is_empty() {
            Status::Saturated
        } else {
            Status::Searching
        };

        let added = fresh.len();
        for c in fresh {
            self.kb.add(c);
        }
        self.round = round;
        self.watermark = start;

        info!(
            "round {round}: {added} new clauses, {} in total, {}",
            self.kb.size(),
            self.status
        );
        Ok(self.status)
    }

    /// Runs rounds until a verdict is reached or a budget runs out. The
    /// timeout covers the whole run.
    pub fn run<S: TraceSink + ?Sized>(
        &mut self,
        params: &Params,
        sink: &mut S,
    ) -> RefResult<Status> {
        if self.is_terminated() {
            return Err(Err::Terminated(self.status));
        }
        let deadline = params.deadline();
        loop {
            let status = self.step(params, deadline, sink)?;
            if status.is_terminated() {
                return Ok(status);
            }
        }
    }
}

/// Outcome of a complete refutation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    pub verdict: Status,
    pub rounds: usize,
    pub clauses: usize,
    pub steps: usize,
}

impl Proof {
    pub fn proven(&self) -> bool {
        self.verdict == Status::Refuted
    }
}

impl From<&Saturation> for Proof {
    fn from(s: &Saturation) -> Self {
        Proof {
            verdict: s.status(),
            rounds: s.round(),
            clauses: s.kb().size(),
            steps: s.steps(),
        }
    }
}

/// Tries to refute `base` together with the negated goal `goal`.
pub fn prove<S: TraceSink>(
    base: Vec<Clause>,
    goal: Clause,
    params: &Params,
    mut sink: S,
) -> RefResult<Proof> {
    if base.is_empty() {
        return Err(Err::EmptyKnowledgeBase);
    }
    let mut s = Saturation::new(KnowledgeBase::new(base, goal));
    info!("refuting {} with {} clauses", s.kb().goal(), s.kb().size());
    if !s.is_terminated() {
        s.run(params, &mut sink)?;
    }
    let proof = Proof::from(&s);
    info!("{} after {} rounds", proof.verdict, proof.rounds);
    Ok(proof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse::parse_problem, session};

    const MARCO: &str = "[
        {'Hombre(Marco)'},
        {'Pompeyano(Marco)'},
        {'~Pompeyano(x)', 'Romano(x)'},
        {'Gobernante(Cesar)'},
        {'~Romano(x)', 'Leal(x, Cesar)', 'Odia(x, Cesar)'},
        {'~Hombre(x)', '~Gobernante(y)', '~IntentaAsesinar(x, y)', '~Leal(x, y)'},
        {'IntentaAsesinar(Marco, Cesar)'},
    ";

    fn problem(text: &str) -> (Vec<Clause>, Clause) {
        let p = parse_problem(text).unwrap();
        (p.base, p.goal)
    }

    fn marco(goal: &str) -> String {
        format!("{MARCO} {{'{goal}'}}]")
    }

    fn run(text: &str, params: &Params) -> (RefResult<Proof>, Vec<ResolutionStep>) {
        let (base, goal) = problem(text);
        let mut trace = Vec::new();
        let res = prove(base, goal, params, &mut trace);
        (res, trace)
    }

    fn summary(p: &Proof) -> (Status, usize, usize, usize) {
        (p.verdict, p.rounds, p.clauses, p.steps)
    }

    fn skipping() -> Params {
        Params {
            skip_resolved_pairs: true,
            ..Params::default()
        }
    }

    #[test]
    fn socrates_is_refuted() {
        session(|| {
            let text = "[{'Hombre(Marco)'}, {'~Hombre(x)', 'Mortal(x)'}, {'~Mortal(Marco)'}]";
            let (proof, trace) = run(text, &Params::default());
            let proof = proof.unwrap();
            assert_eq!(Status::Refuted, proof.verdict);
            assert!(proof.proven());
            assert_eq!(2, proof.rounds);
            assert_eq!(6, proof.clauses);
            assert_eq!(6, proof.steps);

            assert_eq!(6, trace.len());
            assert_eq!("{Mortal(Marco)}", trace[0].resolvent.to_string());
            assert_eq!("{~Hombre(Marco)}", trace[1].resolvent.to_string());
            assert_eq!(1, trace[1].round);
            assert_eq!(2, trace[2].round);
            assert!(trace.iter().any(ResolutionStep::is_refutation));
            assert_eq!(
                (1..=6).collect::<Vec<_>>(),
                trace.iter().map(|s| s.step).collect::<Vec<_>>()
            );
        })
    }

    #[test]
    fn unrelated_goal_saturates() {
        session(|| {
            let (proof, trace) = run("[{'P(A)'}, {'Q(A)'}]", &Params::default());
            let proof = proof.unwrap();
            assert_eq!(Status::Saturated, proof.verdict);
            assert_eq!(1, proof.rounds);
            assert_eq!(2, proof.clauses);
            assert!(trace.is_empty());

            let (proof, trace) = run("[{'P(a)'}, {'Q(a)'}]", &Params::default());
            assert_eq!(Status::Saturated, proof.unwrap().verdict);
            assert!(trace.is_empty());
        })
    }

    #[test]
    fn saturates_after_new_clauses() {
        session(|| {
            let (proof, _) = run(
                "[{'P(x)', 'Q(x)'}, {'~P(A)'}, {'~Q(B)'}]",
                &Params::default(),
            );
            assert_eq!(
                Proof {
                    verdict: Status::Saturated,
                    rounds: 2,
                    clauses: 5,
                    steps: 4
                },
                proof.unwrap()
            );

            let (proof, _) = run(
                "[{'P(x)', 'Q(x)'}, {'~P(A)'}, {'~Q(A)'}]",
                &Params::default(),
            );
            assert_eq!(
                Proof {
                    verdict: Status::Refuted,
                    rounds: 2,
                    clauses: 6,
                    steps: 6
                },
                proof.unwrap()
            );

            let (proof, _) = run("[{'P(A)', 'Q(A)'}, {'~P(A)'}]", &Params::default());
            assert_eq!(
                Proof {
                    verdict: Status::Saturated,
                    rounds: 2,
                    clauses: 3,
                    steps: 2
                },
                proof.unwrap()
            );
        })
    }

    #[test]
    fn marco_hates_cesar() {
        session(|| {
            let (proof, trace) = run(&marco("~Odia(Marco, Cesar)"), &Params::default());
            let proof = proof.unwrap();
            assert_eq!(Status::Refuted, proof.verdict);
            assert_eq!(4, proof.rounds);
            assert_eq!(69, proof.clauses);
            assert_eq!(370, proof.steps);
            assert_eq!(370, trace.len());
            assert!(trace.last().is_some_and(|s| s.round == 4));
        })
    }

    #[test]
    fn marco_does_not_love_cesar() {
        session(|| {
            let (proof, _) = run(&marco("Odia(Marco, Cesar)"), &Params::default());
            let proof = proof.unwrap();
            assert_eq!(Status::Saturated, proof.verdict);
            assert_eq!(5, proof.rounds);
            assert_eq!(41, proof.clauses);
            assert_eq!(299, proof.steps);
        })
    }

    #[test]
    fn skipping_resolved_pairs_keeps_verdicts() {
        session(|| {
            let text = "[{'Hombre(Marco)'}, {'~Hombre(x)', 'Mortal(x)'}, {'~Mortal(Marco)'}]";
            let (proof, trace) = run(text, &skipping());
            let proof = proof.unwrap();
            assert_eq!((Status::Refuted, 2, 6, 4), summary(&proof));
            assert_eq!(4, trace.len());

            let (proof, _) = run(&marco("~Odia(Marco, Cesar)"), &skipping());
            let proof = proof.unwrap();
            assert_eq!((Status::Refuted, 4, 69, 205), summary(&proof));

            let (proof, _) = run(&marco("Odia(Marco, Cesar)"), &skipping());
            let proof = proof.unwrap();
            assert_eq!((Status::Saturated, 5, 41, 100), summary(&proof));
        })
    }

    #[test]
    fn round_budget() {
        session(|| {
            let params = Params {
                max_rounds: Some(3),
                ..Params::default()
            };
            let (res, trace) = run(&marco("~Odia(Marco, Cesar)"), &params);
            assert_eq!(Err(Err::BudgetExceeded(Budget::Rounds(3))), res);
            assert!(trace.iter().all(|s| s.round <= 3));

            let params = Params {
                max_rounds: Some(4),
                ..Params::default()
            };
            assert!(run(&marco("~Odia(Marco, Cesar)"), &params).0.is_ok());
        })
    }

    #[test]
    fn clause_budget() {
        session(|| {
            let params = Params {
                max_clauses: Some(10),
                ..Params::default()
            };
            let (res, _) = run(&marco("~Odia(Marco, Cesar)"), &params);
            assert_eq!(Err(Err::BudgetExceeded(Budget::Clauses(10))), res);
        })
    }

    #[test]
    fn clause_budget_does_not_block_refutation() {
        session(|| {
            let params = Params {
                max_clauses: Some(3),
                ..Params::default()
            };
            let (res, _) = run("[{'P(A)'}, {'~P(A)'}]", &params);
            assert_eq!(Status::Refuted, res.unwrap().verdict);
        })
    }

    #[test]
    fn timeout_budget() {
        session(|| {
            let params = Params {
                timeout_ms: Some(0),
                ..Params::default()
            };
            let (res, trace) = run(&marco("~Odia(Marco, Cesar)"), &params);
            assert!(matches!(res, Err(Err::BudgetExceeded(Budget::Time(_)))));
            assert!(trace.is_empty());
        })
    }

    #[test]
    fn stepwise_rounds() {
        session(|| {
            let (base, goal) =
                problem("[{'Hombre(Marco)'}, {'~Hombre(x)', 'Mortal(x)'}, {'~Mortal(Marco)'}]");
            let mut s = Saturation::new(KnowledgeBase::new(base, goal));
            let params = Params::default();

            assert_eq!(Ok(Status::Searching), s.step(&params, None, &mut NoTrace));
            assert_eq!((1, 5, 2, 3), (s.round(), s.kb().size(), s.steps(), s.watermark()));
            s.check().unwrap();

            assert_eq!(Ok(Status::Refuted), s.step(&params, None, &mut NoTrace));
            assert!(s.kb().has_empty_clause());
            assert_eq!(Some(&Clause::empty()), s.kb().get(5));
            s.check().unwrap();

            assert_eq!(
                Err(Err::Terminated(Status::Refuted)),
                s.step(&params, None, &mut NoTrace)
            );
            assert_eq!(Err(Err::Terminated(Status::Refuted)), s.run(&params, &mut NoTrace));
        })
    }

    #[test]
    fn empty_base_is_rejected() {
        session(|| {
            let goal: Clause = problem("[{'P(A)'}, {'~P(A)'}]").1;
            assert_eq!(
                Err(Err::EmptyKnowledgeBase),
                prove(vec![], goal, &Params::default(), NoTrace)
            );
        })
    }

    #[test]
    fn empty_clause_in_input() {
        session(|| {
            let (proof, trace) = run("[{'P(A)'}, set(), {'~Q(A)'}]", &Params::default());
            let proof = proof.unwrap();
            assert_eq!((Status::Refuted, 0), (proof.verdict, proof.rounds));
            assert!(trace.is_empty());
        })
    }

    #[test]
    fn inconsistent_parts_are_rejected() {
        session(|| {
            let (base, goal) = problem("[{'P(A)'}, {'~P(A)'}]");
            let kb = KnowledgeBase::new(base, goal);
            assert!(Saturation::from_parts(kb.clone(), 0, Status::Searching, 0, 0).is_ok());
            assert!(Saturation::from_parts(kb.clone(), 1, Status::Refuted, 1, 2).is_err());
            assert!(Saturation::from_parts(kb.clone(), 1, Status::Searching, 1, 3).is_err());
            assert!(Saturation::from_parts(kb, 0, Status::Searching, 4, 0).is_err());
        })
    }

    #[test]
    fn step_json() {
        session(|| {
            let text = "[{'P(A)'}, {'~P(A)'}]";
            let (_, trace) = run(text, &Params::default());
            let json = serde_json::to_value(&trace[0]).unwrap();
            assert_eq!(
                serde_json::json!({
                    "step": 1,
                    "round": 1,
                    "left": ["P(A)"],
                    "right": ["~P(A)"],
                    "resolvent": [],
                    "emptyClause": true
                }),
                json
            );
            assert_eq!(
                "Step 1: resolving {P(A)} and {~P(A)} gives □",
                trace[0].to_string()
            );
        })
    }
}
