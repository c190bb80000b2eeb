use thiserror::Error;

use super::{
    fo::{Relation, Term},
    subst::Substitution,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnificationErr {
    #[error("Relations '{0}' and '{1}' have different predicates")]
    DifferentRels(Relation, Relation),
    #[error("Relations '{0}' and '{1}' have different numbers of arguments")]
    DifferentNum(Relation, Relation),
    #[error("Terms '{0}' and '{1}' cannot be unified")]
    CannotBeUnified(Term, Term),
}

/// Unifies the unsigned forms of two literals.
///
/// Argument pairs are matched one by one against the original arguments:
/// a binding made for one pair is not applied to the pairs after it, and a
/// later binding of the same variable replaces the earlier one. There is no
/// occurs check. `P(x, x)` and `P(A, B)` therefore unify to `[x -> B]`, which
/// is not a unifier in the usual sense. Resolution relies on exactly this
/// behaviour, so it must not be replaced by a most general unifier.
pub fn unify(r1: &Relation, r2: &Relation) -> Result<Substitution, UnificationErr> {
    if r1.spelling != r2.spelling {
        return Err(UnificationErr::DifferentRels(r1.clone(), r2.clone()));
    }
    if r1.arity() != r2.arity() {
        return Err(UnificationErr::DifferentNum(r1.clone(), r2.clone()));
    }

    let mut u = Substitution::new();

    for (t1, t2) in r1.args.iter().zip(&r2.args) {
        match (t1, t2) {
            (t1, t2) if t1 == t2 => continue,
            (Term::Var(s), t2) => u.bind(*s, *t2),
            (t1, Term::Var(s)) => u.bind(*s, *t1),
            (t1, t2) => return Err(UnificationErr::CannotBeUnified(*t1, *t2)),
        }
    }

    Ok(u)
}
