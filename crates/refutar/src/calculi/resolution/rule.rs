use indexmap::IndexSet;
use log::trace;

use crate::{
    clause::{Clause, Literal},
    logic::{subst::Substitution, unify},
};

/// All binary resolvents of `c1` and `c2`, distinct and in derivation order.
///
/// Every pair of literals of opposite sign whose unsigned forms unify yields
/// one resolvent. The variables of both clauses are shared, no renaming
/// happens before unification.
pub fn resolve(c1: &Clause, c2: &Clause) -> Vec<Clause> {
    let mut resolvents = IndexSet::new();

    for l1 in c1 {
        for l2 in c2.iter().filter(|l2| l1.complements(l2)) {
            match unify(l1.rel(), l2.rel()) {
                Ok(u) => {
                    resolvents.insert(build_clause(c1, l1, c2, l2, &u));
                }
                Err(e) => trace!("{l1} and {l2} do not resolve: {e}"),
            }
        }
    }

    resolvents.into_iter().collect()
}

/// `u(c1 - {l1}) ∪ u(c2 - {l2})`
pub fn build_clause(
    c1: &Clause,
    l1: &Literal,
    c2: &Clause,
    l2: &Literal,
    u: &Substitution,
) -> Clause {
    c1.without(l1)
        .chain(c2.without(l2))
        .map(|l| u.apply(l))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse::parse_literal, session};

    fn clause(lits: &[&str]) -> Clause {
        lits.iter().map(|l| parse_literal(l).unwrap()).collect()
    }

    fn resolve_str(c1: &[&str], c2: &[&str]) -> Vec<String> {
        resolve(&clause(c1), &clause(c2))
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn complementary_units() {
        session(|| {
            assert_eq!(vec!["□"], resolve_str(&["P(A)"], &["~P(A)"]));
            assert_eq!(vec!["□"], resolve_str(&["P(a)"], &["~P(a)"]));
            assert_eq!(vec!["□"], resolve_str(&["~P(x)"], &["P(A)"]));
        })
    }

    #[test]
    fn no_complementary_literal() {
        session(|| {
            assert!(resolve_str(&["P(A)"], &["P(A)"]).is_empty());
            assert!(resolve_str(&["P(A)"], &["~Q(A)"]).is_empty());
            assert!(resolve_str(&["P(A)"], &["~P(A, B)"]).is_empty());
            assert!(resolve_str(&["P(A)"], &["~P(B)"]).is_empty());
            assert!(resolve_str(&["P(A)"], &[]).is_empty());
        })
    }

    #[test]
    fn modus_ponens() {
        session(|| {
            assert_eq!(
                vec!["{Mortal(Marco)}"],
                resolve_str(&["Hombre(Marco)"], &["~Hombre(x)", "Mortal(x)"])
            );
            assert_eq!(
                vec!["{~Hombre(Marco)}"],
                resolve_str(&["~Hombre(x)", "Mortal(x)"], &["~Mortal(Marco)"])
            );
        })
    }

    #[test]
    fn substitution_covers_both_clauses() {
        session(|| {
            assert_eq!(
                vec!["{Leal(Marco, Cesar), Odia(Marco, Cesar)}"],
                resolve_str(
                    &["~Romano(x)", "Leal(x, Cesar)", "Odia(x, Cesar)"],
                    &["Romano(Marco)"]
                )
            );
            assert_eq!(vec!["{R(B)}"], resolve_str(&["P(x, x)", "R(x)"], &["~P(A, B)"]));
        })
    }

    #[test]
    fn shared_variables_are_not_renamed() {
        session(|| {
            // x in both clauses is the same variable.
            assert_eq!(
                vec!["{Q(A), R(A)}"],
                resolve_str(&["P(x)", "Q(x)"], &["~P(A)", "R(x)"])
            );
        })
    }

    #[test]
    fn several_resolvents() {
        session(|| {
            let rs = resolve_str(&["P(x)", "~Q(x)"], &["~P(A)", "Q(B)"]);
            assert_eq!(vec!["{~Q(A), Q(B)}", "{~P(A), P(B)}"], rs);
        })
    }

    #[test]
    fn duplicates_collapse() {
        session(|| {
            assert_eq!(vec!["{Q(A)}"], resolve_str(&["P(x)", "Q(A)"], &["~P(A)", "Q(x)"]));
        })
    }
}
