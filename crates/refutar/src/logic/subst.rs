use std::{collections::HashMap, fmt};

use crate::{
    clause::{Clause, Literal},
    symbol::Symbol,
};

use super::fo::{Relation, Term};

/// A variable assignment produced by a single unification attempt.
///
/// Lookups are one level deep: with `x -> y` and `y -> z`, applying the
/// substitution to `x` gives `y`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution(HashMap<Symbol, Term>);

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(s: Symbol, t: Term) -> Self {
        let mut u = Self::new();
        u.bind(s, t);
        u
    }

    /// Binds `s` to `t`, replacing any earlier binding of `s`.
    pub fn bind(&mut self, s: Symbol, t: Term) {
        self.0.insert(s, t);
    }

    pub fn get(&self, s: Symbol) -> Option<&Term> {
        self.0.get(&s)
    }

    pub fn contains(&self, s: Symbol) -> bool {
        self.0.contains_key(&s)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn apply_term(&self, t: &Term) -> Term {
        self.0.get(&t.symbol()).copied().unwrap_or(*t)
    }

    pub fn apply_rel(&self, r: &Relation) -> Relation {
        Relation::new(r.spelling, r.args.iter().map(|t| self.apply_term(t)).collect())
    }

    /// Replaces every bound argument of `l`. Predicate and sign are kept.
    pub fn apply(&self, l: &Literal) -> Literal {
        Literal::new(self.apply_rel(l.rel()), l.negated())
    }

    /// Literals that become equal under the substitution collapse into one.
    pub fn apply_clause(&self, c: &Clause) -> Clause {
        c.iter().map(|l| self.apply(l)).collect()
    }

    /// Bindings as `(variable, term)` pairs sorted by variable spelling.
    pub fn bindings(&self) -> Vec<(Symbol, Term)> {
        let mut v: Vec<(Symbol, Term)> = self.0.iter().map(|(s, t)| (*s, *t)).collect();
        v.sort();
        v
    }
}

impl FromIterator<(Symbol, Term)> for Substitution {
    fn from_iter<T: IntoIterator<Item = (Symbol, Term)>>(iter: T) -> Self {
        let mut u = Substitution::new();
        for (s, t) in iter {
            u.bind(s, t);
        }
        u
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (s, t)) in self.bindings().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{s} -> {t}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse::literal::parse_literal, session};

    fn subst(pairs: &[(&str, &str)]) -> Substitution {
        pairs
            .iter()
            .map(|(s, t)| (Symbol::intern(s), Term::from(*t)))
            .collect()
    }

    #[test]
    fn apply_replaces_bound_arguments() {
        session(|| {
            let u = subst(&[("x", "Marco"), ("y", "Cesar")]);
            let l = parse_literal("~Leal(x, y)").unwrap();
            assert_eq!("~Leal(Marco, Cesar)", u.apply(&l).to_string());
            let l = parse_literal("Odia(z, x)").unwrap();
            assert_eq!("Odia(z, Marco)", u.apply(&l).to_string());
        })
    }

    #[test]
    fn apply_is_single_level() {
        session(|| {
            let u = subst(&[("x", "y"), ("y", "z")]);
            let l = parse_literal("P(x)").unwrap();
            assert_eq!("P(y)", u.apply(&l).to_string());
            assert_eq!("P(z)", u.apply(&u.apply(&l)).to_string());
        })
    }

    #[test]
    fn apply_twice_without_chains() {
        session(|| {
            let u = subst(&[("x", "A"), ("y", "z")]);
            let l = parse_literal("P(x, y, w, B)").unwrap();
            let once = u.apply(&l);
            assert_eq!(once, u.apply(&once));
            assert_eq!("P(A, z, w, B)", once.to_string());
        })
    }

    #[test]
    fn apply_to_clause() {
        session(|| {
            let u = subst(&[("x", "Marco")]);
            let c: Clause = ["P(x)", "P(Marco)", "~Q(x, y)"]
                .iter()
                .map(|l| parse_literal(l).unwrap())
                .collect();
            assert_eq!("{P(Marco), ~Q(Marco, y)}", u.apply_clause(&c).to_string());
        })
    }

    #[test]
    fn later_binding_wins() {
        session(|| {
            let mut u = Substitution::from_value(Symbol::intern("x"), Term::from("A"));
            u.bind(Symbol::intern("x"), Term::from("B"));
            assert_eq!(1, u.len());
            assert_eq!("[x -> B]", u.to_string());
        })
    }

    #[test]
    fn empty_substitution_is_identity() {
        session(|| {
            let l = parse_literal("~Hombre(x)").unwrap();
            assert_eq!(l, Substitution::new().apply(&l));
        })
    }
}
