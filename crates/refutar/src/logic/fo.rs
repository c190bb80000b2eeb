use std::fmt;

use crate::symbol::Symbol;

/// An argument of a relation. Arguments are flat symbols; there are no
/// function terms.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Term {
    Var(Symbol),
    Const(Symbol),
}

impl Term {
    /// Lowercase-initial symbols are variables, everything else is a constant
    /// or skolem symbol.
    pub fn classify(s: Symbol) -> Self {
        if s.starts_lowercase() {
            Term::Var(s)
        } else {
            Term::Const(s)
        }
    }

    pub fn symbol(&self) -> Symbol {
        match self {
            Term::Var(s) | Term::Const(s) => *s,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::classify(Symbol::intern(s))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.symbol(), f)
    }
}

/// The unsigned part of a literal: a predicate applied to its arguments.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Relation {
    pub spelling: Symbol,
    pub args: Vec<Term>,
}

impl Relation {
    pub fn new(spelling: Symbol, args: Vec<Term>) -> Self {
        Self { spelling, args }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.spelling)?;
        for (i, a) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", a)?;
        }
        f.write_str(")")
    }
}
