use std::{collections::BTreeSet, fmt};

use indexmap::IndexSet;
use serde::{de, Deserialize, Serialize};

use crate::{
    logic::{fo::Relation, subst::Substitution},
    parse::literal::parse_literal,
};

/// A possibly negated relation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    rel: Relation,
    negated: bool,
}

impl Literal {
    pub fn new(rel: Relation, negated: bool) -> Self {
        Literal { rel, negated }
    }

    pub fn rel(&self) -> &Relation {
        &self.rel
    }

    pub fn take_rel(self) -> Relation {
        self.rel
    }

    pub fn negated(&self) -> bool {
        self.negated
    }

    pub fn not(&self) -> Literal {
        Literal {
            rel: self.rel.clone(),
            negated: !self.negated,
        }
    }

    /// Exactly one of the two literals is negated.
    pub fn complements(&self, other: &Literal) -> bool {
        self.negated != other.negated
    }

    pub fn instantiate(&self, u: &Substitution) -> Self {
        u.apply(self)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.negated { "~" } else { "" }, self.rel)
    }
}

impl Serialize for Literal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Literal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse_literal(&text).map_err(|e| de::Error::custom(format!("'{text}': {e}")))
    }
}

/// A disjunction of literals. Literals are kept sorted and free of
/// duplicates, so equal literal sets give equal clauses.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Clause {
    literals: BTreeSet<Literal>,
}

impl Clause {
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        Clause {
            literals: literals.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn size(&self) -> usize {
        self.literals.len()
    }

    pub fn contains(&self, l: &Literal) -> bool {
        self.literals.contains(l)
    }

    pub fn iter(&self) -> std::collections::btree_set::Iter<'_, Literal> {
        self.literals.iter()
    }

    /// All literals except `l`.
    pub fn without<'a>(&'a self, l: &'a Literal) -> impl Iterator<Item = &'a Literal> + 'a {
        self.literals.iter().filter(move |o| *o != l)
    }

    pub fn instantiate(&self, u: &Substitution) -> Self {
        self.literals.iter().map(|l| u.apply(l)).collect()
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Clause::new(iter)
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a Literal;

    type IntoIter = std::collections::btree_set::Iter<'a, Literal>;

    fn into_iter(self) -> Self::IntoIter {
        self.literals.iter()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("□");
        }
        f.write_str("{")?;
        for (i, l) in self.literals.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", l)?;
        }
        f.write_str("}")
    }
}

impl Serialize for Clause {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(&self.literals)
    }
}

impl<'de> Deserialize<'de> for Clause {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Vec::<Literal>::deserialize(deserializer)?.into_iter().collect())
    }
}

/// The growing clause store of a refutation: an insertion-ordered set that
/// starts with the base clauses followed by the negated goal and is only ever
/// appended to.
#[derive(Clone, Debug, Default)]
pub struct KnowledgeBase {
    clauses: IndexSet<Clause>,
    goal: usize,
}

impl KnowledgeBase {
    pub fn new(base: impl IntoIterator<Item = Clause>, goal: Clause) -> Self {
        let mut clauses: IndexSet<Clause> = base.into_iter().collect();
        let (goal, _) = clauses.insert_full(goal);
        KnowledgeBase { clauses, goal }
    }

    /// Rebuilds a knowledge base from a stored clause list. Fails if the list
    /// contains duplicates or the goal index is out of range.
    pub fn from_parts(clauses: Vec<Clause>, goal: usize) -> Option<Self> {
        let len = clauses.len();
        let clauses: IndexSet<Clause> = clauses.into_iter().collect();
        if clauses.len() != len || goal >= len {
            return None;
        }
        Some(KnowledgeBase { clauses, goal })
    }

    /// Appends `c` unless it is already present. Returns whether it was new.
    pub fn add(&mut self, c: Clause) -> bool {
        self.clauses.insert(c)
    }

    pub fn contains(&self, c: &Clause) -> bool {
        self.clauses.contains(c)
    }

    pub fn get(&self, idx: usize) -> Option<&Clause> {
        self.clauses.get_index(idx)
    }

    pub fn size(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> indexmap::set::Iter<'_, Clause> {
        self.clauses.iter()
    }

    pub fn goal(&self) -> &Clause {
        &self.clauses[self.goal]
    }

    pub fn goal_index(&self) -> usize {
        self.goal
    }

    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(Clause::is_empty)
    }
}

impl fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl Serialize for KnowledgeBase {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(&self.clauses)
    }
}
