pub mod fo;
pub mod subst;
pub mod unify;

pub use fo::{Relation, Term};
pub use subst::Substitution;
pub use unify::{unify, UnificationErr};
