use thiserror::Error;

pub mod clause_set;
pub mod literal;

pub use clause_set::{parse_clause_list, parse_problem, InputErr, Problem};
pub use literal::parse_literal;

pub type ParseResult<T> = Result<T, ParseErr>;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseErr {
    #[error("Expected {0} but got {1}")]
    Expected(String, String),
    #[error("Unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
    #[error("Unterminated string starting at position {0}")]
    UnterminatedString(usize),
}

/// Identifier characters shared by predicates, arguments and the `set`
/// keyword of clause lists.
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Length in bytes of the identifier at the start of `s`.
pub(crate) fn ident_len(s: &str) -> usize {
    s.char_indices()
        .find(|(_, c)| !is_ident_char(*c))
        .map_or(s.len(), |(i, _)| i)
}
