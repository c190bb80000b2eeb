use std::{fmt, iter::Peekable};

use thiserror::Error;

use super::{ident_len, is_ident_char, literal::parse_literal, ParseErr, ParseResult};
use crate::clause::{Clause, KnowledgeBase};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputErr {
    #[error("Input is not a sequence of clause sets: {0}")]
    Format(#[from] ParseErr),
    #[error("Invalid literal '{literal}': {source}")]
    Literal {
        literal: String,
        #[source]
        source: ParseErr,
    },
    #[error("The knowledge base is empty")]
    EmptyKnowledgeBase,
}

/// A refutation problem: the base clauses and the negated goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub base: Vec<Clause>,
    pub goal: Clause,
}

impl Problem {
    pub fn into_knowledge_base(self) -> KnowledgeBase {
        KnowledgeBase::new(self.base, self.goal)
    }
}

/// Parses a sequence of clause sets written as a Python literal, e.g.
/// `[{'Hombre(Marco)'}, {'~Hombre(x)', 'Mortal(x)'}]`.
pub fn parse_clause_list(text: &str) -> Result<Vec<Clause>, InputErr> {
    ClauseListParser::parse(text)
}

/// Parses a clause list and splits off its last element as the negated goal.
pub fn parse_problem(text: &str) -> Result<Problem, InputErr> {
    let mut clauses = parse_clause_list(text)?;
    if clauses.len() < 2 {
        return Err(InputErr::EmptyKnowledgeBase);
    }
    let goal = clauses.pop().ok_or(InputErr::EmptyKnowledgeBase)?;
    Ok(Problem {
        base: clauses,
        goal,
    })
}

#[derive(Debug, PartialEq, Eq)]
struct Token<'t> {
    kind: TokenKind,
    spelling: &'t str,
    src_pos: usize,
}

impl<'t> fmt::Display for Token<'t> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.spelling, self.src_pos)
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum TokenKind {
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Str,
    Ident,
}

impl TokenKind {
    fn closing(self) -> Option<TokenKind> {
        match self {
            TokenKind::LBracket => Some(TokenKind::RBracket),
            TokenKind::LBrace => Some(TokenKind::RBrace),
            TokenKind::LParen => Some(TokenKind::RParen),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Str => write!(f, "string"),
            TokenKind::Ident => write!(f, "identifier"),
        }
    }
}

struct ListTokenizer<'f> {
    input: &'f str,
    pos: usize,
}

impl<'f> ListTokenizer<'f> {
    fn new(input: &'f str) -> Self {
        Self { input, pos: 0 }
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
        self.input = &self.input[n..];
    }

    /// Skips whitespace and `#` comments.
    fn skip_trivia(&mut self) {
        loop {
            let trimmed = self.input.trim_start();
            self.advance(self.input.len() - trimmed.len());
            if !self.input.starts_with('#') {
                return;
            }
            let line = self.input.find('\n').unwrap_or(self.input.len());
            self.advance(line);
        }
    }

    /// Byte length of the quoted string at the start of the input, quotes
    /// included.
    fn string_len(&self, quote: char) -> ParseResult<usize> {
        let mut chars = self.input.char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '\n' => break,
                c if c == quote => return Ok(i + c.len_utf8()),
                _ => {}
            }
        }
        Err(ParseErr::UnterminatedString(self.pos))
    }

    fn next_token(&mut self) -> Option<ParseResult<Token<'f>>> {
        self.skip_trivia();

        let c = self.input.chars().next()?;
        let res = match c {
            '[' => Ok((TokenKind::LBracket, 1)),
            ']' => Ok((TokenKind::RBracket, 1)),
            '{' => Ok((TokenKind::LBrace, 1)),
            '}' => Ok((TokenKind::RBrace, 1)),
            '(' => Ok((TokenKind::LParen, 1)),
            ')' => Ok((TokenKind::RParen, 1)),
            ',' => Ok((TokenKind::Comma, 1)),
            '\'' | '"' => self.string_len(c).map(|size| (TokenKind::Str, size)),
            c if is_ident_char(c) => Ok((TokenKind::Ident, ident_len(self.input))),
            c => Err(ParseErr::UnexpectedChar(c, self.pos)),
        };

        let (kind, size) = match res {
            Ok(r) => r,
            Err(e) => {
                self.input = "";
                return Some(Err(e));
            }
        };

        let t = Token {
            kind,
            spelling: &self.input[..size],
            src_pos: self.pos,
        };
        self.advance(size);
        Some(Ok(t))
    }
}

impl<'f> Iterator for ListTokenizer<'f> {
    type Item = ParseResult<Token<'f>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Decodes the body of a quoted string token. Unknown escapes are kept
/// verbatim.
fn unquote(spelling: &str) -> String {
    let body = &spelling[1..spelling.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(o) => {
                out.push('\\');
                out.push(o);
            }
            None => out.push('\\'),
        }
    }
    out
}

struct ClauseListParser<'f> {
    tokens: Peekable<ListTokenizer<'f>>,
}

impl<'f> ClauseListParser<'f> {
    fn parse(text: &'f str) -> Result<Vec<Clause>, InputErr> {
        let mut parser = ClauseListParser {
            tokens: ListTokenizer::new(text).peekable(),
        };
        let clauses = parser.parse_outer()?;

        match parser.tokens.next() {
            None => Ok(clauses),
            Some(Err(e)) => Err(e.into()),
            Some(Ok(t)) => Err(ParseErr::Expected("end of input".to_string(), t.to_string()).into()),
        }
    }

    fn parse_outer(&mut self) -> Result<Vec<Clause>, InputErr> {
        let open = self.open(&[TokenKind::LBracket, TokenKind::LParen])?;
        let close = open.closing().ok_or_else(|| self.unexpected("sequence"))?;

        let mut clauses = Vec::new();
        while !self.eat_if_kind(close) {
            clauses.push(self.parse_clause()?);
            if !self.eat_if_kind(TokenKind::Comma) {
                self.eat(close)?;
                break;
            }
        }
        Ok(clauses)
    }

    fn parse_clause(&mut self) -> Result<Clause, InputErr> {
        if self.next_is(TokenKind::Ident) {
            return self.parse_empty_set();
        }
        let open = self.open(&[TokenKind::LBrace, TokenKind::LBracket, TokenKind::LParen])?;
        let close = open.closing().ok_or_else(|| self.unexpected("clause set"))?;

        let mut literals = Vec::new();
        while !self.eat_if_kind(close) {
            let raw = self.string()?;
            let literal = parse_literal(&raw).map_err(|source| InputErr::Literal {
                literal: raw.clone(),
                source,
            })?;
            literals.push(literal);
            if !self.eat_if_kind(TokenKind::Comma) {
                self.eat(close)?;
                break;
            }
        }
        Ok(Clause::new(literals))
    }

    /// `set()`, the only way to write an empty set in Python besides `{}`.
    fn parse_empty_set(&mut self) -> Result<Clause, InputErr> {
        match self.tokens.next() {
            Some(Ok(t)) if t.spelling == "set" => {}
            Some(Ok(t)) => {
                return Err(ParseErr::Expected("clause set".to_string(), t.to_string()).into())
            }
            Some(Err(e)) => return Err(e.into()),
            None => return Err(self.unexpected("clause set")),
        }
        self.eat(TokenKind::LParen)?;
        self.eat(TokenKind::RParen)?;
        Ok(Clause::empty())
    }

    fn open(&mut self, accepted: &[TokenKind]) -> Result<TokenKind, InputErr> {
        match self.tokens.peek() {
            Some(Ok(t)) if accepted.contains(&t.kind) => {
                let kind = t.kind;
                self.tokens.next();
                Ok(kind)
            }
            _ => {
                let expected = accepted
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" or ");
                Err(ParseErr::Expected(expected, self.got_msg()?).into())
            }
        }
    }

    fn string(&mut self) -> ParseResult<String> {
        match self.tokens.next() {
            Some(Ok(Token {
                kind: TokenKind::Str,
                spelling,
                ..
            })) => Ok(unquote(spelling)),
            Some(Ok(t)) => Err(ParseErr::Expected("literal string".to_string(), t.to_string())),
            Some(Err(e)) => Err(e),
            None => Err(ParseErr::Expected(
                "literal string".to_string(),
                "end of input".to_string(),
            )),
        }
    }

    fn next_is(&mut self, expected: TokenKind) -> bool {
        matches!(self.tokens.peek(), Some(Ok(Token { kind, .. })) if *kind == expected)
    }

    fn eat_if_kind(&mut self, expected: TokenKind) -> bool {
        if self.next_is(expected) {
            self.tokens.next();
            true
        } else {
            false
        }
    }

    fn eat(&mut self, expected: TokenKind) -> ParseResult<()> {
        if self.eat_if_kind(expected) {
            Ok(())
        } else {
            Err(ParseErr::Expected(expected.to_string(), self.got_msg()?))
        }
    }

    fn unexpected(&mut self, what: &str) -> InputErr {
        match self.got_msg() {
            Ok(got) => ParseErr::Expected(what.to_string(), got).into(),
            Err(e) => e.into(),
        }
    }

    fn got_msg(&mut self) -> ParseResult<String> {
        match self.tokens.peek() {
            Some(Ok(t)) => Ok(t.to_string()),
            Some(Err(e)) => Err(e.clone()),
            None => Ok("end of input".to_string()),
        }
    }
}
