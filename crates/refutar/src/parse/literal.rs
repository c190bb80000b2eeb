use std::{fmt, iter::Peekable};

use super::{ident_len, is_ident_char, ParseErr, ParseResult};
use crate::clause::Literal;
use crate::logic::fo::{Relation, Term};
use crate::symbol::Symbol;

/// Parses `["~"] Identifier "(" Arg {"," Arg} ")"`.
pub fn parse_literal(text: &str) -> ParseResult<Literal> {
    LiteralParser::parse(text)
}

#[derive(Debug, PartialEq, Eq)]
struct Token<'t> {
    kind: TokenKind,
    spelling: &'t str,
    src_pos: usize,
}

impl<'t> fmt::Display for Token<'t> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' at position {}", self.spelling, self.src_pos)
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum TokenKind {
    Not,
    LParen,
    RParen,
    Comma,
    Ident,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Not => write!(f, "~"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Ident => write!(f, "identifier"),
        }
    }
}

struct LiteralTokenizer<'f> {
    formula: &'f str,
    pos: usize,
}

impl<'f> LiteralTokenizer<'f> {
    fn new(formula: &'f str) -> Self {
        Self { formula, pos: 0 }
    }

    fn next_token(&mut self) -> Option<ParseResult<Token<'f>>> {
        let trimmed = self.formula.trim_start();
        self.pos += self.formula.len() - trimmed.len();
        self.formula = trimmed;

        let c = self.formula.chars().next()?;
        let (kind, size) = match c {
            '~' => (TokenKind::Not, 1),
            '(' => (TokenKind::LParen, 1),
            ')' => (TokenKind::RParen, 1),
            ',' => (TokenKind::Comma, 1),
            c if is_ident_char(c) => (TokenKind::Ident, ident_len(self.formula)),
            c => {
                // Stop after the first error.
                let pos = self.pos;
                self.formula = "";
                return Some(Err(ParseErr::UnexpectedChar(c, pos)));
            }
        };

        let t = Token {
            kind,
            spelling: &self.formula[..size],
            src_pos: self.pos,
        };
        self.pos += size;
        self.formula = &self.formula[size..];
        Some(Ok(t))
    }
}

impl<'f> Iterator for LiteralTokenizer<'f> {
    type Item = ParseResult<Token<'f>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

struct LiteralParser<'f> {
    tokens: Peekable<LiteralTokenizer<'f>>,
}

impl<'f> LiteralParser<'f> {
    fn parse(text: &'f str) -> ParseResult<Literal> {
        let mut parser = LiteralParser {
            tokens: LiteralTokenizer::new(text).peekable(),
        };
        let negated = parser.eat_if_kind(TokenKind::Not);
        let rel = parser.parse_rel()?;

        match parser.tokens.next() {
            None => Ok(Literal::new(rel, negated)),
            Some(Err(e)) => Err(e),
            Some(Ok(t)) => Err(ParseErr::Expected(
                "end of literal".to_string(),
                t.to_string(),
            )),
        }
    }

    fn parse_rel(&mut self) -> ParseResult<Relation> {
        let spelling = self.ident("predicate identifier")?;
        self.eat(TokenKind::LParen)?;

        let mut args = vec![self.parse_term()?];
        while self.eat_if_kind(TokenKind::Comma) {
            args.push(self.parse_term()?);
        }

        self.eat(TokenKind::RParen)?;
        Ok(Relation::new(spelling, args))
    }

    fn parse_term(&mut self) -> ParseResult<Term> {
        Ok(Term::classify(self.ident("argument")?))
    }

    fn ident(&mut self, what: &str) -> ParseResult<Symbol> {
        match self.tokens.next() {
            Some(Ok(Token {
                kind: TokenKind::Ident,
                spelling,
                ..
            })) => Ok(Symbol::intern(spelling)),
            Some(Ok(t)) => Err(ParseErr::Expected(what.to_string(), t.to_string())),
            Some(Err(e)) => Err(e),
            None => Err(ParseErr::Expected(
                what.to_string(),
                "end of input".to_string(),
            )),
        }
    }

    fn eat_if_kind(&mut self, expected: TokenKind) -> bool {
        match self.tokens.peek() {
            Some(Ok(Token { kind, .. })) if *kind == expected => {
                self.tokens.next();
                true
            }
            _ => false,
        }
    }

    fn eat(&mut self, expected: TokenKind) -> ParseResult<()> {
        if self.eat_if_kind(expected) {
            Ok(())
        } else {
            Err(ParseErr::Expected(
                format!("'{}'", expected),
                self.got_msg()?,
            ))
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
