use std::{cell::RefCell, cmp::Ordering, collections::HashMap, fmt};

use crate::with_session_globals;

/// An interned identifier. Equality and hashing compare the interner index,
/// ordering compares the spelling so that sorted output is the same in every
/// session.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Maps a string to its interned representation.
    pub fn intern(string: &str) -> Self {
        with_session_globals(|session_globals| session_globals.symbol_interner.intern(string))
    }

    /// Runs `f` on the spelling of the symbol.
    ///
    /// The interner is borrowed while `f` runs, so `f` must not intern.
    pub fn with_str<R>(self, f: impl FnOnce(&str) -> R) -> R {
        with_session_globals(|session_globals| session_globals.symbol_interner.with_str(self, f))
    }

    /// Variables are spelled with a lowercase first character.
    pub fn starts_lowercase(self) -> bool {
        self.with_str(|s| s.chars().next().map_or(false, char::is_lowercase))
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        with_session_globals(|session_globals| {
            session_globals.symbol_interner.compare(*self, *other)
        })
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| fmt::Debug::fmt(s, f))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| f.write_str(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::intern(s)
    }
}

#[derive(Default)]
pub(crate) struct Interner(RefCell<InternerInner>);

#[derive(Default)]
struct InternerInner {
    names: HashMap<Box<str>, Symbol>,
    strings: Vec<Box<str>>,
}

impl Interner {
    pub fn fresh() -> Self {
        Self::default()
    }

    fn intern(&self, string: &str) -> Symbol {
        let mut inner = self.0.borrow_mut();
        if let Some(&name) = inner.names.get(string) {
            return name;
        }

        let name = Symbol(inner.strings.len() as u32);
        inner.strings.push(string.into());
        inner.names.insert(string.into(), name);
        name
    }

    fn with_str<R>(&self, symbol: Symbol, f: impl FnOnce(&str) -> R) -> R {
        let inner = self.0.borrow();
        f(&inner.strings[symbol.0 as usize])
    }

    fn compare(&self, a: Symbol, b: Symbol) -> Ordering {
        let inner = self.0.borrow();
        inner.strings[a.0 as usize].cmp(&inner.strings[b.0 as usize])
    }
}
