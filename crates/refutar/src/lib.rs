pub mod calculi;
pub mod calculus;
pub mod clause;
pub mod logic;
pub mod parse;
mod symbol;
pub mod tamper_protect;

pub use calculi::resolution;
pub use calculus::{Calculus, CloseMsg};
pub use clause::{Clause, KnowledgeBase, Literal};
pub use symbol::Symbol;

use symbol::Interner;

pub(crate) struct SessionGlobals {
    pub(crate) symbol_interner: Interner,
}

scoped_tls::scoped_thread_local!(static SESSION_GLOBALS: SessionGlobals);

/// Runs `f` inside a symbol session.
///
/// Every [`Symbol`] (and so every literal, clause and knowledge base) is only
/// meaningful inside the session that interned it. Nested calls reuse the
/// enclosing session.
pub fn session<R>(f: impl FnOnce() -> R) -> R {
    if SESSION_GLOBALS.is_set() {
        return f();
    }
    let globals = SessionGlobals {
        symbol_interner: Interner::fresh(),
    };
    SESSION_GLOBALS.set(&globals, f)
}

pub(crate) fn with_session_globals<R>(f: impl FnOnce(&SessionGlobals) -> R) -> R {
    SESSION_GLOBALS.with(f)
}
