//! The name-grammar formalism: symbols, template source parsing, template expansion,
//! simplification and the FIRST/FOLLOW set solvers.

pub mod firsts;
pub mod follows;
pub mod grammar;
pub mod parser;
pub mod simplify;
pub mod symbol;
pub mod template;

pub use self::{
    firsts::NameFirsts,
    follows::NameFollows,
    grammar::{NameGrammar, NameGrammarError, Rule},
    parser::{GrammarSourceError, GrammarSourceErrorKind},
    symbol::{Attr, AttrKind, MatchRegex, Nonterm, Sym, TermCat, Terminal, WordKind},
};
