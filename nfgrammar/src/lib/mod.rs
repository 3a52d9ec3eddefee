#![allow(clippy::cognitive_complexity)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::new_without_default)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::upper_case_acronyms)]
#![forbid(unsafe_code)]

//! A library for manipulating the template-driven context-free grammars used to recognise and
//! generate inflected forms of personal and place names. A grammar source file declares
//! parameterized rule templates over a closed set of terminal categories; this library expands
//! the templates into a concrete grammar, simplifies it (useless-symbol removal, epsilon
//! elimination, prefix regrouping) and computes the EMPTY/FIRST/FOLLOW sets that the companion
//! crates build a predictive table and a backtracking analyser from.
//!
//! Terminology used throughout:
//!
//!   * A *terminal* is a lexical category plus an attribute set, matched against input tokens.
//!   * A *nonterminal* is a named symbol expanded via rules; template parameters are baked into
//!     its name during expansion.
//!   * A *rule* maps one nonterminal to an ordered sequence of symbols.
//!
//! The grammar guarantees that, once built, rule order and symbol indices are deterministic for
//! a given source, and that terminal index 0 is always the end-of-input terminal.

mod idxnewtype;
pub mod morph;
pub mod name;

pub use crate::idxnewtype::{NIdx, RIdx, TIdx};
