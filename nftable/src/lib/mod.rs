#![allow(clippy::cognitive_complexity)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::new_without_default)]
#![allow(clippy::upper_case_acronyms)]
#![forbid(unsafe_code)]

//! Builds the predictive structures for a [`nfgrammar::name::NameGrammar`]: the PREDICT set of
//! every rule and, from those, the `nonterminal × terminal → {rules}` table the backtracking
//! analyser drives its rule selection from. A table cell holding more than one rule is exactly
//! where the analyser forks.

pub mod predicts;
pub mod predtable;

pub use crate::{predicts::RulePredicts, predtable::PredictTable};
