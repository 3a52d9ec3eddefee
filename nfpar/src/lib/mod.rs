#![allow(clippy::cognitive_complexity)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::new_without_default)]
#![allow(clippy::upper_case_acronyms)]
#![forbid(unsafe_code)]

//! The runtime side of name analysis: the lexer that classifies a name's words into tokens,
//! the morphological oracle boundary, the backtracking analyser that enumerates every
//! derivation of a token sequence (under an optional wall-clock budget), and the morph-mask
//! walk over an accepted derivation.
//!
//! The typical flow is:
//!
//! ```text
//! LexerDef::tokens  ->  NameParser::analyse  ->  morph_mask / AnalyzedToken.morph_values
//! ```
//!
//! with the grammar and table built once by `nfgrammar`/`nftable` and reused for every name.

pub mod lex;
pub mod morphmask;
pub mod oracle;
pub mod parser;
pub mod test_utils;

pub use crate::{
    lex::{LexerDef, Token, TokenKind},
    morphmask::{morph_mask, InvalidDerivation},
    oracle::{MorphOracle, OracleError, ReadingGroup, WordReadings},
    parser::{AnalyzedToken, Analysis, NameParser, NameParserBuilder, ParseError, ParseStats},
};
