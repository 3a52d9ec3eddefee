//! Helpers shared by the unit and integration tests.

#![doc(hidden)]

use fnv::FnvHashMap;

use nfgrammar::name::{NameFirsts, NameFollows, NameGrammar};
use nfgrammar::morph::{Flag, TagRule};
use nftable::PredictTable;

use crate::{
    lex::{Token, TokenKind},
    oracle::{MorphOracle, OracleError, ReadingGroup, WordReadings},
};

/// An in-memory oracle backed by a word table.
#[derive(Default)]
pub struct TestOracle {
    words: FnvHashMap<String, WordReadings>,
}

impl TestOracle {
    pub fn new() -> TestOracle {
        TestOracle::default()
    }

    pub fn add(&mut self, word: &str, readings: WordReadings) {
        self.words.insert(word.to_owned(), readings);
    }

    /// Adds a word with one flagless reading group built from tag strings.
    pub fn add_tags(&mut self, word: &str, tags: &[&str]) {
        self.add_flagged_tags(word, &[], tags);
    }

    pub fn add_flagged_tags(&mut self, word: &str, flags: &[Flag], tags: &[&str]) {
        let group = ReadingGroup::new(
            flags.to_vec(),
            tags.iter().map(|t| TagRule::from_tag(t)).collect(),
        );
        self.add(word, WordReadings::new(vec![group]));
    }
}

impl MorphOracle for TestOracle {
    fn readings(&self, word: &str) -> Result<Option<&WordReadings>, OracleError> {
        Ok(self.words.get(word))
    }
}

/// Builds the grammar and predictive table for a source string.
pub fn parser_parts(src: &str) -> (NameGrammar, PredictTable) {
    let grm = match NameGrammar::new(src) {
        Ok(g) => g,
        Err(e) => panic!("{}", e),
    };
    let firsts = NameFirsts::new(&grm);
    let follows = NameFollows::new(&grm, &firsts);
    let table = PredictTable::new(&grm, &firsts, &follows);
    (grm, table)
}

/// Tokens in the analyse state, bypassing the lexer.
pub fn analyze_tokens(words: &[&str]) -> Vec<Token> {
    words
        .iter()
        .map(|w| Token::new(*w, TokenKind::Analyze))
        .collect()
}
