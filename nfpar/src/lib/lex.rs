//! Splitting an input name into classified tokens.
//!
//! The lexer does no segmentation of its own (the caller hands it whitespace-split words); its
//! job is classification: digit numbers, roman numbers, initial abbreviations, degree titles
//! (including multi-word titles such as "akad. arch.", matched greedily) and plain words to be
//! analysed morphologically. Words the oracle knows nothing about are downgraded to the
//! unknown-analysis state rather than failing the lex.

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;

use crate::oracle::{MorphOracle, OracleError};

lazy_static! {
    static ref RE_NUMBER: Regex = Regex::new(r"^[0-9]+\.?$").unwrap();
    static ref RE_ROMAN_NUMBER: Regex =
        Regex::new(r"(?i)^((X{1,3}(IX|IV|V?I{0,3}))|((IX|IV|I{1,3}|VI{0,3})))\.?$").unwrap();
}

/// The lexical class of a token.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenKind {
    /// A word with morphological readings; matched against part-of-speech terminals.
    Analyze,
    /// A word the oracle has no readings for.
    AnalyzeUnknown,
    Number,
    RomanNumber,
    DegreeTitle,
    InitialAbbreviation,
    Eof,
}

/// One classified input word.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Token {
    word: String,
    kind: TokenKind,
}

impl Token {
    pub fn new<S: Into<String>>(word: S, kind: TokenKind) -> Token {
        Token {
            word: word.into(),
            kind,
        }
    }

    pub fn eof() -> Token {
        Token {
            word: String::new(),
            kind: TokenKind::Eof,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }
}

/// An immutable lexer definition: the degree-title bank plus, derived from it, every proper
/// prefix of a multi-word title (needed to extend a title match word by word).
#[derive(Clone, Debug)]
pub struct LexerDef {
    titles: IndexSet<String>,
    title_prefixes: IndexSet<String>,
}

impl LexerDef {
    pub fn new<S: Into<String>, I: IntoIterator<Item = S>>(titles: I) -> LexerDef {
        let titles: IndexSet<String> = titles.into_iter().map(|t| t.into()).collect();
        let mut title_prefixes = IndexSet::new();
        for t in titles.iter() {
            let words: Vec<&str> = t.split_whitespace().collect();
            for i in 1..words.len() {
                title_prefixes.insert(words[..i].join(" "));
            }
        }
        LexerDef {
            titles,
            title_prefixes,
        }
    }

    fn is_title(&self, s: &str) -> bool {
        self.titles.contains(s)
    }

    fn is_title_prefix(&self, s: &str) -> bool {
        self.title_prefixes.contains(s)
    }

    /// Classifies a word sequence. The returned sequence has one token per input word, except
    /// that a multi-word degree title becomes a single token. No EOF token is appended; the
    /// parser adds one itself.
    pub fn tokens<O: MorphOracle + ?Sized>(
        &self,
        words: &[&str],
        oracle: &O,
    ) -> Result<Vec<Token>, OracleError> {
        let mut out = Vec::with_capacity(words.len());
        let mut i = 0;
        while i < words.len() {
            let w = words[i];
            if self.is_title(w) || self.is_title_prefix(w) {
                // Greedily extend the title while the next word keeps it a known title or a
                // prefix of one.
                let mut j = i;
                let mut cur = w.to_owned();
                let mut best: Option<(usize, String)> = None;
                loop {
                    if self.is_title(&cur) {
                        best = Some((j, cur.clone()));
                    }
                    if j + 1 < words.len() && self.is_title_prefix(&cur) {
                        j += 1;
                        cur.push(' ');
                        cur.push_str(words[j]);
                    } else {
                        break;
                    }
                }
                if let Some((end, title)) = best {
                    out.push(Token::new(title, TokenKind::DegreeTitle));
                    i = end + 1;
                    continue;
                }
            }
            let kind = if RE_NUMBER.is_match(w) {
                TokenKind::Number
            } else if RE_ROMAN_NUMBER.is_match(w) {
                TokenKind::RomanNumber
            } else if is_initial_abbreviation(w) {
                TokenKind::InitialAbbreviation
            } else {
                TokenKind::Analyze
            };
            let kind = match kind {
                // Classes whose terminals still consult the oracle degrade when it knows
                // nothing about the word.
                TokenKind::Analyze | TokenKind::RomanNumber | TokenKind::InitialAbbreviation => {
                    if oracle.readings(w)?.is_some() {
                        kind
                    } else {
                        TokenKind::AnalyzeUnknown
                    }
                }
                k => k,
            };
            out.push(Token::new(w, kind));
            i += 1;
        }
        Ok(out)
    }
}

/// "J." style initials: two characters ending with a dot, or a lone upper-case letter.
fn is_initial_abbreviation(w: &str) -> bool {
    let cs: Vec<char> = w.chars().collect();
    match cs.as_slice() {
        [c, '.'] => !c.is_ascii_digit(),
        [c] => c.is_uppercase(),
        _ => false,
    }
}
