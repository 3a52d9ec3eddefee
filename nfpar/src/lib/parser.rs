//! The backtracking analyser ("crawler").
//!
//! Analysis is predictive parsing over an explicit stack of symbols, except that a table cell
//! can hold more than one rule: at such a point the crawler clones its stack (a cheap
//! parent-pointer clone) per candidate rule and explores every branch, returning the analyses
//! of all branches that reach end of input. A wall-clock deadline is checked before every
//! nonterminal expansion; exceeding it aborts the whole analysis with [`ParseError::Timeout`].
//!
//! A parser is reusable across many analyses. The terminal-match and token-row caches it
//! carries are mutated during analysis, which is why [`NameParser::analyse`] takes `&mut self`;
//! a failed analysis never leaves them inconsistent, as cached entries depend only on the
//! grammar and the oracle.

use std::{
    error::Error,
    fmt,
    time::{Duration, Instant},
};

use cactus::Cactus;
use fnv::FnvHashMap;

use nfgrammar::{
    morph::{MorphKind, MorphValue},
    name::{NameGrammar, Sym, TermCat},
    NIdx, RIdx, TIdx,
};
use nftable::PredictTable;

use crate::{
    lex::{Token, TokenKind},
    oracle::{MorphOracle, OracleError},
};

/// Hard cap on crawler recursion. A grammar pathological enough to reach it is treated the same
/// as one that ran out of time.
const MAX_CRAWL_DEPTH: usize = 10_000;

#[derive(Debug)]
pub enum ParseError {
    /// The token sequence is not derivable from the grammar's start symbol.
    NotInLanguage,
    /// The analysis exceeded its configured time budget (or the recursion cap).
    Timeout,
    /// The oracle could not be consulted mid-analysis.
    Oracle(OracleError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::NotInLanguage => write!(f, "token sequence not in language"),
            ParseError::Timeout => write!(f, "analysis timed out"),
            ParseError::Oracle(e) => write!(f, "{}", e),
        }
    }
}

impl Error for ParseError {}

impl From<OracleError> for ParseError {
    fn from(e: OracleError) -> Self {
        ParseError::Oracle(e)
    }
}

/// The per-word outcome of one accepted derivation.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AnalyzedToken {
    pub word: String,
    pub kind: TokenKind,
    /// The terminal the word was consumed by.
    pub tidx: TIdx,
    /// Whether this word's surface form should be inflected under this derivation.
    pub inflect: bool,
    /// The morphological constraints the inflected forms of this word must satisfy: the
    /// terminal's filters plus any category the oracle pins down more tightly than its whole
    /// domain.
    pub morph_values: Vec<MorphValue>,
}

/// One accepted derivation: the rules applied, in application order, and the per-word results.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Analysis {
    pub rules: Vec<RIdx>,
    pub tokens: Vec<AnalyzedToken>,
}

/// Running diagnostics over the lifetime of one parser.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParseStats {
    pub analyses: usize,
    pub elapsed: Duration,
}

#[derive(Clone, Copy, Debug)]
enum StackSym {
    Term { tidx: TIdx, inflect: bool },
    Nonterm { nidx: NIdx, inflect: bool },
}

/// Configures and builds a [`NameParser`].
pub struct NameParserBuilder<'a> {
    grm: &'a NameGrammar,
    table: &'a PredictTable,
    oracle: &'a dyn MorphOracle,
    unknown_cats: Vec<TermCat>,
    timeout: Option<Duration>,
}

impl<'a> NameParserBuilder<'a> {
    pub fn new(
        grm: &'a NameGrammar,
        table: &'a PredictTable,
        oracle: &'a dyn MorphOracle,
    ) -> NameParserBuilder<'a> {
        NameParserBuilder {
            grm,
            table,
            oracle,
            unknown_cats: vec![TermCat::Noun],
            timeout: None,
        }
    }

    /// The terminal categories an unknown-analysis token is allowed to match, besides the
    /// wildcard category. Defaults to nouns only.
    pub fn unknown_cats(mut self, cats: &[TermCat]) -> NameParserBuilder<'a> {
        self.unknown_cats = cats.to_vec();
        self
    }

    /// Wall-clock budget per `analyse` call. Unset means unbounded.
    pub fn timeout(mut self, t: Duration) -> NameParserBuilder<'a> {
        self.timeout = Some(t);
        self
    }

    pub fn build(self) -> NameParser<'a> {
        NameParser {
            grm: self.grm,
            table: self.table,
            oracle: self.oracle,
            unknown_cats: self.unknown_cats,
            timeout: self.timeout,
            match_cache: FnvHashMap::default(),
            row_cache: FnvHashMap::default(),
            stats: ParseStats::default(),
        }
    }
}

/// An analyser over one grammar, table and oracle.
pub struct NameParser<'a> {
    grm: &'a NameGrammar,
    table: &'a PredictTable,
    oracle: &'a dyn MorphOracle,
    unknown_cats: Vec<TermCat>,
    timeout: Option<Duration>,
    // Keyed on whole tokens: the same word can arrive under different kinds, which match
    // different terminals.
    match_cache: FnvHashMap<(TIdx, Token), bool>,
    row_cache: FnvHashMap<Token, Vec<TIdx>>,
    stats: ParseStats,
}

impl<'a> NameParser<'a> {
    /// Analyses a token sequence, returning every derivation of it the grammar admits. An EOF
    /// token is appended if the caller's sequence lacks one.
    pub fn analyse(&mut self, tokens: &[Token]) -> Result<Vec<Analysis>, ParseError> {
        let start_at = Instant::now();
        self.stats.analyses += 1;
        let mut toks = tokens.to_vec();
        if toks.last().map(|t| t.kind()) != Some(TokenKind::Eof) {
            toks.push(Token::eof());
        }
        let finish_by = self.timeout.map(|t| start_at + t);
        let pstack = Cactus::new()
            .child(StackSym::Term {
                tidx: self.grm.eof_tidx(),
                inflect: false,
            })
            .child(StackSym::Nonterm {
                nidx: self.grm.start_nidx(),
                inflect: self.grm.start_inflect(),
            });
        let r = self.crawl(&toks, 0, pstack, finish_by, 0);
        self.stats.elapsed += start_at.elapsed();
        r
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    fn crawl(
        &mut self,
        tokens: &[Token],
        mut laidx: usize,
        mut pstack: Cactus<StackSym>,
        finish_by: Option<Instant>,
        depth: usize,
    ) -> Result<Vec<Analysis>, ParseError> {
        if depth > MAX_CRAWL_DEPTH {
            return Err(ParseError::Timeout);
        }
        let mut rules = Vec::new();
        let mut atoks = Vec::new();
        while let Some(sym) = pstack.val().copied() {
            pstack = match pstack.parent() {
                Some(p) => p,
                None => break,
            };
            let tok = match tokens.get(laidx) {
                Some(t) => t,
                None => return Err(ParseError::NotInLanguage),
            };
            match sym {
                StackSym::Term { tidx, inflect } => {
                    if !self.matches(tidx, tok)? {
                        return Err(ParseError::NotInLanguage);
                    }
                    if tok.kind() != TokenKind::Eof {
                        // Unknown-analysis words are passed through verbatim whatever the
                        // derivation says.
                        let inflect = tok.kind() != TokenKind::AnalyzeUnknown && inflect;
                        let morph_values = self.morph_values(tidx, tok)?;
                        atoks.push(AnalyzedToken {
                            word: tok.word().to_owned(),
                            kind: tok.kind(),
                            tidx,
                            inflect,
                            morph_values,
                        });
                    }
                    laidx += 1;
                }
                StackSym::Nonterm { nidx, inflect } => {
                    if let Some(fb) = finish_by {
                        if Instant::now() >= fb {
                            return Err(ParseError::Timeout);
                        }
                    }
                    let cands = self.rules_for(nidx, tok)?;
                    match cands.as_slice() {
                        [] => return Err(ParseError::NotInLanguage),
                        [ridx] => {
                            rules.push(*ridx);
                            pstack = self.push_rule(pstack, *ridx, inflect);
                        }
                        _ => {
                            let mut out = Vec::new();
                            let mut all_failed = true;
                            for &ridx in cands.iter() {
                                let bstack = self.push_rule(pstack.clone(), ridx, inflect);
                                match self.crawl(tokens, laidx, bstack, finish_by, depth + 1) {
                                    Ok(branch) => {
                                        all_failed = false;
                                        for a in branch {
                                            let mut rs = rules.clone();
                                            rs.push(ridx);
                                            rs.extend(a.rules);
                                            let mut ts = atoks.clone();
                                            ts.extend(a.tokens);
                                            out.push(Analysis {
                                                rules: rs,
                                                tokens: ts,
                                            });
                                        }
                                    }
                                    Err(ParseError::NotInLanguage) => (),
                                    Err(e) => return Err(e),
                                }
                            }
                            if all_failed {
                                return Err(ParseError::NotInLanguage);
                            }
                            return Ok(out);
                        }
                    }
                }
            }
        }
        Ok(vec![Analysis {
            rules,
            tokens: atoks,
        }])
    }

    /// Pushes a rule's right side onto the stack, reversed so the leftmost symbol is expanded
    /// first. The inflect flag propagates downward and is switched off by a symbol's own
    /// no-inflect marker, never back on.
    fn push_rule(&self, pstack: Cactus<StackSym>, ridx: RIdx, inflect: bool) -> Cactus<StackSym> {
        let mut st = pstack;
        for sym in self.grm.rule(ridx).rhs.iter().rev() {
            st = match sym {
                Sym::Empty => st,
                Sym::Term { tidx, inflect: occ } => st.child(StackSym::Term {
                    tidx: *tidx,
                    inflect: inflect && *occ,
                }),
                Sym::Nonterm(n) => st.child(StackSym::Nonterm {
                    nidx: *n,
                    inflect: inflect && self.grm.nonterm(*n).inflect(),
                }),
            };
        }
        st
    }

    /// The rules applicable for a stack nonterminal under a token: the union of the table's
    /// cells for every terminal the token matches.
    fn rules_for(&mut self, nidx: NIdx, tok: &Token) -> Result<Vec<RIdx>, ParseError> {
        let tidxs = self.matching_tidxs(tok)?;
        let mut out = Vec::new();
        for tidx in tidxs {
            out.extend_from_slice(self.table.rules(nidx, tidx));
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }

    /// All terminals a token matches, cached per token.
    fn matching_tidxs(&mut self, tok: &Token) -> Result<Vec<TIdx>, ParseError> {
        if let Some(v) = self.row_cache.get(tok) {
            return Ok(v.clone());
        }
        let mut v = Vec::new();
        for tidx in self.grm.iter_tidxs() {
            if self.matches(tidx, tok)? {
                v.push(tidx);
            }
        }
        self.row_cache.insert(tok.clone(), v.clone());
        Ok(v)
    }

    fn matches(&mut self, tidx: TIdx, tok: &Token) -> Result<bool, ParseError> {
        let key = (tidx, tok.clone());
        if let Some(&m) = self.match_cache.get(&key) {
            return Ok(m);
        }
        let m = self.matches_uncached(tidx, tok)?;
        self.match_cache.insert(key, m);
        Ok(m)
    }

    fn matches_uncached(&self, tidx: TIdx, tok: &Token) -> Result<bool, ParseError> {
        let term = self.grm.term(tidx);
        if tok.kind() == TokenKind::Eof || term.cat() == TermCat::Eof {
            return Ok(tok.kind() == TokenKind::Eof && term.cat() == TermCat::Eof);
        }
        if let Some(re) = term.match_regex() {
            if !re.is_match(tok.word()) {
                return Ok(false);
            }
        }
        if tok.kind() == TokenKind::AnalyzeUnknown {
            return Ok(term.cat() == TermCat::Any || self.unknown_cats.contains(&term.cat()));
        }
        match term.cat() {
            TermCat::Any => Ok(true),
            TermCat::Number => Ok(tok.kind() == TokenKind::Number),
            TermCat::RomanNumber => Ok(tok.kind() == TokenKind::RomanNumber),
            TermCat::DegreeTitle => Ok(tok.kind() == TokenKind::DegreeTitle),
            TermCat::InitialAbbreviation => Ok(tok.kind() == TokenKind::InitialAbbreviation),
            cat => {
                let pos = match cat.to_pos() {
                    Some(p) => p,
                    None => return Ok(false),
                };
                if tok.kind() != TokenKind::Analyze {
                    return Ok(false);
                }
                let rdgs = match self.oracle.readings(tok.word())? {
                    Some(r) => r,
                    None => return Ok(false),
                };
                let flags = term.flags();
                let mut passing = rdgs.tag_rules(&term.filter_values(true), flags);
                if passing.is_empty() && term.has_voluntary() {
                    passing = rdgs.tag_rules(&term.filter_values(false), flags);
                }
                Ok(passing.iter().any(|r| r.pos == Some(pos)))
            }
        }
    }

    /// The morphological constraints a matched word carries into form generation: the filters
    /// the terminal imposed (after any voluntary fallback), the part of speech, and every
    /// further category the oracle narrows below its full domain.
    fn morph_values(&self, tidx: TIdx, tok: &Token) -> Result<Vec<MorphValue>, ParseError> {
        let term = self.grm.term(tidx);
        let pos = match term.cat().to_pos() {
            Some(p) if tok.kind() == TokenKind::Analyze => p,
            _ => return Ok(term.filter_values(true)),
        };
        let rdgs = match self.oracle.readings(tok.word())? {
            Some(r) => r,
            None => return Ok(term.filter_values(true)),
        };
        let flags = term.flags();
        let full = term.filter_values(true);
        let used = if term.has_voluntary() && rdgs.tag_rules(&full, flags).is_empty() {
            term.filter_values(false)
        } else {
            full
        };
        let mut vals = used;
        vals.push(MorphValue::Pos(pos));
        // Notes are never taken from the oracle: most inflected forms of a word carry none, so
        // a note constraint would wrongly rule them out downstream. A terminal's own `note`
        // filter still lands in `used` above.
        for kind in [MorphKind::Gender, MorphKind::Number, MorphKind::Case] {
            if vals.iter().any(|v| v.kind() == kind) {
                continue;
            }
            let vs = rdgs.values_of(kind, &vals, flags);
            if !vs.is_empty() && vs.len() < MorphValue::kind_cardinality(kind) {
                vals.extend(vs);
            }
        }
        Ok(vals)
    }
}
