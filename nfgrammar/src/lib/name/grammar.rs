//! Ties the pipeline together: parse templates, expand, simplify, intern.
//!
//! A [`NameGrammar`] is immutable once built. Terminal index 0 is always the end-of-input
//! terminal; rule order is deterministic for a given source.

use std::{error::Error, fmt, fs, io, path::Path};

use indexmap::IndexSet;

use super::{
    parser::{self, GrammarSourceError},
    simplify,
    symbol::{Nonterm, Sym, Terminal},
    template::TemplateSet,
};
use crate::idxnewtype::{NIdx, RIdx, TIdx};

/// A concrete, variable-free rule. The left side is always a nonterminal.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Rule {
    pub lhs: NIdx,
    pub rhs: Vec<Sym>,
}

/// Any error from grammar construction.
#[derive(Debug)]
pub enum NameGrammarError {
    Source(GrammarSourceError),
    Io(io::Error),
}

impl fmt::Display for NameGrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NameGrammarError::Source(e) => write!(f, "{}", e),
            NameGrammarError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl Error for NameGrammarError {}

impl From<GrammarSourceError> for NameGrammarError {
    fn from(e: GrammarSourceError) -> Self {
        NameGrammarError::Source(e)
    }
}

impl From<io::Error> for NameGrammarError {
    fn from(e: io::Error) -> Self {
        NameGrammarError::Io(e)
    }
}

/// A fully built name grammar: interned symbol universes plus the simplified rule set.
pub struct NameGrammar {
    start_name: String,
    start: NIdx,
    terms: IndexSet<Terminal>,
    nonterms: IndexSet<Nonterm>,
    rules: Vec<Rule>,
}

impl NameGrammar {
    /// Builds a grammar from source text.
    pub fn new(src: &str) -> Result<NameGrammar, GrammarSourceError> {
        let (start, templates) = parser::parse_source(src)?;
        let start_name = start.to_string();
        let mut exp = TemplateSet::new(start, templates)?.expand()?;
        simplify::simplify(&mut exp)?;
        Ok(NameGrammar {
            start_name,
            start: exp.start,
            terms: exp.terms,
            nonterms: exp.nonterms,
            rules: exp.rules,
        })
    }

    /// Builds a grammar from a source file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<NameGrammar, NameGrammarError> {
        let src = fs::read_to_string(path)?;
        Ok(NameGrammar::new(&src)?)
    }

    /// Wraps an expansion result directly, bypassing whichever pipeline stages a test wants to
    /// leave out.
    #[cfg(test)]
    pub(crate) fn for_test(exp: super::template::Expanded) -> NameGrammar {
        let start_name = exp.nonterms[usize::from(exp.start)].to_string();
        NameGrammar {
            start_name,
            start: exp.start,
            terms: exp.terms,
            nonterms: exp.nonterms,
            rules: exp.rules,
        }
    }

    pub fn start_nidx(&self) -> NIdx {
        self.start
    }

    /// The start symbol inflects unless it carries the `!` marker.
    pub fn start_inflect(&self) -> bool {
        self.nonterm(self.start).inflect()
    }

    pub fn eof_tidx(&self) -> TIdx {
        TIdx(0)
    }

    pub fn terms_len(&self) -> usize {
        self.terms.len()
    }

    pub fn nonterms_len(&self) -> usize {
        self.nonterms.len()
    }

    pub fn rules_len(&self) -> usize {
        self.rules.len()
    }

    pub fn term(&self, tidx: TIdx) -> &Terminal {
        &self.terms[usize::from(tidx)]
    }

    pub fn nonterm(&self, nidx: NIdx) -> &Nonterm {
        &self.nonterms[usize::from(nidx)]
    }

    pub fn rule(&self, ridx: RIdx) -> &Rule {
        &self.rules[usize::from(ridx)]
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter_tidxs(&self) -> impl Iterator<Item = TIdx> {
        (0..self.terms.len()).map(TIdx::from)
    }

    pub fn iter_ridxs(&self) -> impl Iterator<Item = RIdx> {
        (0..self.rules.len()).map(RIdx::from)
    }

    fn sym_to_string(&self, sym: &Sym) -> String {
        match sym {
            Sym::Term { tidx, inflect } => {
                let t = self.term(*tidx);
                if *inflect {
                    t.to_string()
                } else {
                    format!("{}{}", parser::NO_INFLECT_SIGN, t)
                }
            }
            Sym::Nonterm(nidx) => self.nonterm(*nidx).to_string(),
            Sym::Empty => parser::EMPTY_STR.to_owned(),
        }
    }

    pub fn rule_to_string(&self, rule: &Rule) -> String {
        let rhs = rule
            .rhs
            .iter()
            .map(|s| self.sym_to_string(s))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}->{}", self.nonterm(rule.lhs), rhs)
    }
}

impl fmt::Display for NameGrammar {
    /// Dumps the grammar as `S=`, `N={..}`, `T={..}`, `P={..}`, with members sorted so the
    /// output is stable. Only symbols some rule still references are listed.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut used_n = IndexSet::new();
        let mut used_t = IndexSet::new();
        used_t.insert(self.eof_tidx());
        for r in self.rules.iter() {
            used_n.insert(r.lhs);
            for s in r.rhs.iter() {
                match s {
                    Sym::Term { tidx, .. } => {
                        used_t.insert(*tidx);
                    }
                    Sym::Nonterm(nidx) => {
                        used_n.insert(*nidx);
                    }
                    Sym::Empty => (),
                }
            }
        }
        let mut ns: Vec<String> = used_n.iter().map(|n| self.nonterm(*n).to_string()).collect();
        ns.sort_unstable();
        let mut ts: Vec<String> = used_t.iter().map(|t| self.term(*t).to_string()).collect();
        ts.sort_unstable();
        let mut ps: Vec<String> = self.rules.iter().map(|r| self.rule_to_string(r)).collect();
        ps.sort_unstable();

        writeln!(f, "S={}", self.start_name)?;
        writeln!(f, "N={{{}}}", ns.join(", "))?;
        writeln!(f, "T={{{}}}", ts.join(", "))?;
        writeln!(f, "P={{")?;
        for p in ps {
            writeln!(f, "\t{}", p)?;
        }
        write!(f, "}}")
    }
}
