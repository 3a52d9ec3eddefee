//! EMPTY and FIRST sets, computed by fixed-point iteration over the simplified rules.

use vob::Vob;

use super::{grammar::NameGrammar, symbol::Sym};
use crate::idxnewtype::{NIdx, TIdx};

/// `NameFirsts` stores one bitfield of terminal indices per nonterminal, plus an epsilon bit
/// recording whether the nonterminal can derive the empty string.
#[derive(Clone, Debug)]
pub struct NameFirsts {
    firsts: Vec<Vob>,
    epsilons: Vob,
}

impl NameFirsts {
    pub fn new(grm: &NameGrammar) -> NameFirsts {
        let mut f = NameFirsts {
            firsts: vec![Vob::from_elem(false, grm.terms_len()); grm.nonterms_len()],
            epsilons: Vob::from_elem(false, grm.nonterms_len()),
        };

        // Loop until the fixed point: no changes to the FIRST sets during a round.
        loop {
            let mut changed = false;
            for r in grm.rules() {
                let lhs = r.lhs;
                if !f.is_epsilon_set(lhs)
                    && r.rhs.iter().all(|s| match s {
                        Sym::Empty => true,
                        Sym::Nonterm(n) => f.is_epsilon_set(*n),
                        Sym::Term { .. } => false,
                    })
                {
                    f.epsilons.set(usize::from(lhs), true);
                    changed = true;
                }
                for sym in r.rhs.iter() {
                    match sym {
                        Sym::Empty => (),
                        Sym::Term { tidx, .. } => {
                            // A terminal stops the walk along the right side.
                            if f.set(lhs, *tidx) {
                                changed = true;
                            }
                            break;
                        }
                        Sym::Nonterm(n) => {
                            for tidx in grm.iter_tidxs() {
                                if f.is_set(*n, tidx) && f.set(lhs, tidx) {
                                    changed = true;
                                }
                            }
                            if !f.is_epsilon_set(*n) {
                                break;
                            }
                        }
                    }
                }
            }
            if !changed {
                return f;
            }
        }
    }

    /// Returns true if the terminal is in the nonterminal's FIRST set.
    pub fn is_set(&self, nidx: NIdx, tidx: TIdx) -> bool {
        self.firsts[usize::from(nidx)][usize::from(tidx)]
    }

    /// Get all the firsts for a given nonterminal.
    pub fn firsts(&self, nidx: NIdx) -> &Vob {
        &self.firsts[usize::from(nidx)]
    }

    /// Returns true if the nonterminal can derive the empty string.
    pub fn is_epsilon_set(&self, nidx: NIdx) -> bool {
        self.epsilons[usize::from(nidx)]
    }

    /// Ensures that the FIRST set for the given nonterminal contains the terminal. Returns true
    /// if the set changed.
    fn set(&mut self, nidx: NIdx, tidx: TIdx) -> bool {
        let v = &mut self.firsts[usize::from(nidx)];
        if v[usize::from(tidx)] {
            false
        } else {
            v.set(usize::from(tidx), true);
            true
        }
    }

    /// FIRST of a symbol sequence: the union of each symbol's FIRST along the sequence,
    /// stopping after the first non-nullable symbol.
    pub fn first_of_seq(&self, terms_len: usize, seq: &[Sym]) -> Vob {
        let mut v = Vob::from_elem(false, terms_len);
        for sym in seq {
            match sym {
                Sym::Empty => (),
                Sym::Term { tidx, .. } => {
                    v.set(usize::from(*tidx), true);
                    break;
                }
                Sym::Nonterm(n) => {
                    v.or(self.firsts(*n));
                    if !self.is_epsilon_set(*n) {
                        break;
                    }
                }
            }
        }
        v
    }

    /// Whether every symbol of the sequence can derive the empty string.
    pub fn seq_nullable(&self, seq: &[Sym]) -> bool {
        seq.iter().all(|s| match s {
            Sym::Empty => true,
            Sym::Nonterm(n) => self.is_epsilon_set(*n),
            Sym::Term { .. } => false,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::name::{parser::parse_source, simplify, symbol::Nonterm, template::TemplateSet};

    /// Builds a grammar but stops before epsilon elimination, so that nullable nonterminals
    /// survive and the epsilon bits are exercised.
    fn grammar_no_ep_elim(src: &str) -> NameGrammar {
        let (start, templates) = parse_source(src).unwrap();
        let mut exp = TemplateSet::new(start, templates)
            .unwrap()
            .expand()
            .unwrap();
        simplify::remove_useless(&mut exp).unwrap();
        NameGrammar::for_test(exp)
    }

    fn nidx(grm: &NameGrammar, name: &str) -> NIdx {
        (0..grm.nonterms_len())
            .map(NIdx::from)
            .find(|n| grm.nonterm(*n) == &Nonterm::new(name, true))
            .unwrap()
    }

    fn tidx_of_cat_code(grm: &NameGrammar, code: &str) -> TIdx {
        grm.iter_tidxs()
            .find(|t| grm.term(*t).cat().code() == code)
            .unwrap()
    }

    #[test]
    fn test_firsts_and_epsilons() {
        let grm = grammar_no_ep_elim(
            "S
             S -> PRED JADRO
             PRED -> 2{t=U}
             PRED -> ε
             JADRO -> 1{t=G}",
        );
        let f = NameFirsts::new(&grm);
        let s = nidx(&grm, "S");
        let pred = nidx(&grm, "PRED");
        let jadro = nidx(&grm, "JADRO");
        let t_adj = tidx_of_cat_code(&grm, "2");
        let t_noun = tidx_of_cat_code(&grm, "1");

        assert!(f.is_epsilon_set(pred));
        assert!(!f.is_epsilon_set(s));
        assert!(!f.is_epsilon_set(jadro));

        assert!(f.is_set(pred, t_adj));
        assert!(!f.is_set(pred, t_noun));
        // PRED is nullable, so S's FIRST reaches through to JADRO's.
        assert!(f.is_set(s, t_adj));
        assert!(f.is_set(s, t_noun));
    }

    #[test]
    fn test_first_of_seq() {
        let grm = grammar_no_ep_elim(
            "S
             S -> PRED JADRO
             PRED -> 2{t=U}
             PRED -> ε
             JADRO -> 1{t=G}",
        );
        let f = NameFirsts::new(&grm);
        let pred = nidx(&grm, "PRED");
        let jadro = nidx(&grm, "JADRO");
        let t_adj = tidx_of_cat_code(&grm, "2");
        let t_noun = tidx_of_cat_code(&grm, "1");

        let seq = [Sym::Nonterm(pred), Sym::Nonterm(jadro)];
        let v = f.first_of_seq(grm.terms_len(), &seq);
        assert!(v[usize::from(t_adj)]);
        assert!(v[usize::from(t_noun)]);
        assert!(!f.seq_nullable(&seq));
        assert!(f.seq_nullable(&[Sym::Nonterm(pred), Sym::Empty]));

        // A non-nullable head hides everything after it.
        let seq = [Sym::Nonterm(jadro), Sym::Nonterm(pred)];
        let v = f.first_of_seq(grm.terms_len(), &seq);
        assert!(v[usize::from(t_noun)]);
        assert!(!v[usize::from(t_adj)]);
    }
}
