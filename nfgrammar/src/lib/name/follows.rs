//! FOLLOW sets, computed by fixed-point iteration over the simplified rules.

use vob::Vob;

use super::{firsts::NameFirsts, grammar::NameGrammar, symbol::Sym};
use crate::idxnewtype::{NIdx, TIdx};

/// `NameFollows` stores one bitfield of terminal indices per nonterminal: the terminals that
/// can appear immediately to its right in some sentential form. The start symbol's FOLLOW
/// always contains end-of-input.
#[derive(Clone, Debug)]
pub struct NameFollows {
    follows: Vec<Vob>,
}

impl NameFollows {
    pub fn new(grm: &NameGrammar, firsts: &NameFirsts) -> NameFollows {
        let mut follows = vec![Vob::from_elem(false, grm.terms_len()); grm.nonterms_len()];
        follows[usize::from(grm.start_nidx())].set(usize::from(grm.eof_tidx()), true);

        loop {
            let mut changed = false;
            for r in grm.rules() {
                for (i, sym) in r.rhs.iter().enumerate() {
                    let n = match sym {
                        Sym::Nonterm(n) => *n,
                        _ => continue,
                    };
                    let suffix = &r.rhs[i + 1..];
                    let suffix_firsts = firsts.first_of_seq(grm.terms_len(), suffix);
                    if follows[usize::from(n)].or(&suffix_firsts) {
                        changed = true;
                    }
                    if firsts.seq_nullable(suffix) {
                        // The suffix can vanish: whatever follows the left side follows this
                        // occurrence too.
                        let lhs_follows = follows[usize::from(r.lhs)].clone();
                        if follows[usize::from(n)].or(&lhs_follows) {
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                return NameFollows { follows };
            }
        }
    }

    /// Returns true if the terminal is in the nonterminal's FOLLOW set.
    pub fn is_set(&self, nidx: NIdx, tidx: TIdx) -> bool {
        self.follows[usize::from(nidx)][usize::from(tidx)]
    }

    /// Get all the followers for a given nonterminal.
    pub fn follows(&self, nidx: NIdx) -> &Vob {
        &self.follows[usize::from(nidx)]
    }
}
