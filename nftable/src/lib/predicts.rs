//! PREDICT sets: per rule, the terminals that justify applying it.

use nfgrammar::{
    name::{NameFirsts, NameFollows, NameGrammar},
    RIdx, TIdx,
};
use vob::Vob;

/// One bitfield of terminal indices per rule: FIRST of the rule's right side, extended with
/// FOLLOW of its left side when the whole right side can derive the empty string.
#[derive(Clone, Debug)]
pub struct RulePredicts {
    predicts: Vec<Vob>,
}

impl RulePredicts {
    pub fn new(grm: &NameGrammar, firsts: &NameFirsts, follows: &NameFollows) -> RulePredicts {
        let mut predicts = Vec::with_capacity(grm.rules_len());
        for r in grm.rules() {
            let mut v = firsts.first_of_seq(grm.terms_len(), &r.rhs);
            if firsts.seq_nullable(&r.rhs) {
                v.or(follows.follows(r.lhs));
            }
            predicts.push(v);
        }
        RulePredicts { predicts }
    }

    /// Returns true if the terminal is in the rule's PREDICT set.
    pub fn is_set(&self, ridx: RIdx, tidx: TIdx) -> bool {
        self.predicts[usize::from(ridx)][usize::from(tidx)]
    }

    pub fn predict(&self, ridx: RIdx) -> &Vob {
        &self.predicts[usize::from(ridx)]
    }
}
