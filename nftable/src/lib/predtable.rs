//! The predictive parse table: for each nonterminal, which rules apply under which lookahead
//! terminal.

use fnv::FnvHashMap;
use nfgrammar::{
    name::{NameFirsts, NameFollows, NameGrammar},
    NIdx, RIdx, TIdx,
};

use crate::predicts::RulePredicts;

/// Maps `(nonterminal, terminal)` to the rules whose PREDICT set contains the terminal. Cell
/// rule lists are sorted by rule index, which fixes the order ambiguous branches are explored
/// in.
#[derive(Clone, Debug)]
pub struct PredictTable {
    rows: Vec<FnvHashMap<TIdx, Vec<RIdx>>>,
}

impl PredictTable {
    pub fn new(grm: &NameGrammar, firsts: &NameFirsts, follows: &NameFollows) -> PredictTable {
        let predicts = RulePredicts::new(grm, firsts, follows);
        let mut rows: Vec<FnvHashMap<TIdx, Vec<RIdx>>> =
            vec![FnvHashMap::default(); grm.nonterms_len()];
        for ridx in grm.iter_ridxs() {
            let lhs = grm.rule(ridx).lhs;
            for tidx in grm.iter_tidxs() {
                if predicts.is_set(ridx, tidx) {
                    rows[usize::from(lhs)].entry(tidx).or_default().push(ridx);
                }
            }
        }
        for row in rows.iter_mut() {
            for cell in row.values_mut() {
                cell.sort_unstable();
                cell.dedup();
            }
        }
        PredictTable { rows }
    }

    /// The rules applicable for the given stack nonterminal and lookahead terminal.
    pub fn rules(&self, nidx: NIdx, tidx: TIdx) -> &[RIdx] {
        self.rows[usize::from(nidx)]
            .get(&tidx)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The terminals a row holds any rule for. Lookup by an input token has to union the cells
    /// of every terminal the token matches; this iterator enumerates the candidates.
    pub fn row_terms(&self, nidx: NIdx) -> impl Iterator<Item = TIdx> + '_ {
        self.rows[usize::from(nidx)].keys().copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nfgrammar::name::Sym;

    fn table(src: &str) -> (NameGrammar, PredictTable) {
        let grm = NameGrammar::new(src).unwrap();
        let firsts = NameFirsts::new(&grm);
        let follows = NameFollows::new(&grm, &firsts);
        let table = PredictTable::new(&grm, &firsts, &follows);
        (grm, table)
    }

    #[test]
    fn test_unambiguous_cells() {
        let (grm, table) = table(
            "S
             S -> 1{t=G} PRIJMENI
             PRIJMENI -> 1{t=S}",
        );
        for ridx in grm.iter_ridxs() {
            let r = grm.rule(ridx);
            if let Sym::Term { tidx, .. } = r.rhs[0] {
                assert_eq!(table.rules(r.lhs, tidx), &[ridx]);
            }
        }
    }

    #[test]
    fn test_ambiguous_cell_holds_all_candidates() {
        // Both S alternatives start with the same terminal but diverge at their first symbol,
        // so prefix grouping leaves them alone and the cell is genuinely ambiguous.
        let (grm, table) = table(
            "S
             S -> KRATKE
             S -> DLOUHE
             KRATKE -> 1{t=G}
             DLOUHE -> 1{t=G} 1{t=S}",
        );
        let t_given = grm
            .iter_tidxs()
            .find(|t| grm.term(*t).cat().code() == "1"
                && grm.term(*t).word_kind() == nfgrammar::name::WordKind::Given)
            .unwrap();
        let cands = table.rules(grm.start_nidx(), t_given);
        assert_eq!(cands.len(), 2);
        for ridx in cands {
            assert_eq!(grm.rule(*ridx).lhs, grm.start_nidx());
        }
    }

    #[test]
    fn test_aux_epsilon_rule_predicts_follow() {
        let (grm, table) = table(
            "S
             S -> 1{t=G}
             S -> 1{t=G} 2{t=U}",
        );
        let aux_nidx = (0..grm.nonterms_len())
            .map(NIdx::from)
            .find(|n| grm.nonterm(*n).name().contains('$'))
            .unwrap();
        let eof_cands = table.rules(aux_nidx, grm.eof_tidx());
        assert_eq!(eof_cands.len(), 1);
        assert_eq!(grm.rule(eof_cands[0]).rhs, [Sym::Empty]);
    }

    #[test]
    fn test_empty_cell_is_empty_slice() {
        let (grm, table) = table(
            "S
             S -> 1{t=G}",
        );
        assert!(table.rules(grm.start_nidx(), grm.eof_tidx()).is_empty());
    }
}
