//! Rebuilding the per-word inflection mask from an accepted derivation.

use std::{error::Error, fmt};

use nfgrammar::{
    name::{NameGrammar, Sym},
    RIdx,
};

/// The rule sequence does not form a derivation of the grammar's start symbol.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidDerivation;

impl fmt::Display for InvalidDerivation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "rule sequence is not a derivation of the start symbol")
    }
}

impl Error for InvalidDerivation {}

/// Walks a derivation's rules in application order and produces one flag per terminal
/// position: whether that word inflects. The flag starts out as the start symbol's own, is
/// switched off by any subtree whose symbol carries the no-inflect marker, and never switches
/// back on.
pub fn morph_mask(grm: &NameGrammar, rules: &[RIdx]) -> Result<Vec<bool>, InvalidDerivation> {
    let mut mask = Vec::new();
    let mut stack = vec![(Sym::Nonterm(grm.start_nidx()), grm.start_inflect())];
    let mut ri = rules.iter();
    while let Some((sym, inflect)) = stack.pop() {
        match sym {
            Sym::Empty => (),
            Sym::Term { inflect: occ, .. } => mask.push(inflect && occ),
            Sym::Nonterm(nidx) => {
                let ridx = *ri.next().ok_or(InvalidDerivation)?;
                let r = grm.rule(ridx);
                if r.lhs != nidx {
                    return Err(InvalidDerivation);
                }
                for sym in r.rhs.iter().rev() {
                    let flag = match sym {
                        Sym::Nonterm(n) => inflect && grm.nonterm(*n).inflect(),
                        _ => inflect,
                    };
                    stack.push((*sym, flag));
                }
            }
        }
    }
    if ri.next().is_some() {
        return Err(InvalidDerivation);
    }
    Ok(mask)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{analyze_tokens, parser_parts, TestOracle};
    use crate::parser::NameParserBuilder;

    #[test]
    fn test_mask_matches_analysed_inflects() {
        let mut o = TestOracle::new();
        o.add_tags("Jan", &["k1gMnSc1"]);
        o.add_tags("Novák", &["k1gMnSc1"]);
        let (grm, table) = parser_parts(
            "S
             S -> 1{t=G} !PRIJMENI
             !PRIJMENI -> 1{t=S}",
        );
        let mut p = NameParserBuilder::new(&grm, &table, &o).build();
        let anas = p.analyse(&analyze_tokens(&["Jan", "Novák"])).unwrap();
        assert_eq!(anas.len(), 1);
        let mask = morph_mask(&grm, &anas[0].rules).unwrap();
        assert_eq!(mask, vec![true, false]);
        let flags: Vec<bool> = anas[0].tokens.iter().map(|t| t.inflect).collect();
        assert_eq!(mask, flags);
    }

    #[test]
    fn test_mask_rejects_wrong_sequence() {
        let (grm, _) = parser_parts(
            "S
             S -> 1{t=G}",
        );
        assert_eq!(morph_mask(&grm, &[]), Err(InvalidDerivation));
    }
}
