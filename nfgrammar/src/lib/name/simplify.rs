//! The three-stage grammar simplification pipeline.
//!
//! Stage A removes useless symbols: nonterminals that cannot derive any terminal string, then
//! everything unreachable from the start symbol. Stage B eliminates empty derivations by adding
//! every variant of a rule obtainable by omitting a non-empty subset of its nullable right-side
//! symbols (plus an explicit `start -> ε` when the start symbol is nullable). Stage C factors
//! rules with a common right-side prefix into auxiliary `$n`-suffixed nonterminals, cutting the
//! branching the parser sees per stack symbol down to the distinguishing prefix.
//!
//! The interned symbol universes are append-only throughout, so indices stay stable; dropped
//! symbols simply stop being referenced by any rule.

use indexmap::{IndexMap, IndexSet};
use vob::Vob;

use super::{
    grammar::Rule,
    parser::{GrammarSourceError, GrammarSourceErrorKind},
    symbol::{Nonterm, Sym},
    template::Expanded,
};
use crate::idxnewtype::NIdx;

/// Separator between an original nonterminal name and the counter of an auxiliary nonterminal
/// generated by prefix grouping.
pub const AUX_NONTERM_SEP: char = '$';

pub(crate) fn simplify(exp: &mut Expanded) -> Result<(), GrammarSourceError> {
    remove_useless(exp)?;
    eliminate_empty(exp);
    regroup_prefixes(exp);
    Ok(())
}

/// True per nonterminal that can derive the empty string under the given rules.
pub(crate) fn nullable_nonterms(rules: &[Rule], nonterms_len: usize) -> Vob {
    let mut nullable = Vob::from_elem(false, nonterms_len);
    let mut changed = true;
    while changed {
        changed = false;
        for r in rules.iter() {
            if nullable[usize::from(r.lhs)] {
                continue;
            }
            let all_nullable = r.rhs.iter().all(|s| match s {
                Sym::Empty => true,
                Sym::Nonterm(n) => nullable[usize::from(*n)],
                Sym::Term { .. } => false,
            });
            if all_nullable {
                nullable.set(usize::from(r.lhs), true);
                changed = true;
            }
        }
    }
    nullable
}

/// Stage A. Errors if the start symbol itself cannot derive a terminal string.
pub(crate) fn remove_useless(exp: &mut Expanded) -> Result<(), GrammarSourceError> {
    let nt_len = exp.nonterms.len();
    let mut derives = Vob::from_elem(false, nt_len);
    let mut changed = true;
    while changed {
        changed = false;
        for r in exp.rules.iter() {
            if derives[usize::from(r.lhs)] {
                continue;
            }
            let ok = r.rhs.iter().all(|s| match s {
                Sym::Term { .. } | Sym::Empty => true,
                Sym::Nonterm(n) => derives[usize::from(*n)],
            });
            if ok {
                derives.set(usize::from(r.lhs), true);
                changed = true;
            }
        }
    }
    if !derives[usize::from(exp.start)] {
        return Err(GrammarSourceError::new(
            GrammarSourceErrorKind::StartSymbolRemoved,
            exp.nonterms[usize::from(exp.start)].to_string(),
        ));
    }
    exp.rules.retain(|r| {
        derives[usize::from(r.lhs)]
            && r.rhs.iter().all(|s| match s {
                Sym::Nonterm(n) => derives[usize::from(*n)],
                _ => true,
            })
    });

    let mut reachable = Vob::from_elem(false, nt_len);
    reachable.set(usize::from(exp.start), true);
    let mut changed = true;
    while changed {
        changed = false;
        for r in exp.rules.iter() {
            if !reachable[usize::from(r.lhs)] {
                continue;
            }
            for s in r.rhs.iter() {
                if let Sym::Nonterm(n) = s {
                    if !reachable[usize::from(*n)] {
                        reachable.set(usize::from(*n), true);
                        changed = true;
                    }
                }
            }
        }
    }
    exp.rules.retain(|r| reachable[usize::from(r.lhs)]);
    Ok(())
}

/// Stage B.
pub(crate) fn eliminate_empty(exp: &mut Expanded) {
    let nullable = nullable_nonterms(&exp.rules, exp.nonterms.len());
    let is_nullable = |s: &Sym| match s {
        Sym::Empty => true,
        Sym::Nonterm(n) => nullable[usize::from(*n)],
        Sym::Term { .. } => false,
    };

    let mut out: IndexSet<Rule> = IndexSet::new();
    for r in exp.rules.iter() {
        if r.rhs == [Sym::Empty] {
            continue;
        }
        let positions: Vec<usize> = r
            .rhs
            .iter()
            .enumerate()
            .filter(|(_, s)| is_nullable(s))
            .map(|(i, _)| i)
            .collect();
        debug_assert!(positions.len() < 64);
        // Mask 0 keeps the rule as-is.
        for mask in 0u64..(1u64 << positions.len()) {
            let rhs: Vec<Sym> = r
                .rhs
                .iter()
                .enumerate()
                .filter(|(i, _)| {
                    match positions.iter().position(|p| p == i) {
                        Some(k) => mask & (1 << k) == 0,
                        None => true,
                    }
                })
                .map(|(_, s)| *s)
                .collect();
            if !rhs.is_empty() {
                out.insert(Rule { lhs: r.lhs, rhs });
            }
        }
    }
    if nullable[usize::from(exp.start)] {
        out.insert(Rule {
            lhs: exp.start,
            rhs: vec![Sym::Empty],
        });
    }
    exp.rules = out.into_iter().collect();
}

/// Stage C.
pub(crate) fn regroup_prefixes(exp: &mut Expanded) {
    let mut by_lhs: IndexMap<NIdx, IndexSet<Vec<Sym>>> = IndexMap::new();
    for r in exp.rules.drain(..) {
        by_lhs.entry(r.lhs).or_default().insert(r.rhs);
    }
    let mut out = Vec::new();
    for (lhs, rhss) in by_lhs {
        group_prefixes(
            lhs,
            rhss.into_iter().collect(),
            0,
            &mut exp.nonterms,
            &mut out,
        );
    }
    exp.rules = out;
}

fn group_prefixes(
    lhs: NIdx,
    rhss: Vec<Vec<Sym>>,
    level: usize,
    nonterms: &mut IndexSet<Nonterm>,
    out: &mut Vec<Rule>,
) {
    let mut exhausted = false;
    let mut buckets: IndexMap<Sym, Vec<Vec<Sym>>> = IndexMap::new();
    for rhs in rhss {
        if rhs.len() <= level {
            // This left side is an acceptable stopping point: sibling branches continue it.
            exhausted = true;
        } else {
            buckets.entry(rhs[level]).or_default().push(rhs);
        }
    }
    if exhausted {
        out.push(Rule {
            lhs,
            rhs: vec![Sym::Empty],
        });
    }

    let mut cnt = 0;
    for (_, bucket) in buckets {
        // Extend the shared prefix as far as every rule in the bucket agrees.
        let mut mv = 1;
        'extend: loop {
            for rhs in bucket.iter() {
                if rhs.len() <= level + mv {
                    break 'extend;
                }
            }
            let probe = bucket[0][level + mv];
            if bucket.iter().any(|rhs| rhs[level + mv] != probe) {
                break;
            }
            mv += 1;
        }

        if bucket.len() > 1 {
            let base = nonterms[usize::from(lhs)].clone();
            let aux = Nonterm::new(
                format!("{}{}{}", base.name(), AUX_NONTERM_SEP, cnt),
                base.inflect(),
            );
            cnt += 1;
            let aux_nidx = NIdx::from(nonterms.insert_full(aux).0);
            let mut rhs = bucket[0][level..level + mv].to_vec();
            rhs.push(Sym::Nonterm(aux_nidx));
            out.push(Rule { lhs, rhs });
            group_prefixes(aux_nidx, bucket, level + mv, nonterms, out);
        } else {
            out.push(Rule {
                lhs,
                rhs: bucket[0][level..].to_vec(),
            });
        }
    }
}
