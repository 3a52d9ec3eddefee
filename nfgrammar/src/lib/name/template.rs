//! Rule templates and their expansion into concrete rules.
//!
//! Expansion runs in two passes, as the source format requires. First, every nonterminal
//! reference on a right side inherits the default values its defining left side declares for
//! parameters the reference does not mention. Second, concrete rules are generated recursively
//! from the start symbol: parameter bindings are substituted textually into terminal attribute
//! values and into child parameter bindings, left sides are flattened to `NAME(p1=v1,p2=v2)`
//! names (parameters sorted), and an already-generated rule stops the recursion, which both
//! deduplicates and guards against template cycles.

use indexmap::{IndexMap, IndexSet};

use super::{
    grammar::Rule,
    parser::{self, GrammarSourceError, GrammarSourceErrorKind},
    symbol::{Nonterm, Sym, Terminal},
};
use crate::idxnewtype::NIdx;

/// A parameterized left side: the raw nonterminal (name plus no-inflect marker) and its
/// parameter declarations, each with an optional default.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TemplateLhs {
    pub(crate) key: Nonterm,
    pub(crate) params: IndexMap<String, Option<String>>,
}

/// One right-side element of a template.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum TemplateSym {
    /// A terminal kept as source text; attribute values may still contain `$x` variables.
    Term { src: String, inflect: bool },
    /// A nonterminal reference; every parameter it mentions carries a value (possibly a
    /// variable), the rest are filled from the definition's defaults before expansion.
    Nonterm {
        key: Nonterm,
        params: IndexMap<String, String>,
    },
    Empty,
}

/// One `LHS -> RHS` line of grammar source, not yet instantiated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct RuleTemplate {
    pub(crate) lhs: TemplateLhs,
    pub(crate) rhs: Vec<TemplateSym>,
    pub(crate) line: usize,
    pub(crate) src: String,
}

impl RuleTemplate {
    pub(crate) fn new(lhs: TemplateLhs, rhs: Vec<TemplateSym>, line: usize, src: String) -> Self {
        RuleTemplate { lhs, rhs, line, src }
    }
}

/// The outcome of template expansion: interned symbol universes and deduplicated concrete
/// rules. The end-of-input terminal always sits at terminal index 0.
pub(crate) struct Expanded {
    pub(crate) terms: IndexSet<Terminal>,
    pub(crate) nonterms: IndexSet<Nonterm>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) start: NIdx,
}

struct Group {
    params: IndexMap<String, Option<String>>,
    templates: Vec<RuleTemplate>,
}

/// All templates of one grammar, grouped by left side, with defaults propagated.
pub(crate) struct TemplateSet {
    start: Nonterm,
    groups: IndexMap<Nonterm, Group>,
}

impl TemplateSet {
    pub(crate) fn new(
        start: Nonterm,
        templates: Vec<RuleTemplate>,
    ) -> Result<TemplateSet, GrammarSourceError> {
        let mut groups: IndexMap<Nonterm, Group> = IndexMap::new();
        for t in templates {
            match groups.get_mut(&t.lhs.key) {
                Some(g) => {
                    // Same-name left sides must agree on parameters, defaults included.
                    if g.params != t.lhs.params {
                        return Err(GrammarSourceError::at_line(
                            GrammarSourceErrorKind::SameNameDifferentParams,
                            t.line,
                            t.src,
                        ));
                    }
                    g.templates.push(t);
                }
                None => {
                    let params = t.lhs.params.clone();
                    let key = t.lhs.key.clone();
                    groups.insert(
                        key,
                        Group {
                            params,
                            templates: vec![t],
                        },
                    );
                }
            }
        }

        // Pass 1: fill in defaults on right-side references. Signatures are copied out first so
        // the templates can be rewritten in place.
        let signatures: IndexMap<Nonterm, IndexMap<String, Option<String>>> = groups
            .iter()
            .map(|(k, g)| (k.clone(), g.params.clone()))
            .collect();
        for g in groups.values_mut() {
            for t in g.templates.iter_mut() {
                for sym in t.rhs.iter_mut() {
                    if let TemplateSym::Nonterm { key, params } = sym {
                        let sig = signatures.get(key).ok_or_else(|| {
                            GrammarSourceError::at_line(
                                GrammarSourceErrorKind::NoRuleForNonterm,
                                t.line,
                                key.to_string(),
                            )
                        })?;
                        for (pname, pdefault) in sig.iter() {
                            if let Some(d) = pdefault {
                                if !params.contains_key(pname) {
                                    params.insert(pname.clone(), d.clone());
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(TemplateSet { start, groups })
    }

    /// Pass 2: recursive instantiation from the start symbol. The start symbol's own bindings
    /// are its declared defaults; a start parameter without a default cannot be resolved.
    pub(crate) fn expand(&self) -> Result<Expanded, GrammarSourceError> {
        let start_group = self.groups.get(&self.start).ok_or_else(|| {
            GrammarSourceError::new(
                GrammarSourceErrorKind::NoRuleForNonterm,
                self.start.to_string(),
            )
        })?;
        let mut bindings = IndexMap::new();
        for (pname, pdefault) in start_group.params.iter() {
            match pdefault {
                Some(d) => {
                    bindings.insert(pname.clone(), d.clone());
                }
                None => {
                    return Err(GrammarSourceError::new(
                        GrammarSourceErrorKind::ParamWithoutValue,
                        format!("{}({})", self.start, pname),
                    ))
                }
            }
        }

        let mut terms = IndexSet::new();
        terms.insert(Terminal::eof());
        let mut nonterms = IndexSet::new();
        let mut rules = IndexSet::new();

        let start = self.generate(&self.start, &bindings, &mut terms, &mut nonterms, &mut rules)?;

        if rules.is_empty() {
            return Err(GrammarSourceError::new(GrammarSourceErrorKind::NoRules, ""));
        }
        Ok(Expanded {
            terms,
            nonterms,
            rules: rules.into_iter().collect(),
            start,
        })
    }

    fn generate(
        &self,
        key: &Nonterm,
        bindings: &IndexMap<String, String>,
        terms: &mut IndexSet<Terminal>,
        nonterms: &mut IndexSet<Nonterm>,
        rules: &mut IndexSet<Rule>,
    ) -> Result<NIdx, GrammarSourceError> {
        let group = self.groups.get(key).ok_or_else(|| {
            GrammarSourceError::new(GrammarSourceErrorKind::NoRuleForNonterm, key.to_string())
        })?;
        let lhs = Nonterm::new(flatten_name(key.name(), bindings), key.inflect());
        let lhs_nidx = NIdx::from(nonterms.insert_full(lhs).0);

        for t in group.templates.iter() {
            let mut rhs = Vec::with_capacity(t.rhs.len());
            let mut children = Vec::new();
            for sym in t.rhs.iter() {
                match sym {
                    TemplateSym::Empty => rhs.push(Sym::Empty),
                    TemplateSym::Term { src, inflect } => {
                        let concrete = parser::substitute_vars(src, bindings)
                            .and_then(|s| parser::parse_terminal(&s))
                            .map_err(|e| at_template(e, t))?;
                        let tidx = terms.insert_full(concrete).0.into();
                        rhs.push(Sym::Term {
                            tidx,
                            inflect: *inflect,
                        });
                    }
                    TemplateSym::Nonterm {
                        key: child,
                        params,
                    } => {
                        let sig = &self
                            .groups
                            .get(child)
                            .ok_or_else(|| {
                                GrammarSourceError::at_line(
                                    GrammarSourceErrorKind::NoRuleForNonterm,
                                    t.line,
                                    child.to_string(),
                                )
                            })?
                            .params;
                        let mut cb = IndexMap::new();
                        for (pname, pdefault) in sig.iter() {
                            let val = match params.get(pname) {
                                Some(v) => Some(
                                    parser::substitute_vars(v, bindings)
                                        .map_err(|e| at_template(e, t))?,
                                ),
                                None => pdefault.clone(),
                            };
                            match val {
                                Some(v) => {
                                    cb.insert(pname.clone(), v);
                                }
                                None => {
                                    return Err(GrammarSourceError::at_line(
                                        GrammarSourceErrorKind::ParamWithoutValue,
                                        t.line,
                                        format!("{}({})", child, pname),
                                    ))
                                }
                            }
                        }
                        let concrete =
                            Nonterm::new(flatten_name(child.name(), &cb), child.inflect());
                        let nidx = NIdx::from(nonterms.insert_full(concrete).0);
                        rhs.push(Sym::Nonterm(nidx));
                        children.push((child, cb));
                    }
                }
            }
            // A rule seen before means this instantiation was already walked: stop here, both
            // as deduplication and as the cycle guard.
            if rules.insert(Rule { lhs: lhs_nidx, rhs }) {
                for (child, cb) in children {
                    self.generate(child, &cb, terms, nonterms, rules)?;
                }
            }
        }
        Ok(lhs_nidx)
    }
}

fn at_template(mut e: GrammarSourceError, t: &RuleTemplate) -> GrammarSourceError {
    if e.line.is_none() {
        e.line = Some(t.line);
    }
    e
}

/// `NAME(p1=v1,p2=v2)` with parameters sorted by name; a parameterless nonterminal stays bare.
fn flatten_name(name: &str, bindings: &IndexMap<String, String>) -> String {
    if bindings.is_empty() {
        return name.to_owned();
    }
    let mut pairs: Vec<_> = bindings.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    let body = pairs
        .into_iter()
        .map(|(p, v)| format!("{}={}", p, v))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}({})", name, body)
}
