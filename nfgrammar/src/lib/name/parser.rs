//! Parses line-oriented grammar source into rule templates.
//!
//! The format: `#` starts a trailing comment; the first non-empty line names the start symbol;
//! every following non-empty line is a template `LHS -> RHS`. The left side is one parameterized
//! nonterminal `Name` or `Name(p[=default], ...)`. Right-side symbols are separated by
//! whitespace and are either the empty marker `ε`, a nonterminal reference `Name` /
//! `Name(p=val, ...)`, or a terminal `cat{attr=val, ...}`; any of them may carry a leading `!`
//! meaning the derived subtree does not inflect. `$x` inside a right side refers to the left
//! side's parameter `x` and is substituted textually at expansion time.

use std::{error::Error, fmt};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use super::{
    symbol::{Attr, MatchRegex, Nonterm, TermCat, Terminal, TerminalError, WordKind},
    template::{RuleTemplate, TemplateLhs, TemplateSym},
};
use crate::morph::{Case, Flag, GNumber, Gender, Note};

/// The empty-string marker as written in grammar source.
pub const EMPTY_STR: &str = "ε";
/// The marker prefix switching off inflection for a symbol's subtree.
pub const NO_INFLECT_SIGN: char = '!';

lazy_static! {
    static ref RE_NONTERM: Regex = Regex::new(r"^([^\s()]+)\s*(?:\(([^()]+)\))?$").unwrap();
    static ref RE_TERM: Regex = Regex::new(r"^(.+?)(?:\{(.*)\})?$").unwrap();
    static ref RE_VARIABLE: Regex = Regex::new(r"\$([A-Za-z]+)").unwrap();
}

/// The `$x` variable names referenced in a piece of right-side source.
pub(crate) fn variables(s: &str) -> Vec<String> {
    RE_VARIABLE
        .captures_iter(s)
        .map(|c| c[1].to_owned())
        .collect()
}

pub(crate) fn has_variable(s: &str) -> bool {
    RE_VARIABLE.is_match(s)
}

/// Replaces every `$x` in `s` with its binding. Unbound variables are an error; the caller
/// attaches the offending line.
pub(crate) fn substitute_vars(
    s: &str,
    bindings: &IndexMap<String, String>,
) -> Result<String, GrammarSourceError> {
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for c in RE_VARIABLE.captures_iter(s) {
        let m = c.get(0).ok_or_else(|| {
            GrammarSourceError::new(GrammarSourceErrorKind::UnknownVariable, s)
        })?;
        let val = bindings.get(&c[1]).ok_or_else(|| {
            GrammarSourceError::new(GrammarSourceErrorKind::UnknownVariable, s)
        })?;
        out.push_str(&s[last..m.start()]);
        out.push_str(val);
        last = m.end();
    }
    out.push_str(&s[last..]);
    Ok(out)
}

/// The various different possible grammar-source errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum GrammarSourceErrorKind {
    InvalidRuleSyntax,
    InvalidNontermSyntax,
    InvalidTerminalSyntax,
    InvalidAttribute,
    DuplicateAttribute,
    MultipleVoluntaryAttributes,
    VoluntaryOnNonFilteringAttribute,
    UnknownAttributeKey,
    InvalidRegex,
    InvalidPriority,
    VariableOnLeftSide,
    UnknownVariable,
    ParamWithoutValue,
    SameNameDifferentParams,
    NoRuleForNonterm,
    NoStartSymbol,
    NoRules,
    StartSymbolRemoved,
}

/// Any error from the grammar source/build subsystem. The `line` is set for errors detected
/// while reading source lines; errors detected during template expansion carry the offending
/// snippet only.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GrammarSourceError {
    pub kind: GrammarSourceErrorKind,
    pub line: Option<usize>,
    pub snippet: String,
}

impl GrammarSourceError {
    pub(crate) fn new<S: Into<String>>(kind: GrammarSourceErrorKind, snippet: S) -> Self {
        GrammarSourceError {
            kind,
            line: None,
            snippet: snippet.into(),
        }
    }

    pub(crate) fn at_line<S: Into<String>>(
        kind: GrammarSourceErrorKind,
        line: usize,
        snippet: S,
    ) -> Self {
        GrammarSourceError {
            kind,
            line: Some(line),
            snippet: snippet.into(),
        }
    }
}

impl Error for GrammarSourceError {}

impl fmt::Display for GrammarSourceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self.kind {
            GrammarSourceErrorKind::InvalidRuleSyntax => "Invalid rule syntax",
            GrammarSourceErrorKind::InvalidNontermSyntax => "Invalid nonterminal syntax",
            GrammarSourceErrorKind::InvalidTerminalSyntax => "Invalid terminal syntax",
            GrammarSourceErrorKind::InvalidAttribute => "Invalid attribute",
            GrammarSourceErrorKind::DuplicateAttribute => "Attribute given more than once",
            GrammarSourceErrorKind::MultipleVoluntaryAttributes => {
                "More than one voluntary attribute"
            }
            GrammarSourceErrorKind::VoluntaryOnNonFilteringAttribute => {
                "'?' is only allowed on filtering attributes"
            }
            GrammarSourceErrorKind::UnknownAttributeKey => "Unknown attribute key",
            GrammarSourceErrorKind::InvalidRegex => "Invalid regular expression",
            GrammarSourceErrorKind::InvalidPriority => "Invalid priority value",
            GrammarSourceErrorKind::VariableOnLeftSide => {
                "Variables must not appear on a left side"
            }
            GrammarSourceErrorKind::UnknownVariable => {
                "Variable does not name a left-side parameter"
            }
            GrammarSourceErrorKind::ParamWithoutValue => "Nonterminal parameter has no value",
            GrammarSourceErrorKind::SameNameDifferentParams => {
                "Same-name left sides must declare identical parameters"
            }
            GrammarSourceErrorKind::NoRuleForNonterm => {
                "Nonterminal does not appear on any left side"
            }
            GrammarSourceErrorKind::NoStartSymbol => "Grammar has no start symbol",
            GrammarSourceErrorKind::NoRules => "Grammar has no rules",
            GrammarSourceErrorKind::StartSymbolRemoved => {
                "Start symbol derives no terminal string"
            }
        };
        match self.line {
            Some(line) => write!(f, "{} at line {}: '{}'", s, line, self.snippet),
            None => write!(f, "{}: '{}'", s, self.snippet),
        }
    }
}

impl From<TerminalError> for GrammarSourceErrorKind {
    fn from(e: TerminalError) -> Self {
        match e {
            TerminalError::DuplicateAttribute(_) => GrammarSourceErrorKind::DuplicateAttribute,
            TerminalError::MultipleVoluntaryAttributes => {
                GrammarSourceErrorKind::MultipleVoluntaryAttributes
            }
        }
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    }
    .trim()
}

/// Parses a whole grammar source into the start symbol and its rule templates.
pub(crate) fn parse_source(src: &str) -> Result<(Nonterm, Vec<RuleTemplate>), GrammarSourceError> {
    let mut lines = src.lines().enumerate().map(|(i, l)| (i + 1, strip_comment(l)));
    let start = loop {
        match lines.next() {
            Some((_, "")) => continue,
            Some((line, s)) => break parse_start_symbol(line, s)?,
            None => {
                return Err(GrammarSourceError::new(
                    GrammarSourceErrorKind::NoStartSymbol,
                    "",
                ))
            }
        }
    };
    let mut templates = Vec::new();
    for (line, s) in lines {
        if s.is_empty() {
            continue;
        }
        templates.push(parse_template(line, s)?);
    }
    Ok((start, templates))
}

fn parse_start_symbol(line: usize, s: &str) -> Result<Nonterm, GrammarSourceError> {
    let (name, inflect) = match s.strip_prefix(NO_INFLECT_SIGN) {
        Some(rest) => (rest, false),
        None => (s, true),
    };
    match RE_NONTERM.captures(name) {
        // The start symbol is written bare; its parameters come from its defining left sides.
        Some(c) if c.get(2).is_none() && !name.is_empty() => Ok(Nonterm::new(name, inflect)),
        _ => Err(GrammarSourceError::at_line(
            GrammarSourceErrorKind::NoStartSymbol,
            line,
            s,
        )),
    }
}

fn parse_template(line: usize, s: &str) -> Result<RuleTemplate, GrammarSourceError> {
    let (lhs_src, rhs_src) = s.split_once("->").ok_or_else(|| {
        GrammarSourceError::at_line(GrammarSourceErrorKind::InvalidRuleSyntax, line, s)
    })?;
    let (lhs_src, rhs_src) = (lhs_src.trim(), rhs_src.trim());

    if has_variable(lhs_src) {
        return Err(GrammarSourceError::at_line(
            GrammarSourceErrorKind::VariableOnLeftSide,
            line,
            s,
        ));
    }
    let lhs = parse_lhs(line, lhs_src)?;
    // A terminal category code on a left side is a malformed rule.
    if TermCat::from_code(lhs.key.name()).is_some() || lhs.key.name() == EMPTY_STR {
        return Err(GrammarSourceError::at_line(
            GrammarSourceErrorKind::InvalidRuleSyntax,
            line,
            s,
        ));
    }

    let mut rhs = Vec::new();
    for sym_src in split_syms(rhs_src) {
        rhs.push(parse_template_sym(line, sym_src)?);
    }
    if rhs.is_empty() {
        return Err(GrammarSourceError::at_line(
            GrammarSourceErrorKind::InvalidRuleSyntax,
            line,
            s,
        ));
    }

    for v in variables(rhs_src) {
        if !lhs.params.contains_key(&v) {
            return Err(GrammarSourceError::at_line(
                GrammarSourceErrorKind::UnknownVariable,
                line,
                s,
            ));
        }
    }

    Ok(RuleTemplate::new(lhs, rhs, line, s.to_owned()))
}

/// Splits a right side into symbol sources on whitespace, except inside a terminal's `{...}`
/// attribute block, a nonterminal's `(...)` parameter list, or a quoted value (where spaces,
/// commas and braces are ordinary characters).
fn split_syms(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = None;
    let mut bracketed = false;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' if bracketed => quoted = !quoted,
            '{' | '(' if !quoted => bracketed = true,
            '}' | ')' if !quoted => bracketed = false,
            c if c.is_whitespace() && !bracketed && !quoted => {
                if let Some(st) = start.take() {
                    out.push(&s[st..i]);
                }
                continue;
            }
            _ => (),
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(st) = start {
        out.push(&s[st..]);
    }
    out
}

fn parse_lhs(line: usize, s: &str) -> Result<TemplateLhs, GrammarSourceError> {
    let (name_src, inflect) = match s.strip_prefix(NO_INFLECT_SIGN) {
        Some(rest) => (rest, false),
        None => (s, true),
    };
    let caps = RE_NONTERM.captures(name_src).ok_or_else(|| {
        GrammarSourceError::at_line(GrammarSourceErrorKind::InvalidNontermSyntax, line, s)
    })?;
    let name = &caps[1];
    let mut params = IndexMap::new();
    if let Some(pl) = caps.get(2) {
        for p in pl.as_str().split(',') {
            let mut it = p.splitn(2, '=');
            let pname = it.next().unwrap_or("").trim().to_owned();
            let pval = it.next().map(|v| v.trim().to_owned());
            if pname.is_empty()
                || pname.starts_with('$')
                || params.insert(pname, pval).is_some()
            {
                return Err(GrammarSourceError::at_line(
                    GrammarSourceErrorKind::InvalidNontermSyntax,
                    line,
                    s,
                ));
            }
        }
    }
    Ok(TemplateLhs {
        key: Nonterm::new(name, inflect),
        params,
    })
}

fn parse_template_sym(line: usize, s: &str) -> Result<TemplateSym, GrammarSourceError> {
    if s == EMPTY_STR {
        return Ok(TemplateSym::Empty);
    }
    let (body, inflect) = match s.strip_prefix(NO_INFLECT_SIGN) {
        Some(rest) => (rest, false),
        None => (s, true),
    };
    if body.is_empty() {
        return Err(GrammarSourceError::at_line(
            GrammarSourceErrorKind::InvalidRuleSyntax,
            line,
            s,
        ));
    }
    let head = match RE_TERM.captures(body) {
        Some(c) => c.get(1).map(|m| m.as_str().to_owned()).unwrap_or_default(),
        None => String::new(),
    };
    if TermCat::from_code(&head).is_some() {
        // Attribute values may still hold variables; the terminal is fully parsed only after
        // substitution, at expansion time.
        return Ok(TemplateSym::Term {
            src: body.to_owned(),
            inflect,
        });
    }

    // A nonterminal reference. Every parameter it mentions must come with a value.
    let caps = RE_NONTERM.captures(body).ok_or_else(|| {
        GrammarSourceError::at_line(GrammarSourceErrorKind::InvalidNontermSyntax, line, s)
    })?;
    let name = &caps[1];
    let mut params = IndexMap::new();
    if let Some(pl) = caps.get(2) {
        for p in pl.as_str().split(',') {
            match p.split_once('=') {
                Some((pname, pval)) => {
                    let pname = pname.trim().to_owned();
                    if pname.is_empty()
                        || pname.starts_with('$')
                        || params.insert(pname, pval.trim().to_owned()).is_some()
                    {
                        return Err(GrammarSourceError::at_line(
                            GrammarSourceErrorKind::InvalidNontermSyntax,
                            line,
                            s,
                        ));
                    }
                }
                None => {
                    return Err(GrammarSourceError::at_line(
                        GrammarSourceErrorKind::ParamWithoutValue,
                        line,
                        s,
                    ))
                }
            }
        }
    }
    Ok(TemplateSym::Nonterm {
        key: Nonterm::new(name, inflect),
        params,
    })
}

/// Parses a variable-free terminal source string (no `!` marker) into a [`Terminal`].
pub(crate) fn parse_terminal(s: &str) -> Result<Terminal, GrammarSourceError> {
    let caps = RE_TERM.captures(s).ok_or_else(|| {
        GrammarSourceError::new(GrammarSourceErrorKind::InvalidTerminalSyntax, s)
    })?;
    let cat = caps
        .get(1)
        .and_then(|m| TermCat::from_code(m.as_str()))
        .ok_or_else(|| {
            GrammarSourceError::new(GrammarSourceErrorKind::InvalidTerminalSyntax, s)
        })?;
    let mut attrs = Vec::new();
    if let Some(body) = caps.get(2) {
        for a in split_attrs(body.as_str()) {
            attrs.push(parse_attr(&a)?);
        }
    }
    Terminal::new(cat, attrs).map_err(|e| GrammarSourceError::new(e.into(), s))
}

/// Splits `a=b, c="d,e", ...` on commas, honouring double quotes and backslash escapes inside
/// them.
fn split_attrs(s: &str) -> Vec<String> {
    enum St {
        Read,
        Quoted,
        Escaped,
    }
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut st = St::Read;
    for c in s.chars() {
        match st {
            St::Read => {
                if c == ',' {
                    if !cur.trim().is_empty() {
                        out.push(std::mem::take(&mut cur));
                    } else {
                        cur.clear();
                    }
                } else {
                    if c == '"' {
                        st = St::Quoted;
                    }
                    cur.push(c);
                }
            }
            St::Quoted => {
                match c {
                    '"' => st = St::Read,
                    '\\' => st = St::Escaped,
                    _ => (),
                }
                cur.push(c);
            }
            St::Escaped => {
                if c == '"' {
                    cur.pop();
                }
                cur.push(c);
                st = St::Quoted;
            }
        }
    }
    if !cur.trim().is_empty() {
        out.push(cur);
    }
    out
}

fn parse_attr(s: &str) -> Result<Attr, GrammarSourceError> {
    let (key, val) = s.trim().split_once('=').ok_or_else(|| {
        GrammarSourceError::new(GrammarSourceErrorKind::InvalidAttribute, s)
    })?;
    let (key, val) = (key.trim(), val.trim());
    // The voluntary marker is written after the key ("g?=F") or after the value ("g=F?").
    let (key, key_vol) = match key.strip_suffix('?') {
        Some(k) => (k, true),
        None => (key, false),
    };
    let (val, voluntary) = match val.strip_suffix('?') {
        Some(v) => (v, true),
        None => (val, key_vol),
    };
    let invalid = || GrammarSourceError::new(GrammarSourceErrorKind::InvalidAttribute, s);
    let attr = match key {
        "g" => Attr::Gender {
            val: Gender::from_code(val).ok_or_else(invalid)?,
            voluntary,
        },
        "n" => Attr::Number {
            val: GNumber::from_code(val).ok_or_else(invalid)?,
            voluntary,
        },
        "c" => Attr::Case {
            val: Case::from_code(val).ok_or_else(invalid)?,
            voluntary,
        },
        "note" => Attr::Note {
            val: Note::from_code(val).ok_or_else(invalid)?,
            voluntary,
        },
        "f" | "t" | "r" | "p" => {
            if voluntary {
                return Err(GrammarSourceError::new(
                    GrammarSourceErrorKind::VoluntaryOnNonFilteringAttribute,
                    s,
                ));
            }
            match key {
                "f" => {
                    let body = unquote(val).unwrap_or(val);
                    let mut flags = Vec::new();
                    for f in body.split(',') {
                        flags.push(Flag::from_code(f.trim()).ok_or_else(invalid)?);
                    }
                    Attr::Flags(flags)
                }
                "t" => Attr::WordKind(WordKind::from_code(val).ok_or_else(invalid)?),
                "r" => {
                    let body = unquote(val).ok_or_else(invalid)?;
                    let re = MatchRegex::new(&unescape_quotes(body)).map_err(|_| {
                        GrammarSourceError::new(GrammarSourceErrorKind::InvalidRegex, s)
                    })?;
                    Attr::MatchRegex(re)
                }
                _ => {
                    let p = val.parse::<u32>().map_err(|_| {
                        GrammarSourceError::new(GrammarSourceErrorKind::InvalidPriority, s)
                    })?;
                    Attr::Priority(p)
                }
            }
        }
        _ => {
            return Err(GrammarSourceError::new(
                GrammarSourceErrorKind::UnknownAttributeKey,
                s,
            ))
        }
    };
    Ok(attr)
}

fn unquote(s: &str) -> Option<&str> {
    s.strip_prefix('"').and_then(|x| x.strip_suffix('"'))
}

fn unescape_quotes(s: &str) -> String {
    s.replace("\\\"", "\"")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        morph::{Gender, MorphValue},
        name::symbol::AttrKind,
    };

    #[test]
    fn test_parse_source_smoke() {
        let src = "
            # person names
            S
            S -> 1{t=G} PRIJMENI # given name, then surname
            PRIJMENI -> 1{t=S}
        ";
        let (start, templates) = parse_source(src).unwrap();
        assert_eq!(start.name(), "S");
        assert!(start.inflect());
        assert_eq!(templates.len(), 2);
    }

    #[test]
    fn test_missing_arrow() {
        let src = "S\nS 1{t=G}";
        match parse_source(src) {
            Err(e) => {
                assert_eq!(e.kind, GrammarSourceErrorKind::InvalidRuleSyntax);
                assert_eq!(e.line, Some(2));
            }
            Ok(_) => panic!(),
        }
    }

    #[test]
    fn test_no_start_symbol() {
        match parse_source("  # only a comment\n") {
            Err(e) => assert_eq!(e.kind, GrammarSourceErrorKind::NoStartSymbol),
            Ok(_) => panic!(),
        }
    }

    #[test]
    fn test_lhs_variables_rejected() {
        match parse_source("S\n$x -> 1") {
            Err(e) => assert_eq!(e.kind, GrammarSourceErrorKind::VariableOnLeftSide),
            Ok(_) => panic!(),
        }
    }

    #[test]
    fn test_rhs_variable_must_be_param() {
        match parse_source("S\nS(g=M) -> 1{g=$q}") {
            Err(e) => assert_eq!(e.kind, GrammarSourceErrorKind::UnknownVariable),
            Ok(_) => panic!(),
        }
    }

    #[test]
    fn test_rhs_nonterm_param_needs_value() {
        match parse_source("S\nS -> N(g)") {
            Err(e) => assert_eq!(e.kind, GrammarSourceErrorKind::ParamWithoutValue),
            Ok(_) => panic!(),
        }
    }

    #[test]
    fn test_no_inflect_markers() {
        let (_, templates) = parse_source("S\n!S -> !1{t=G} !N ε").unwrap();
        let t = &templates[0];
        assert!(!t.lhs.key.inflect());
        match &t.rhs[0] {
            TemplateSym::Term { src, inflect } => {
                assert_eq!(src, "1{t=G}");
                assert!(!inflect);
            }
            r => panic!("{:?}", r),
        }
        match &t.rhs[1] {
            TemplateSym::Nonterm { key, .. } => {
                assert_eq!(key.name(), "N");
                assert!(!key.inflect());
            }
            r => panic!("{:?}", r),
        }
        assert_eq!(t.rhs[2], TemplateSym::Empty);
    }

    #[test]
    fn test_rhs_split_honours_braces_and_quotes() {
        // Spaces inside an attribute block or a parameter list must not start a new symbol.
        let (_, templates) =
            parse_source("S\nS(a=1) -> 1{c=$a, n=S} N(g=M, c=2) !1{r=\"a b\", t=S}").unwrap();
        let t = &templates[0];
        assert_eq!(t.rhs.len(), 3);
        match &t.rhs[0] {
            TemplateSym::Term { src, inflect } => {
                assert_eq!(src, "1{c=$a, n=S}");
                assert!(*inflect);
            }
            r => panic!("{:?}", r),
        }
        match &t.rhs[1] {
            TemplateSym::Nonterm { key, params } => {
                assert_eq!(key.name(), "N");
                assert_eq!(params.len(), 2);
            }
            r => panic!("{:?}", r),
        }
        match &t.rhs[2] {
            TemplateSym::Term { src, inflect } => {
                assert_eq!(src, "1{r=\"a b\", t=S}");
                assert!(!*inflect);
            }
            r => panic!("{:?}", r),
        }
    }

    #[test]
    fn test_parse_terminal_attrs() {
        let t = parse_terminal("1{g=F?, c=1, t=S, p=2}").unwrap();
        assert_eq!(t.cat(), TermCat::Noun);
        assert_eq!(t.priority(), 2);
        assert_eq!(t.word_kind(), WordKind::Surname);
        assert!(t.has_voluntary());
        assert_eq!(t.filter_values(false), vec![MorphValue::Case(Case::Nominative)]);
    }

    #[test]
    fn test_quoted_regex_with_comma() {
        let t = parse_terminal(r#"ia{r="^[A-Z]\.$", t=I}"#).unwrap();
        let re = t.match_regex().unwrap();
        assert!(re.is_match("J."));
        assert!(!re.is_match("Jan"));

        // A comma inside quotes must not split the attribute.
        let t = parse_terminal(r#"1{r="^(a|b){1,2}$"}"#).unwrap();
        assert!(t.match_regex().unwrap().is_match("ab"));
    }

    #[test]
    fn test_escaped_quote_in_regex() {
        let t = parse_terminal(r#"1{r="^\"$"}"#).unwrap();
        assert!(t.match_regex().unwrap().is_match("\""));
    }

    #[test]
    fn test_attr_errors() {
        match parse_terminal("1{g=F, g=M}") {
            Err(e) => assert_eq!(e.kind, GrammarSourceErrorKind::DuplicateAttribute),
            Ok(_) => panic!(),
        }
        match parse_terminal("1{g=F?, c=1?}") {
            Err(e) => assert_eq!(e.kind, GrammarSourceErrorKind::MultipleVoluntaryAttributes),
            Ok(_) => panic!(),
        }
        match parse_terminal("1{p?=1}") {
            Err(e) => {
                assert_eq!(e.kind, GrammarSourceErrorKind::VoluntaryOnNonFilteringAttribute)
            }
            Ok(_) => panic!(),
        }
        match parse_terminal("1{z=1}") {
            Err(e) => assert_eq!(e.kind, GrammarSourceErrorKind::UnknownAttributeKey),
            Ok(_) => panic!(),
        }
        match parse_terminal("1{p=-1}") {
            Err(e) => assert_eq!(e.kind, GrammarSourceErrorKind::InvalidPriority),
            Ok(_) => panic!(),
        }
        match parse_terminal("1{r=\"[\"}") {
            Err(e) => assert_eq!(e.kind, GrammarSourceErrorKind::InvalidRegex),
            Ok(_) => panic!(),
        }
        match parse_terminal("q{}") {
            Err(e) => assert_eq!(e.kind, GrammarSourceErrorKind::InvalidTerminalSyntax),
            Ok(_) => panic!(),
        }
    }

    #[test]
    fn test_flags_attr() {
        let t = parse_terminal(r#"1{f="GW"}"#).unwrap();
        assert_eq!(t.flags(), &[Flag::GeneralWord]);
        let t = parse_terminal("1{f=NGW}").unwrap();
        assert_eq!(t.flags(), &[Flag::NotGeneralWord]);
    }

    #[test]
    fn test_variables_found() {
        assert_eq!(variables("1{g=$gen} N(x=$pad)"), vec!["gen", "pad"]);
        assert!(!has_variable("1{g=M}"));
    }

    #[test]
    fn test_substitute_vars() {
        let mut b = IndexMap::new();
        b.insert("g".to_owned(), "M".to_owned());
        b.insert("gen".to_owned(), "F".to_owned());
        // The longer variable name must not be clobbered by its prefix.
        assert_eq!(substitute_vars("1{g=$gen, c=$g}", &b).unwrap(), "1{g=F, c=M}");
        match substitute_vars("1{g=$q}", &b) {
            Err(e) => assert_eq!(e.kind, GrammarSourceErrorKind::UnknownVariable),
            Ok(_) => panic!(),
        }
    }

    #[test]
    fn test_attr_kind_of_gender() {
        let t = parse_terminal("1{g=F}").unwrap();
        assert!(t
            .attrs()
            .iter()
            .any(|a| a.kind() == AttrKind::Gender
                && a.filter_value() == Some(MorphValue::Gender(Gender::Feminine))));
    }
}
