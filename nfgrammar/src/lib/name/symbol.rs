//! The symbol model: terminal categories, terminal attributes, nonterminals and the symbols
//! that appear on rule right-hand sides.
//!
//! Two terminals are equal iff their category and attribute set are equal; whether a particular
//! occurrence of a terminal inflects is a property of the occurrence ([`Sym::Term`]), not of the
//! terminal itself. Nonterminals are compared by flattened name *and* the no-inflect marker, so
//! `!N` and `N` are distinct symbols with their own rule sets.

use std::{error::Error, fmt, hash::Hash, hash::Hasher};

use regex::Regex;

use crate::{
    idxnewtype::{NIdx, TIdx},
    morph::{Case, Flag, GNumber, Gender, MorphValue, Note, Pos},
};

/// Terminal categories as written in grammar source. Most mirror a part of speech; the rest are
/// lexer-resolved classes matched by category equality alone.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TermCat {
    /// End of input. Never written in grammar source.
    Eof,
    Noun,
    Adjective,
    Pronoun,
    Numeral,
    Verb,
    Adverb,
    Preposition,
    PrepositionM,
    Conjunction,
    Particle,
    Interjection,
    Abbreviation,
    DegreeTitle,
    RomanNumber,
    Number,
    InitialAbbreviation,
    /// Wildcard: matches a token of any class.
    Any,
}

impl TermCat {
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "1" => Some(TermCat::Noun),
            "2" => Some(TermCat::Adjective),
            "3" => Some(TermCat::Pronoun),
            "4" => Some(TermCat::Numeral),
            "5" => Some(TermCat::Verb),
            "6" => Some(TermCat::Adverb),
            "7" => Some(TermCat::Preposition),
            "7m" => Some(TermCat::PrepositionM),
            "8" => Some(TermCat::Conjunction),
            "9" => Some(TermCat::Particle),
            "10" => Some(TermCat::Interjection),
            "a" => Some(TermCat::Abbreviation),
            "t" => Some(TermCat::DegreeTitle),
            "r" => Some(TermCat::RomanNumber),
            "n" => Some(TermCat::Number),
            "ia" => Some(TermCat::InitialAbbreviation),
            "x" => Some(TermCat::Any),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            TermCat::Eof => "0",
            TermCat::Noun => "1",
            TermCat::Adjective => "2",
            TermCat::Pronoun => "3",
            TermCat::Numeral => "4",
            TermCat::Verb => "5",
            TermCat::Adverb => "6",
            TermCat::Preposition => "7",
            TermCat::PrepositionM => "7m",
            TermCat::Conjunction => "8",
            TermCat::Particle => "9",
            TermCat::Interjection => "10",
            TermCat::Abbreviation => "a",
            TermCat::DegreeTitle => "t",
            TermCat::RomanNumber => "r",
            TermCat::Number => "n",
            TermCat::InitialAbbreviation => "ia",
            TermCat::Any => "x",
        }
    }

    /// The part of speech this category stands for, if it stands for one. Categories with a part
    /// of speech are matched through the morphological oracle; the rest by category equality.
    pub fn to_pos(&self) -> Option<Pos> {
        match self {
            TermCat::Noun => Some(Pos::Noun),
            TermCat::Adjective => Some(Pos::Adjective),
            TermCat::Pronoun => Some(Pos::Pronoun),
            TermCat::Numeral => Some(Pos::Numeral),
            TermCat::Verb => Some(Pos::Verb),
            TermCat::Adverb => Some(Pos::Adverb),
            TermCat::Preposition => Some(Pos::Preposition),
            TermCat::PrepositionM => Some(Pos::PrepositionM),
            TermCat::Conjunction => Some(Pos::Conjunction),
            TermCat::Particle => Some(Pos::Particle),
            TermCat::Interjection => Some(Pos::Interjection),
            TermCat::Abbreviation => Some(Pos::Abbreviation),
            _ => None,
        }
    }

    pub fn is_pos(&self) -> bool {
        self.to_pos().is_some()
    }
}

impl fmt::Display for TermCat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// What role a matched word plays in the name. Carried on terminals via the `t` attribute and
/// surfaced to the downstream form generator.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum WordKind {
    Given,
    Surname,
    Location,
    Preposition,
    RomanNumber,
    Initial,
    DegreeTitle,
    Unknown,
}

impl WordKind {
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "G" => Some(WordKind::Given),
            "S" => Some(WordKind::Surname),
            "L" => Some(WordKind::Location),
            "P" => Some(WordKind::Preposition),
            "R" => Some(WordKind::RomanNumber),
            "I" => Some(WordKind::Initial),
            "T" => Some(WordKind::DegreeTitle),
            "U" => Some(WordKind::Unknown),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            WordKind::Given => "G",
            WordKind::Surname => "S",
            WordKind::Location => "L",
            WordKind::Preposition => "P",
            WordKind::RomanNumber => "R",
            WordKind::Initial => "I",
            WordKind::DegreeTitle => "T",
            WordKind::Unknown => "U",
        }
    }
}

impl fmt::Display for WordKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An eagerly compiled word-match constraint. Equality and hashing go by the pattern text, since
/// `Regex` itself has neither.
#[derive(Clone, Debug)]
pub struct MatchRegex {
    re: Regex,
}

impl MatchRegex {
    pub fn new(pat: &str) -> Result<Self, regex::Error> {
        Ok(MatchRegex {
            re: Regex::new(pat)?,
        })
    }

    pub fn is_match(&self, word: &str) -> bool {
        self.re.is_match(word)
    }

    pub fn pattern(&self) -> &str {
        self.re.as_str()
    }
}

impl PartialEq for MatchRegex {
    fn eq(&self, other: &MatchRegex) -> bool {
        self.re.as_str() == other.re.as_str()
    }
}

impl Eq for MatchRegex {}

impl Hash for MatchRegex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.re.as_str().hash(state);
    }
}

/// The attribute kinds a terminal can carry, in their canonical order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AttrKind {
    Gender,
    Number,
    Case,
    Note,
    Flags,
    WordKind,
    MatchRegex,
    Priority,
}

impl AttrKind {
    pub fn key(&self) -> &'static str {
        match self {
            AttrKind::Gender => "g",
            AttrKind::Number => "n",
            AttrKind::Case => "c",
            AttrKind::Note => "note",
            AttrKind::Flags => "f",
            AttrKind::WordKind => "t",
            AttrKind::MatchRegex => "r",
            AttrKind::Priority => "p",
        }
    }

    /// Filtering kinds constrain which morphological readings of a matched word are acceptable.
    pub fn is_filtering(&self) -> bool {
        matches!(
            self,
            AttrKind::Gender | AttrKind::Number | AttrKind::Case | AttrKind::Note
        )
    }
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One terminal attribute. The filtering variants carry a `voluntary` flag: a voluntary
/// attribute is dropped from the filter when the full filter yields no reading at all.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Attr {
    Gender { val: Gender, voluntary: bool },
    Number { val: GNumber, voluntary: bool },
    Case { val: Case, voluntary: bool },
    Note { val: Note, voluntary: bool },
    Flags(Vec<Flag>),
    WordKind(WordKind),
    MatchRegex(MatchRegex),
    Priority(u32),
}

impl Attr {
    pub fn kind(&self) -> AttrKind {
        match self {
            Attr::Gender { .. } => AttrKind::Gender,
            Attr::Number { .. } => AttrKind::Number,
            Attr::Case { .. } => AttrKind::Case,
            Attr::Note { .. } => AttrKind::Note,
            Attr::Flags(_) => AttrKind::Flags,
            Attr::WordKind(_) => AttrKind::WordKind,
            Attr::MatchRegex(_) => AttrKind::MatchRegex,
            Attr::Priority(_) => AttrKind::Priority,
        }
    }

    pub fn is_voluntary(&self) -> bool {
        match self {
            Attr::Gender { voluntary, .. }
            | Attr::Number { voluntary, .. }
            | Attr::Case { voluntary, .. }
            | Attr::Note { voluntary, .. } => *voluntary,
            _ => false,
        }
    }

    /// The morphological value a filtering attribute contributes, if this is one.
    pub fn filter_value(&self) -> Option<MorphValue> {
        match self {
            Attr::Gender { val, .. } => Some(MorphValue::Gender(*val)),
            Attr::Number { val, .. } => Some(MorphValue::Number(*val)),
            Attr::Case { val, .. } => Some(MorphValue::Case(*val)),
            Attr::Note { val, .. } => Some(MorphValue::Note(*val)),
            _ => None,
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let vol = if self.is_voluntary() { "?" } else { "" };
        match self {
            Attr::Gender { val, .. } => write!(f, "g{}={}", vol, val.code()),
            Attr::Number { val, .. } => write!(f, "n{}={}", vol, val.code()),
            Attr::Case { val, .. } => write!(f, "c{}={}", vol, val.code()),
            Attr::Note { val, .. } => write!(f, "note{}={}", vol, val.code()),
            Attr::Flags(fs) => {
                let joined = fs
                    .iter()
                    .map(|x| x.code())
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "f=\"{}\"", joined)
            }
            Attr::WordKind(k) => write!(f, "t={}", k.code()),
            Attr::MatchRegex(r) => write!(f, "r=\"{}\"", r.pattern()),
            Attr::Priority(p) => write!(f, "p={}", p),
        }
    }
}

/// Error raised when a terminal's attribute set is contradictory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TerminalError {
    DuplicateAttribute(AttrKind),
    MultipleVoluntaryAttributes,
}

impl fmt::Display for TerminalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TerminalError::DuplicateAttribute(k) => {
                write!(f, "attribute '{}' given more than once", k)
            }
            TerminalError::MultipleVoluntaryAttributes => {
                write!(f, "at most one attribute may be marked voluntary with '?'")
            }
        }
    }
}

impl Error for TerminalError {}

/// A terminal: a category plus a canonical attribute list.
///
/// Construction fills in the default word kind ([`WordKind::Unknown`]) and priority (0) when the
/// source omits them, so equal terminals always compare equal regardless of which defaults were
/// spelled out.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Terminal {
    cat: TermCat,
    attrs: Vec<Attr>,
}

impl Terminal {
    pub fn new(cat: TermCat, mut attrs: Vec<Attr>) -> Result<Terminal, TerminalError> {
        for i in 0..attrs.len() {
            for j in i + 1..attrs.len() {
                if attrs[i].kind() == attrs[j].kind() {
                    return Err(TerminalError::DuplicateAttribute(attrs[i].kind()));
                }
            }
        }
        if attrs.iter().filter(|a| a.is_voluntary()).count() > 1 {
            return Err(TerminalError::MultipleVoluntaryAttributes);
        }
        if !attrs.iter().any(|a| a.kind() == AttrKind::WordKind) {
            attrs.push(Attr::WordKind(WordKind::Unknown));
        }
        if !attrs.iter().any(|a| a.kind() == AttrKind::Priority) {
            attrs.push(Attr::Priority(0));
        }
        for a in attrs.iter_mut() {
            if let Attr::Flags(fs) = a {
                fs.sort_unstable();
                fs.dedup();
            }
        }
        attrs.sort_unstable_by_key(|a| a.kind());
        Ok(Terminal { cat, attrs })
    }

    /// The end-of-input terminal.
    pub fn eof() -> Terminal {
        Terminal {
            cat: TermCat::Eof,
            attrs: vec![
                Attr::WordKind(WordKind::Unknown),
                Attr::Priority(0),
            ],
        }
    }

    pub fn cat(&self) -> TermCat {
        self.cat
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    fn attr(&self, kind: AttrKind) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.kind() == kind)
    }

    pub fn match_regex(&self) -> Option<&MatchRegex> {
        match self.attr(AttrKind::MatchRegex) {
            Some(Attr::MatchRegex(r)) => Some(r),
            _ => None,
        }
    }

    pub fn flags(&self) -> &[Flag] {
        match self.attr(AttrKind::Flags) {
            Some(Attr::Flags(fs)) => fs,
            _ => &[],
        }
    }

    pub fn word_kind(&self) -> WordKind {
        match self.attr(AttrKind::WordKind) {
            Some(Attr::WordKind(k)) => *k,
            _ => WordKind::Unknown,
        }
    }

    pub fn priority(&self) -> u32 {
        match self.attr(AttrKind::Priority) {
            Some(Attr::Priority(p)) => *p,
            _ => 0,
        }
    }

    /// The morphological values of the filtering attributes; `with_voluntary` selects whether
    /// the voluntary attribute (if any) is included.
    pub fn filter_values(&self, with_voluntary: bool) -> Vec<MorphValue> {
        self.attrs
            .iter()
            .filter(|a| with_voluntary || !a.is_voluntary())
            .filter_map(|a| a.filter_value())
            .collect()
    }

    pub fn has_voluntary(&self) -> bool {
        self.attrs.iter().any(|a| a.is_voluntary())
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.cat.code())?;
        // Defaults are printed too, keeping the dump unambiguous.
        write!(f, "{{")?;
        for (i, a) in self.attrs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", a)?;
        }
        write!(f, "}}")
    }
}

/// A concrete nonterminal: a flattened name (template parameters baked into it) plus the
/// no-inflect marker. `!N` and `N` are different nonterminals.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Nonterm {
    name: String,
    inflect: bool,
}

impl Nonterm {
    pub fn new<S: Into<String>>(name: S, inflect: bool) -> Nonterm {
        Nonterm {
            name: name.into(),
            inflect,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// False iff the nonterminal carries the `!` marker, switching off inflection for the whole
    /// subtree it derives.
    pub fn inflect(&self) -> bool {
        self.inflect
    }
}

impl fmt::Display for Nonterm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.inflect {
            write!(f, "!")?;
        }
        write!(f, "{}", self.name)
    }
}

/// A symbol occurrence on a rule right-hand side.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Sym {
    /// A terminal occurrence; `inflect` is false when this occurrence carries the `!` marker.
    Term { tidx: TIdx, inflect: bool },
    Nonterm(NIdx),
    /// The explicit empty marker `ε`.
    Empty,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::morph::{Case, Flag, Gender};

    #[test]
    fn test_terminal_defaults() {
        let t = Terminal::new(TermCat::Noun, vec![]).unwrap();
        assert_eq!(t.word_kind(), WordKind::Unknown);
        assert_eq!(t.priority(), 0);
        // Spelled-out defaults make no difference to equality.
        let u = Terminal::new(
            TermCat::Noun,
            vec![Attr::WordKind(WordKind::Unknown), Attr::Priority(0)],
        )
        .unwrap();
        assert_eq!(t, u);
    }

    #[test]
    fn test_terminal_duplicate_attr() {
        match Terminal::new(
            TermCat::Noun,
            vec![
                Attr::Gender {
                    val: Gender::Feminine,
                    voluntary: false,
                },
                Attr::Gender {
                    val: Gender::Neuter,
                    voluntary: false,
                },
            ],
        ) {
            Err(TerminalError::DuplicateAttribute(AttrKind::Gender)) => (),
            r => panic!("{:?}", r),
        }
    }

    #[test]
    fn test_terminal_one_voluntary_only() {
        match Terminal::new(
            TermCat::Noun,
            vec![
                Attr::Gender {
                    val: Gender::Feminine,
                    voluntary: true,
                },
                Attr::Case {
                    val: Case::Nominative,
                    voluntary: true,
                },
            ],
        ) {
            Err(TerminalError::MultipleVoluntaryAttributes) => (),
            r => panic!("{:?}", r),
        }
    }

    #[test]
    fn test_filter_values_voluntary_subset() {
        let t = Terminal::new(
            TermCat::Noun,
            vec![
                Attr::Gender {
                    val: Gender::Feminine,
                    voluntary: true,
                },
                Attr::Case {
                    val: Case::Nominative,
                    voluntary: false,
                },
            ],
        )
        .unwrap();
        assert!(t.has_voluntary());
        assert_eq!(t.filter_values(true).len(), 2);
        assert_eq!(
            t.filter_values(false),
            vec![MorphValue::Case(Case::Nominative)]
        );
    }

    #[test]
    fn test_flags_canonicalized() {
        let a = Terminal::new(
            TermCat::Noun,
            vec![Attr::Flags(vec![Flag::NotGeneralWord, Flag::GeneralWord])],
        )
        .unwrap();
        let b = Terminal::new(
            TermCat::Noun,
            vec![Attr::Flags(vec![
                Flag::GeneralWord,
                Flag::NotGeneralWord,
                Flag::GeneralWord,
            ])],
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_term_cat_codes() {
        assert_eq!(TermCat::from_code("7m"), Some(TermCat::PrepositionM));
        assert_eq!(TermCat::from_code("ia"), Some(TermCat::InitialAbbreviation));
        assert_eq!(TermCat::from_code("0"), None);
        assert!(TermCat::Abbreviation.is_pos());
        assert!(!TermCat::DegreeTitle.is_pos());
    }
}
