//! The closed morphological vocabulary shared by the grammar and the oracle boundary.
//!
//! Word-level facts travel as [`TagRule`]s: one compact reading assigning at most one value per
//! morphological category. Grammar terminals constrain readings with sets of [`MorphValue`]s (see
//! `name::symbol`). The codes accepted here are the ones used in grammar source files and in the
//! oracle's tag-rule encoding.

use std::fmt;

/// The morphological categories a reading can assign a value to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MorphKind {
    Pos,
    Gender,
    Number,
    Case,
    Note,
    Stylistic,
}

/// Part of speech.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Pos {
    Noun,
    Adjective,
    Pronoun,
    Numeral,
    Verb,
    Adverb,
    Preposition,
    /// A preposition after which the following words inflect (e.g. "von", "da", "de").
    PrepositionM,
    Conjunction,
    Particle,
    Interjection,
    Abbreviation,
}

impl Pos {
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "1" => Some(Pos::Noun),
            "2" => Some(Pos::Adjective),
            "3" => Some(Pos::Pronoun),
            "4" => Some(Pos::Numeral),
            "5" => Some(Pos::Verb),
            "6" => Some(Pos::Adverb),
            "7" => Some(Pos::Preposition),
            "7m" => Some(Pos::PrepositionM),
            "8" => Some(Pos::Conjunction),
            "9" => Some(Pos::Particle),
            "10" => Some(Pos::Interjection),
            "a" => Some(Pos::Abbreviation),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Pos::Noun => "1",
            Pos::Adjective => "2",
            Pos::Pronoun => "3",
            Pos::Numeral => "4",
            Pos::Verb => "5",
            Pos::Adverb => "6",
            Pos::Preposition => "7",
            Pos::PrepositionM => "7m",
            Pos::Conjunction => "8",
            Pos::Particle => "9",
            Pos::Interjection => "10",
            Pos::Abbreviation => "a",
        }
    }
}

/// Grammatical gender. Masculine splits into animate/inanimate.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Gender {
    MascAnimate,
    MascInanimate,
    Feminine,
    Neuter,
}

impl Gender {
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "M" => Some(Gender::MascAnimate),
            "I" => Some(Gender::MascInanimate),
            "F" => Some(Gender::Feminine),
            "N" => Some(Gender::Neuter),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Gender::MascAnimate => "M",
            Gender::MascInanimate => "I",
            Gender::Feminine => "F",
            Gender::Neuter => "N",
        }
    }
}

/// Grammatical number.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum GNumber {
    Singular,
    Plural,
}

impl GNumber {
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "S" => Some(GNumber::Singular),
            "P" => Some(GNumber::Plural),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GNumber::Singular => "S",
            GNumber::Plural => "P",
        }
    }
}

/// Grammatical case, numbered 1-7 as in the source format.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Case {
    Nominative,
    Genitive,
    Dative,
    Accusative,
    Vocative,
    Locative,
    Instrumental,
}

impl Case {
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "1" => Some(Case::Nominative),
            "2" => Some(Case::Genitive),
            "3" => Some(Case::Dative),
            "4" => Some(Case::Accusative),
            "5" => Some(Case::Vocative),
            "6" => Some(Case::Locative),
            "7" => Some(Case::Instrumental),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Case::Nominative => "1",
            Case::Genitive => "2",
            Case::Dative => "3",
            Case::Accusative => "4",
            Case::Vocative => "5",
            Case::Locative => "6",
            Case::Instrumental => "7",
        }
    }
}

/// The dictionary note attached to a reading, marking what kind of proper noun a lemma is.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Note {
    GivenName,
    Surname,
    Location,
    CharacterAsNoun,
}

impl Note {
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "jG" => Some(Note::GivenName),
            "jS" => Some(Note::Surname),
            "jL" => Some(Note::Location),
            "jC" => Some(Note::CharacterAsNoun),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Note::GivenName => "jG",
            Note::Surname => "jS",
            Note::Location => "jL",
            Note::CharacterAsNoun => "jC",
        }
    }
}

/// Stylistic markers. Colloquial readings are never admitted into the analysis.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Stylistic {
    Colloquial,
}

impl Stylistic {
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "h" => Some(Stylistic::Colloquial),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Stylistic::Colloquial => "h",
        }
    }
}

/// Grouping flags an oracle reading group can carry. Grammar terminals can require them via the
/// `f` attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Flag {
    GeneralWord,
    NotGeneralWord,
}

impl Flag {
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "GW" => Some(Flag::GeneralWord),
            "NGW" => Some(Flag::NotGeneralWord),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Flag::GeneralWord => "GW",
            Flag::NotGeneralWord => "NGW",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single morphological value, tagged with its category. Filter sets on terminals, and the
/// constraints handed to the form generator, are sets of these.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MorphValue {
    Pos(Pos),
    Gender(Gender),
    Number(GNumber),
    Case(Case),
    Note(Note),
    Stylistic(Stylistic),
}

impl MorphValue {
    pub fn kind(&self) -> MorphKind {
        match self {
            MorphValue::Pos(_) => MorphKind::Pos,
            MorphValue::Gender(_) => MorphKind::Gender,
            MorphValue::Number(_) => MorphKind::Number,
            MorphValue::Case(_) => MorphKind::Case,
            MorphValue::Note(_) => MorphKind::Note,
            MorphValue::Stylistic(_) => MorphKind::Stylistic,
        }
    }

    /// How many values the value's whole category has. Used to decide whether an oracle answer
    /// actually narrows a category down.
    pub fn kind_cardinality(kind: MorphKind) -> usize {
        match kind {
            MorphKind::Pos => 12,
            MorphKind::Gender => 4,
            MorphKind::Number => 2,
            MorphKind::Case => 7,
            MorphKind::Note => 4,
            MorphKind::Stylistic => 1,
        }
    }
}

impl fmt::Display for MorphValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MorphValue::Pos(v) => write!(f, "k{}", v.code()),
            MorphValue::Gender(v) => write!(f, "g{}", v.code()),
            MorphValue::Number(v) => write!(f, "n{}", v.code()),
            MorphValue::Case(v) => write!(f, "c{}", v.code()),
            MorphValue::Note(v) => write!(f, "{}", v.code()),
            MorphValue::Stylistic(v) => write!(f, "w{}", v.code()),
        }
    }
}

/// One compact morphological reading: at most one value per category.
///
/// The oracle encodes readings as tag strings (e.g. `k1gFnSc1;jS`); [`TagRule::from_tag`] parses
/// that encoding, silently skipping categories and values outside the vocabulary above, as the
/// oracle reports plenty of categories the analysis has no use for.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct TagRule {
    pub pos: Option<Pos>,
    pub gender: Option<Gender>,
    pub number: Option<GNumber>,
    pub case: Option<Case>,
    pub note: Option<Note>,
    pub stylistic: Option<Stylistic>,
}

impl TagRule {
    /// Parses the `kXgXnXcX[;note]` tag encoding.
    pub fn from_tag(tag: &str) -> Self {
        let mut r = TagRule::default();
        let (body, note) = match tag.split_once(';') {
            Some((b, n)) => (b, Some(n)),
            None => (tag, None),
        };
        let mut cs = body.chars().peekable();
        while let Some(c) = cs.next() {
            let mut val = String::new();
            while let Some(&nxt) = cs.peek() {
                if nxt.is_ascii_alphanumeric() && !"kgncw".contains(nxt) {
                    val.push(nxt);
                    cs.next();
                } else {
                    break;
                }
            }
            match c {
                'k' => r.pos = Pos::from_code(&val),
                'g' => r.gender = Gender::from_code(&val),
                'n' => r.number = GNumber::from_code(&val),
                'c' => r.case = Case::from_code(&val),
                'w' => r.stylistic = Stylistic::from_code(&val),
                _ => (),
            }
        }
        if let Some(n) = note {
            r.note = Note::from_code(n);
        }
        r
    }

    pub fn get(&self, kind: MorphKind) -> Option<MorphValue> {
        match kind {
            MorphKind::Pos => self.pos.map(MorphValue::Pos),
            MorphKind::Gender => self.gender.map(MorphValue::Gender),
            MorphKind::Number => self.number.map(MorphValue::Number),
            MorphKind::Case => self.case.map(MorphValue::Case),
            MorphKind::Note => self.note.map(MorphValue::Note),
            MorphKind::Stylistic => self.stylistic.map(MorphValue::Stylistic),
        }
    }

    pub fn set(&mut self, v: MorphValue) {
        match v {
            MorphValue::Pos(x) => self.pos = Some(x),
            MorphValue::Gender(x) => self.gender = Some(x),
            MorphValue::Number(x) => self.number = Some(x),
            MorphValue::Case(x) => self.case = Some(x),
            MorphValue::Note(x) => self.note = Some(x),
            MorphValue::Stylistic(x) => self.stylistic = Some(x),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = MorphValue> + '_ {
        [
            MorphKind::Pos,
            MorphKind::Gender,
            MorphKind::Number,
            MorphKind::Case,
            MorphKind::Note,
            MorphKind::Stylistic,
        ]
        .into_iter()
        .filter_map(|k| self.get(k))
    }

    /// A reading passes a value filter iff, for every category the filter mentions, the reading
    /// assigns that category one of the filtered values. A reading lacking a filtered category
    /// does not pass: absence of information is not a match.
    pub fn passes(&self, val_filter: &[MorphValue]) -> bool {
        for f in val_filter {
            match self.get(f.kind()) {
                Some(v) => {
                    if !val_filter.contains(&v) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }

    /// The complement of a value filter: the reading must not assign any of these values.
    pub fn passes_not(&self, not_val_filter: &[MorphValue]) -> bool {
        !not_val_filter
            .iter()
            .any(|f| self.get(f.kind()) == Some(*f))
    }

    /// True if the two readings agree on every category except the given ones (and the ones
    /// either side leaves unset).
    pub fn same_except(&self, other: &TagRule, except: &[MorphKind]) -> bool {
        [
            MorphKind::Pos,
            MorphKind::Gender,
            MorphKind::Number,
            MorphKind::Case,
            MorphKind::Note,
            MorphKind::Stylistic,
        ]
        .into_iter()
        .filter(|k| !except.contains(k))
        .all(|k| match (self.get(k), other.get(k)) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        })
    }
}

impl fmt::Display for TagRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(v) = self.pos {
            write!(f, "k{}", v.code())?;
        }
        if let Some(v) = self.gender {
            write!(f, "g{}", v.code())?;
        }
        if let Some(v) = self.number {
            write!(f, "n{}", v.code())?;
        }
        if let Some(v) = self.case {
            write!(f, "c{}", v.code())?;
        }
        if let Some(v) = self.stylistic {
            write!(f, "w{}", v.code())?;
        }
        if let Some(v) = self.note {
            write!(f, ";{}", v.code())?;
        }
        Ok(())
    }
}
