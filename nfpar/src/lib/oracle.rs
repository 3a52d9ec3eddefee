//! The morphological oracle boundary.
//!
//! The analyser never sees the oracle process itself, only this trait: given a word, either a
//! set of readings, or `None` when the oracle has no information about the word (a normal
//! outcome for rare names), or an error when the oracle cannot be reached at all. The two
//! negative outcomes are deliberately distinct: the first degrades the word to
//! unknown-analysis, the second aborts the parse.

use std::{error::Error, fmt};

use nfgrammar::morph::{Flag, MorphKind, MorphValue, Stylistic, TagRule};

/// The oracle could not be consulted for a word. Distinct from the oracle knowing nothing
/// about the word, which is reported as `Ok(None)` and is not an error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleError {
    word: String,
}

impl OracleError {
    pub fn new<S: Into<String>>(word: S) -> OracleError {
        OracleError { word: word.into() }
    }

    pub fn word(&self) -> &str {
        &self.word
    }
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "could not get morphological info for '{}'", self.word)
    }
}

impl Error for OracleError {}

/// One group of readings sharing a lemma: the group's flags, its tag-rules, and (filled in on
/// demand by the oracle) its concrete surface forms.
#[derive(Clone, Debug, Default)]
pub struct ReadingGroup {
    flags: Vec<Flag>,
    tag_rules: Vec<TagRule>,
    morphs: Vec<(TagRule, String)>,
}

impl ReadingGroup {
    pub fn new(flags: Vec<Flag>, tag_rules: Vec<TagRule>) -> ReadingGroup {
        ReadingGroup {
            flags,
            tag_rules,
            morphs: Vec::new(),
        }
    }

    /// Attaches the (tag-rule, surface form) pairs the oracle reported for this group.
    pub fn with_morphs(mut self, morphs: Vec<(TagRule, String)>) -> ReadingGroup {
        self.morphs = morphs;
        self
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// True iff every required flag is present on this group.
    fn has_flags(&self, required: &[Flag]) -> bool {
        required.iter().all(|f| self.flags.contains(f))
    }
}

/// Whether a reading may take part in the analysis at all. Colloquial readings never do.
fn admissible(r: &TagRule) -> bool {
    r.stylistic != Some(Stylistic::Colloquial)
}

/// Everything the oracle knows about one word.
#[derive(Clone, Debug, Default)]
pub struct WordReadings {
    groups: Vec<ReadingGroup>,
}

impl WordReadings {
    pub fn new(groups: Vec<ReadingGroup>) -> WordReadings {
        WordReadings { groups }
    }

    /// The tag-rules passing a value filter, drawn from groups carrying every required flag.
    /// A tag-rule passes only if it assigns every filtered category one of the filtered values;
    /// a reading silent on a filtered category does not pass.
    pub fn tag_rules(&self, val_filter: &[MorphValue], flag_filter: &[Flag]) -> Vec<&TagRule> {
        self.groups
            .iter()
            .filter(|g| g.has_flags(flag_filter))
            .flat_map(|g| g.tag_rules.iter())
            .filter(|r| admissible(r) && r.passes(val_filter))
            .collect()
    }

    /// The distinct values the passing readings assign to one category.
    pub fn values_of(
        &self,
        kind: MorphKind,
        val_filter: &[MorphValue],
        flag_filter: &[Flag],
    ) -> Vec<MorphValue> {
        let mut vals = Vec::new();
        for r in self.tag_rules(val_filter, flag_filter) {
            if let Some(v) = r.get(kind) {
                if !vals.contains(&v) {
                    vals.push(v);
                }
            }
        }
        vals
    }

    /// The surface forms passing a value filter and a negative filter, drawn from groups
    /// carrying every required flag. With `word_start` set, each form's first letter is
    /// upper-cased, carrying the capitalization of a name-initial word over to its other forms.
    pub fn morphs(
        &self,
        val_filter: &[MorphValue],
        not_val_filter: &[MorphValue],
        flag_filter: &[Flag],
        word_start: bool,
    ) -> Vec<(TagRule, String)> {
        let mut out = Vec::new();
        for g in self.groups.iter().filter(|g| g.has_flags(flag_filter)) {
            for (r, form) in g.morphs.iter() {
                if !admissible(r) || !r.passes(val_filter) || !r.passes_not(not_val_filter) {
                    continue;
                }
                let form = if word_start {
                    capitalize(form)
                } else {
                    form.clone()
                };
                if !out.iter().any(|(pr, pf)| pr == r && pf == &form) {
                    out.push((*r, form));
                }
            }
        }
        out
    }
}

fn capitalize(s: &str) -> String {
    let mut cs = s.chars();
    match cs.next() {
        Some(c) => c.to_uppercase().chain(cs).collect(),
        None => String::new(),
    }
}

/// The word-level fact source the analyser consults.
///
/// `Ok(None)` means the oracle has no information about the word; `Err` means the oracle could
/// not be consulted at all.
pub trait MorphOracle {
    fn readings(&self, word: &str) -> Result<Option<&WordReadings>, OracleError>;
}

#[cfg(test)]
mod test {
    use super::*;
    use nfgrammar::morph::{Case, Gender, Pos};

    fn readings(tags: &[&str]) -> WordReadings {
        WordReadings::new(vec![ReadingGroup::new(
            vec![],
            tags.iter().map(|t| TagRule::from_tag(t)).collect(),
        )])
    }

    #[test]
    fn test_tag_rules_filtering() {
        let w = readings(&["k1gMnSc1", "k1gMnSc5", "k2gMnSc1"]);
        let nom = w.tag_rules(&[MorphValue::Case(Case::Nominative)], &[]);
        assert_eq!(nom.len(), 2);
        assert!(nom.iter().all(|r| r.case == Some(Case::Nominative)));
        assert!(w
            .tag_rules(&[MorphValue::Gender(Gender::Feminine)], &[])
            .is_empty());
    }

    #[test]
    fn test_absent_category_does_not_pass() {
        let w = readings(&["k1nSc1"]);
        assert!(w
            .tag_rules(&[MorphValue::Gender(Gender::MascAnimate)], &[])
            .is_empty());
    }

    #[test]
    fn test_flag_filter_requires_all_flags() {
        let w = WordReadings::new(vec![
            ReadingGroup::new(vec![Flag::GeneralWord], vec![TagRule::from_tag("k1gMnSc1")]),
            ReadingGroup::new(
                vec![Flag::GeneralWord, Flag::NotGeneralWord],
                vec![TagRule::from_tag("k2gMnSc1")],
            ),
        ]);
        let rs = w.tag_rules(&[], &[Flag::GeneralWord, Flag::NotGeneralWord]);
        assert_eq!(rs.len(), 1);
        assert_eq!(rs[0].pos, Some(Pos::Adjective));
    }

    #[test]
    fn test_colloquial_never_admitted() {
        let w = readings(&["k1gMnSc1wh"]);
        assert!(w.tag_rules(&[], &[]).is_empty());
    }

    #[test]
    fn test_morphs_capitalization_and_negative_filter() {
        let g = ReadingGroup::new(vec![], vec![]).with_morphs(vec![
            (TagRule::from_tag("k1gMnSc1"), "novák".to_owned()),
            (TagRule::from_tag("k1gMnSc5"), "nováku".to_owned()),
        ]);
        let w = WordReadings::new(vec![g]);
        let ms = w.morphs(&[], &[MorphValue::Case(Case::Vocative)], &[], true);
        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].1, "Novák");
    }

    #[test]
    fn test_values_of() {
        let w = readings(&["k1gMnSc1", "k1gMnSc4"]);
        let cases = w.values_of(MorphKind::Case, &[], &[]);
        assert_eq!(cases.len(), 2);
        assert_eq!(w.values_of(MorphKind::Gender, &[], &[]).len(), 1);
    }
}
