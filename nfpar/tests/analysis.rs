//! End-to-end analyses over small grammars: lexing, ambiguity enumeration, timeouts.

use std::collections::HashSet;
use std::time::Duration;

use nfpar::test_utils::{analyze_tokens, parser_parts, TestOracle};
use nfpar::{LexerDef, NameParserBuilder, ParseError, TokenKind};

fn oracle() -> TestOracle {
    let mut o = TestOracle::new();
    o.add_tags("Jan", &["k1gMnSc1"]);
    o.add_tags("Novák", &["k1gMnSc1;jS"]);
    o.add_tags("Karel", &["k1gMnSc1"]);
    o.add_tags("IV.", &["k4"]);
    o
}

#[test]
fn test_full_name_with_title() {
    let (grm, table) = parser_parts(
        "S
         S -> TITUL JMENO PRIJMENI
         S -> JMENO PRIJMENI
         TITUL -> t{t=T}
         JMENO -> 1{t=G}
         PRIJMENI -> 1{t=S}",
    );
    let o = oracle();
    let ld = LexerDef::new(["Ing."]);
    let toks = ld.tokens(&["Ing.", "Jan", "Novák"], &o).unwrap();
    assert_eq!(toks[0].kind(), TokenKind::DegreeTitle);
    let mut p = NameParserBuilder::new(&grm, &table, &o).build();
    let anas = p.analyse(&toks).unwrap();
    assert_eq!(anas.len(), 1);
    let words: Vec<&str> = anas[0].tokens.iter().map(|t| t.word.as_str()).collect();
    assert_eq!(words, ["Ing.", "Jan", "Novák"]);
    assert!(anas[0].tokens[1].inflect);
    assert!(anas[0].tokens[2].inflect);

    let anas = p.analyse(&ld.tokens(&["Jan", "Novák"], &o).unwrap()).unwrap();
    assert_eq!(anas.len(), 1);
}

#[test]
fn test_unknown_surname_degrades() {
    let (grm, table) = parser_parts(
        "S
         S -> 1{t=G} 1{t=S}",
    );
    let o = oracle();
    let ld = LexerDef::new(Vec::<String>::new());
    let toks = ld.tokens(&["Jan", "Xyzzy"], &o).unwrap();
    assert_eq!(toks[1].kind(), TokenKind::AnalyzeUnknown);
    let mut p = NameParserBuilder::new(&grm, &table, &o).build();
    let anas = p.analyse(&toks).unwrap();
    assert_eq!(anas.len(), 1);
    assert!(anas[0].tokens[0].inflect);
    assert!(!anas[0].tokens[1].inflect);
}

#[test]
fn test_roman_number_suffix() {
    let (grm, table) = parser_parts(
        "S
         S -> 1{t=G} r{t=R}",
    );
    let o = oracle();
    let ld = LexerDef::new(Vec::<String>::new());
    let toks = ld.tokens(&["Karel", "IV."], &o).unwrap();
    assert_eq!(toks[1].kind(), TokenKind::RomanNumber);
    let mut p = NameParserBuilder::new(&grm, &table, &o).build();
    assert_eq!(p.analyse(&toks).unwrap().len(), 1);
}

#[test]
fn test_template_parameters_end_to_end() {
    let (grm, table) = parser_parts(
        "S
         S -> CELE(g=M)
         CELE(g) -> 1{g=$g,t=G} 1{g=$g,t=S}",
    );
    let mut o = TestOracle::new();
    o.add_tags("Jan", &["k1gMnSc1"]);
    o.add_tags("Novák", &["k1gMnSc1"]);
    o.add_tags("Jana", &["k1gFnSc1"]);
    let mut p = NameParserBuilder::new(&grm, &table, &o).build();
    assert_eq!(p.analyse(&analyze_tokens(&["Jan", "Novák"])).unwrap().len(), 1);
    match p.analyse(&analyze_tokens(&["Jana", "Novák"])) {
        Err(ParseError::NotInLanguage) => (),
        r => panic!("{:?}", r),
    }
}

#[test]
fn test_ambiguity_multiplicity() {
    // "Jan" matches both terminals, so each position doubles the derivation count.
    let (grm, table) = parser_parts(
        "S
         S -> JMENO JMENO
         JMENO -> 1{t=G}
         JMENO -> 1{t=S}",
    );
    let o = oracle();
    let mut p = NameParserBuilder::new(&grm, &table, &o).build();
    let anas = p.analyse(&analyze_tokens(&["Jan", "Jan"])).unwrap();
    assert_eq!(anas.len(), 4);
    let distinct: HashSet<Vec<_>> = anas.iter().map(|a| a.rules.clone()).collect();
    assert_eq!(distinct.len(), 4);
}

#[test]
fn test_prefix_regrouping_preserves_multiplicity() {
    // Alternatives sharing the prefix JMENO are factored into an auxiliary rule at build
    // time. A hand-factored grammar for the same language, whose alternatives diverge at the
    // first symbol, must enumerate exactly the same derivation counts.
    let (grm_shared, table_shared) = parser_parts(
        "S
         S -> JMENO
         S -> JMENO JMENO
         JMENO -> 1{t=G}
         JMENO -> 1{t=S}",
    );
    assert!(grm_shared.to_string().contains("S$"));
    let (grm_plain, table_plain) = parser_parts(
        "S
         S -> KRATKE
         S -> DLOUHE
         KRATKE -> JMENO
         DLOUHE -> JMENO JMENO
         JMENO -> 1{t=G}
         JMENO -> 1{t=S}",
    );
    assert!(!grm_plain.to_string().contains('$'));
    let o = oracle();
    for words in [vec!["Jan"], vec!["Jan", "Jan"]] {
        let toks = analyze_tokens(&words);
        let mut ps = NameParserBuilder::new(&grm_shared, &table_shared, &o).build();
        let mut pp = NameParserBuilder::new(&grm_plain, &table_plain, &o).build();
        let a = ps.analyse(&toks).unwrap();
        let b = pp.analyse(&toks).unwrap();
        assert_eq!(a.len(), b.len());
        // Each position's word matches both JMENO terminals.
        assert_eq!(a.len(), 2usize.pow(words.len() as u32));
        let distinct: HashSet<Vec<_>> = a.iter().map(|x| x.rules.clone()).collect();
        assert_eq!(distinct.len(), a.len());
    }
}

#[test]
fn test_determinism() {
    let (grm, table) = parser_parts(
        "S
         S -> JMENO S
         S -> JMENO
         JMENO -> 1{t=G}
         JMENO -> 1{t=S}",
    );
    let o = oracle();
    let toks = analyze_tokens(&["Jan", "Jan", "Jan", "Jan"]);
    let mut p = NameParserBuilder::new(&grm, &table, &o).build();
    let a: HashSet<_> = p.analyse(&toks).unwrap().into_iter().collect();
    let b: HashSet<_> = p.analyse(&toks).unwrap().into_iter().collect();
    assert_eq!(a, b);
    assert_eq!(a.len(), 16);
}

#[test]
fn test_timeout_on_exponential_grammar() {
    let (grm, table) = parser_parts(
        "S
         S -> JMENO S
         S -> JMENO
         JMENO -> 1{t=G}
         JMENO -> 1{t=S}",
    );
    let o = oracle();
    let words = vec!["Jan"; 22];
    let toks = analyze_tokens(&words);
    let mut p = NameParserBuilder::new(&grm, &table, &o)
        .timeout(Duration::from_millis(1))
        .build();
    match p.analyse(&toks) {
        Err(ParseError::Timeout) => (),
        r => panic!("{:?}", r.map(|a| a.len())),
    }
    // The parser stays usable after a timeout.
    assert_eq!(p.analyse(&analyze_tokens(&["Jan"])).unwrap().len(), 2);
    assert!(p.stats().elapsed >= Duration::from_millis(1));
}
