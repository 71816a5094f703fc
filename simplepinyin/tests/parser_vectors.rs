// Segmentation test vectors for the pinyin parser.
//
// Covers the DP tie-breakers, apostrophe handling, correction spellings,
// abbreviated initials and the unknown-character fallback.

use simplepinyin::{Parser, PinyinConfig, SyllableKey, SyllableSpan};
use simplepinyin_core::{span, SyllableParser};

fn keys(spans: &[SyllableSpan]) -> Vec<&str> {
    spans.iter().map(|s| s.key.as_str()).collect()
}

fn segment(input: &str) -> Vec<SyllableSpan> {
    Parser::default().segment(input)
}

#[test]
fn simple_vectors() {
    let parser = Parser::default();
    let cases: &[(&str, &[&str])] = &[
        ("nihao", &["ni", "hao"]),
        ("zhongguo", &["zhong", "guo"]),
        ("xiexie", &["xie", "xie"]),
        ("woai", &["wo", "ai"]),
        ("shengri", &["sheng", "ri"]),
        ("zhongguoren", &["zhong", "guo", "ren"]),
        ("shijie", &["shi", "jie"]),
        ("jintian", &["jin", "tian"]),
    ];
    for (input, expected) in cases {
        let spans = parser.segment(input);
        assert_eq!(keys(&spans), *expected, "input {input}");
    }
}

#[test]
fn fewer_syllables_win() {
    assert_eq!(keys(&segment("xian")), vec!["xian"]);
    assert_eq!(keys(&segment("tian")), vec!["tian"]);
}

#[test]
fn apostrophe_forces_boundary() {
    assert_eq!(keys(&segment("xi'an")), vec!["xi", "an"]);
    assert_eq!(keys(&segment("fang'an")), vec!["fang", "an"]);
    assert_eq!(keys(&segment("fan'gan")), vec!["fan", "gan"]);
}

#[test]
fn repeated_separators_stay_in_one_span() {
    let spans = segment("xi''an");
    assert_eq!(keys(&spans), vec!["xi", "an"]);
    assert_eq!(spans[0].length, 4);
    assert!(span::covers(&spans, 6));
}

#[test]
fn trailing_separator_is_covered() {
    let spans = segment("ni'");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].length, 3);
}

#[test]
fn correction_vectors() {
    let cases = [
        ("bagn", "bang"),
        ("bamg", "bang"),
        ("liou", "liu"),
        ("guei", "gui"),
        ("luen", "lun"),
        ("nue", "nve"),
        ("jve", "jue"),
        ("jv", "ju"),
        ("xvan", "xuan"),
        ("hon", "hong"),
    ];
    for (typed, canonical) in cases {
        let spans = segment(typed);
        assert_eq!(spans.len(), 1, "input {typed}");
        assert_eq!(spans[0].key, SyllableKey::Complete(canonical.to_string()));
        assert!(spans[0].distance > 0.0, "input {typed}");
    }
}

#[test]
fn canonical_spelling_has_no_distance() {
    let spans = segment("lve");
    assert_eq!(spans[0].key.as_str(), "lve");
    assert_eq!(spans[0].distance, 0.0);
}

#[test]
fn corrections_can_be_switched_off() {
    let mut cfg = PinyinConfig::default();
    cfg.set_all_corrections(false);
    let parser = Parser::new(&cfg);
    for typed in ["bagn", "liou", "jve", "hon"] {
        assert!(!parser.contains_spelling(typed), "{typed}");
    }
    assert_ne!(keys(&parser.segment("liou")), vec!["liu"]);
}

#[test]
fn abbreviations_are_partial_keys() {
    let spans = segment("zhg");
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].key, SyllableKey::Partial("zh".into()));
    assert_eq!(spans[1].key, SyllableKey::Partial("g".into()));

    let spans = segment("nih");
    assert_eq!(keys(&spans), vec!["ni", "h"]);
    assert!(!spans[1].key.is_complete());
}

#[test]
fn unknown_fallback_keeps_coverage() {
    for input in ["ni?hao", "123", "ni hao", "ä"] {
        let spans = segment(input);
        assert!(span::covers(&spans, input.chars().count()), "input {input:?}");
        assert!(spans.iter().any(|s| s.key.is_unresolved()), "input {input:?}");
    }
}

#[test]
fn empty_input_gives_no_spans() {
    assert!(segment("").is_empty());
}

#[test]
fn mixed_case_and_umlaut_are_normalized() {
    assert_eq!(keys(&segment("ZhongGuo")), vec!["zhong", "guo"]);
    let spans = segment("nüe");
    assert_eq!(keys(&spans), vec!["nve"]);
    assert_eq!(spans[0].length, 3);
}

#[test]
fn divisions_and_resplits_come_from_tables() {
    let parser = Parser::default();
    assert!(parser
        .divisions("xian")
        .contains(&("xi".to_string(), "an".to_string())));
    assert!(parser
        .resplits("fang", "an")
        .contains(&("fan".to_string(), "gan".to_string())));
    assert!(parser.completions("zh").contains(&"zhong".to_string()));
}
