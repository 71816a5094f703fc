//! Candidate generation and match lengths driven by a minimal parser.

use std::sync::Arc;

use simplepinyin_core::{
    span, Candidate, CandidateKind, Config, Constraint, Engine, Error, Instance, Lexicon,
    SyllableKey, SyllableParser, SyllableSpan,
};

/// One span per `'`-separated part; the separator stays with the left part.
struct SplitParser;

impl SyllableParser for SplitParser {
    fn segment(&self, input: &str) -> Vec<SyllableSpan> {
        let total = input.chars().count();
        let mut spans = Vec::new();
        let mut start = 0;
        for part in input.split('\'') {
            let len = part.chars().count();
            let extra = usize::from(start + len < total);
            spans.push(SyllableSpan::new(
                start,
                len + extra,
                SyllableKey::Complete(part.to_string()),
            ));
            start += len + extra;
        }
        spans
    }

    fn resplits(&self, left: &str, right: &str) -> Vec<(String, String)> {
        match (left, right) {
            ("fang", "an") => vec![("fan".into(), "gan".into())],
            _ => Vec::new(),
        }
    }
}

fn engine() -> Arc<Engine<SplitParser>> {
    Arc::new(Engine::new(Lexicon::load_demo(), SplitParser, Config::default()))
}

#[test]
fn resplit_candidate_covers_both_spans() {
    let e = engine();
    let spans = e.segment("fang'an");
    let cands = e.generate(&spans, "", None);
    assert_eq!(cands[0].text, "方案");
    let resplit = cands
        .iter()
        .find(|c| c.kind == CandidateKind::Resplit)
        .expect("resplit candidate");
    assert_eq!(resplit.text, "反感");
    assert_eq!(resplit.span_range, 0..2);
}

#[test]
fn prefix_that_does_not_align_is_context_only() {
    let e = engine();
    let spans = e.segment("ni'hao");
    let cands = e.generate(&spans, "中", None);
    assert_eq!(cands[0].text, "你好");
    assert_eq!(cands[0].span_range, 0..2);
}

#[test]
fn aligned_prefix_moves_generation_start() {
    let e = engine();
    let spans = e.segment("ni'hao");
    let cands = e.generate(&spans, "你", None);
    assert_eq!(cands[0].kind, CandidateKind::BestMatch);
    assert_eq!(cands[0].text, "好");
    assert!(cands.iter().all(|c| c.span_range.end == 2));
}

#[test]
fn constraint_beyond_parse_is_ignored() {
    let e = engine();
    let long = e.segment("ni'hao'ma");
    let fixed = Candidate::new("你好吗", CandidateKind::Normal, 0..3, 0.0);
    let c = Constraint::new(0, fixed, long.len()).unwrap();

    let short = e.segment("ni'hao");
    let cands = e.generate(&short, "", Some(&c));
    assert_eq!(cands[0].text, "你好");
}

#[test]
fn max_candidates_truncates() {
    let mut cfg = Config::default();
    cfg.max_candidates = 2;
    let e = Engine::new(Lexicon::load_demo(), SplitParser, cfg);
    let spans = e.segment("ni'hao");
    assert_eq!(e.generate(&spans, "", None).len(), 2);
}

#[test]
fn generation_is_deterministic() {
    let e = engine();
    let spans = e.segment("zhong'guo'ren");
    let a = e.generate(&spans, "", None);
    let b = e.generate(&spans, "", None);
    assert_eq!(a, b);
}

#[test]
fn lead_constraint_prepends_its_text() {
    let mut inst = Instance::new(engine());
    inst.segment("ni'hao").unwrap();
    let ni = inst
        .generate("")
        .iter()
        .find(|c| c.text == "你" && c.kind == CandidateKind::Normal)
        .cloned()
        .unwrap();
    inst.set_constraint(0, ni).unwrap();

    let cands = inst.generate("").to_vec();
    assert_eq!(cands[0].text, "你好");
    assert_eq!(cands[0].span_range, 0..2);
    assert!(cands[1..].iter().all(|c| c.span_range.start == 1));
}

#[test]
fn constraint_inside_aligned_prefix_does_not_repeat_it() {
    let e = engine();
    let spans = e.segment("ni'hao");
    let fixed = Candidate::new("你好", CandidateKind::Normal, 0..2, 0.0);
    let c = Constraint::new(0, fixed, spans.len()).unwrap();

    let cands = e.generate(&spans, "你", Some(&c));
    assert_eq!(cands[0].kind, CandidateKind::BestMatch);
    assert_eq!(cands[0].text, "好");
    assert_eq!(format!("你{}", cands[0].text), "你好");
    assert!(cands.iter().all(|c| !c.text.starts_with('你')));
}

#[test]
fn invalid_constraints_are_rejected() {
    let mut inst = Instance::new(engine());
    inst.segment("ni'hao").unwrap();
    let hao = Candidate::new("好", CandidateKind::Normal, 1..2, 0.0);
    assert!(matches!(
        inst.set_constraint(0, hao.clone()),
        Err(Error::InvalidInput(_))
    ));
    let past_end = Candidate::new("好吗", CandidateKind::Normal, 1..3, 0.0);
    assert!(inst.set_constraint(1, past_end).is_err());
    assert!(inst.set_constraint(1, hao).is_ok());
}

#[test]
fn reset_keeps_parse_and_regenerates_identically() {
    let mut inst = Instance::new(engine());
    inst.segment("xian'zai").unwrap();
    let first = inst.generate("").to_vec();
    inst.reset();
    assert_eq!(inst.count(), 0);
    assert_eq!(inst.spans().len(), 2);
    let second = inst.generate("").to_vec();
    assert_eq!(first, second);
}

#[test]
fn match_lengths_stay_within_input() {
    let mut inst = Instance::new(engine());
    for input in ["ni'hao", "zhong'guo'ren", "xian", "fang'an", "qqq'ni"] {
        let conv = inst.convert(input, "").unwrap();
        let len = input.chars().count();
        assert_eq!(conv.candidates.len(), conv.match_lengths.len());
        assert!(conv.match_lengths.iter().all(|&m| m <= len), "{input}");

        inst.segment(input).unwrap();
        let ms = inst.match_span().unwrap();
        assert_eq!(ms.lengths().last().copied(), Some(len));
        assert!(ms.lengths().windows(2).all(|w| w[0] <= w[1]));
        assert!(span::covers(inst.spans(), len));
    }
}

#[test]
fn normal_candidate_consumes_its_spans() {
    let mut inst = Instance::new(engine());
    inst.segment("ni'hao").unwrap();
    let ni = inst
        .generate("")
        .iter()
        .find(|c| c.text == "你")
        .cloned()
        .unwrap();
    assert_eq!(inst.match_length(&ni).unwrap(), 3);
}
