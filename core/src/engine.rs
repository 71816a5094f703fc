// core/src/engine.rs
//
// Generic conversion engine: a read-only lexicon plus a syllable parser.
// Segmentation belongs to the parser; this module turns spans into ranked
// candidates.

use std::collections::HashMap;

use tracing::{debug, debug_span, trace};

use crate::candidate::{rank_and_dedup, Candidate, CandidateKind};
use crate::constraint::Constraint;
use crate::fuzzy::FuzzyMap;
use crate::lexicon::{join_key, Lexicon};
use crate::span::{SyllableKey, SyllableSpan};
use crate::{utils, Config};

/// What a language crate provides to the engine.
pub trait SyllableParser {
    /// Split `input` into spans covering every character of it. Empty input
    /// gives an empty vector.
    fn segment(&self, input: &str) -> Vec<SyllableSpan>;

    /// Ways to read one complete syllable as two (`xian` as `xi`, `an`).
    fn divisions(&self, _syllable: &str) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Other ways to split the joined spelling of two adjacent syllables
    /// (`fang` + `an` as `fan` + `gan`).
    fn resplits(&self, _left: &str, _right: &str) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Complete syllables a partial key may stand for.
    fn completions(&self, _partial: &str) -> Vec<String> {
        Vec::new()
    }
}

#[derive(Debug, Clone)]
struct ScoredPhrase {
    text: String,
    score: f32,
    corrected: bool,
}

/// Phrases per span range, looked up on demand and kept for one request.
struct PhraseTable<'a, P> {
    engine: &'a Engine<P>,
    choices: Vec<Vec<(String, f32)>>,
    memo: HashMap<(usize, usize), Vec<ScoredPhrase>>,
}

impl<'a, P: SyllableParser> PhraseTable<'a, P> {
    fn new(engine: &'a Engine<P>, spans: &[SyllableSpan]) -> Self {
        let choices = spans.iter().map(|s| engine.key_choices(s)).collect();
        Self {
            engine,
            choices,
            memo: HashMap::new(),
        }
    }

    /// Phrases covering spans `[i, j)`, best first.
    fn get(&mut self, i: usize, j: usize) -> &[ScoredPhrase] {
        let engine = self.engine;
        let choices = &self.choices;
        self.memo
            .entry((i, j))
            .or_insert_with(|| engine.lookup_range(&choices[i..j]))
    }
}

/// Generic engine shared by every session of one language.
///
/// Immutable after construction, so it can sit behind an `Arc` and serve
/// sessions on any thread.
#[derive(Debug)]
pub struct Engine<P> {
    lexicon: Lexicon,
    parser: P,
    config: Config,
}

impl<P: SyllableParser> Engine<P> {
    pub fn new(lexicon: Lexicon, parser: P, config: Config) -> Self {
        Self {
            lexicon,
            parser,
            config,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn segment(&self, input: &str) -> Vec<SyllableSpan> {
        self.parser.segment(input)
    }

    fn max_phrase_len(&self) -> usize {
        self.config
            .max_phrase_length
            .min(self.lexicon.max_syllables())
            .max(1)
    }

    /// Lexicon keys a span may stand for, with the penalty of each reading.
    fn key_choices(&self, span: &SyllableSpan) -> Vec<(String, f32)> {
        match &span.key {
            SyllableKey::Complete(s) => {
                let mut out = vec![(s.clone(), span.distance)];
                out.extend(
                    span.alternatives
                        .iter()
                        .map(|(alt, p)| (alt.clone(), span.distance + p)),
                );
                out
            }
            SyllableKey::Partial(s) if self.config.allow_incomplete => self
                .parser
                .completions(s)
                .into_iter()
                .map(|full| (full, span.distance))
                .collect(),
            SyllableKey::Partial(_) | SyllableKey::Unresolved(_) => Vec::new(),
        }
    }

    fn score(&self, freq: u64, penalty: f32, syllables: usize) -> f32 {
        self.lexicon.log_prob(freq) - penalty
            + self.config.phrase_length_weight * syllables.saturating_sub(1) as f32
    }

    /// Every phrase reachable from the given per-span choices, one entry per
    /// text with its best score.
    fn lookup_range(&self, choices: &[Vec<(String, f32)>]) -> Vec<ScoredPhrase> {
        if choices.iter().any(|c| c.is_empty()) {
            return Vec::new();
        }
        let mut best: HashMap<String, ScoredPhrase> = HashMap::new();
        for (keys, penalty) in
            FuzzyMap::expand_sequence(choices, self.config.fuzzy_expansion_limit)
        {
            let key = join_key(&keys);
            for entry in self.lexicon.entries(&key) {
                let cand = ScoredPhrase {
                    text: entry.text.clone(),
                    score: self.score(entry.freq, penalty, keys.len()),
                    corrected: penalty > 0.0,
                };
                match best.get(&cand.text) {
                    Some(existing) if existing.score >= cand.score => {}
                    _ => {
                        best.insert(cand.text.clone(), cand);
                    }
                }
            }
        }
        let mut out: Vec<ScoredPhrase> = best.into_values().collect();
        out.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.text.cmp(&b.text))
        });
        out
    }

    /// Number of leading spans accounted for by an already-confirmed prefix.
    ///
    /// The prefix aligns when it is a phrase of its first `k` spans, with `k`
    /// its character count, or when each of its characters is a phrase of the
    /// matching single span. Otherwise it is context only and aligns no span.
    fn align_prefix(
        &self,
        table: &mut PhraseTable<'_, P>,
        prefix: &str,
        span_count: usize,
    ) -> usize {
        let chars: Vec<char> = prefix.chars().collect();
        let k = chars.len();
        if k == 0 || k > span_count {
            return 0;
        }
        if table.get(0, k).iter().any(|p| p.text == prefix) {
            return k;
        }
        let per_char = chars.iter().enumerate().all(|(i, ch)| {
            let ch = ch.to_string();
            table.get(i, i + 1).iter().any(|p| p.text == ch)
        });
        if per_char {
            k
        } else {
            0
        }
    }

    /// Ranked candidates for `spans`.
    ///
    /// A non-empty `prefix` is confirmed text for the leading spans it
    /// aligns with; candidates then continue after it and do not repeat it.
    /// A `constraint` fixes its spans: one at the start of the remaining
    /// spans is skipped over and prepended to the sentence guess, one further
    /// right is kept inside the sentence guess. A constraint starting inside
    /// the aligned prefix is ignored. No candidate at all is a normal outcome.
    pub fn generate(
        &self,
        spans: &[SyllableSpan],
        prefix: &str,
        constraint: Option<&Constraint>,
    ) -> Vec<Candidate> {
        let _span = debug_span!("generate", span_count = spans.len(), prefix).entered();
        let n = spans.len();
        if n == 0 {
            return Vec::new();
        }

        let mut table = PhraseTable::new(self, spans);
        let prefix = utils::normalize(prefix);
        let mut start = self.align_prefix(&mut table, &prefix, n);
        if !prefix.is_empty() && start == 0 {
            debug!(prefix = prefix.as_str(), "prefix does not align, using it as context only");
        }

        let mut lead: Option<&Constraint> = None;
        let mut forced: Option<&Constraint> = None;
        if let Some(c) = constraint {
            if c.end() > n {
                debug!(end = c.end(), n, "ignoring constraint beyond the parse");
            } else if c.start() == start {
                start = c.end();
                lead = Some(c);
            } else if c.start() > start {
                forced = Some(c);
            } else {
                debug!(start = c.start(), aligned = start, "ignoring constraint inside the prefix");
            }
        }

        let max_len = self.max_phrase_len();
        let limit_end = forced.map_or(n, |c| c.start());
        let mut out: Vec<Candidate> = Vec::new();

        if let Some(best) = self.guess_sentence(&mut table, start, n, forced, max_len) {
            let (text, score, corrected) = best;
            let (range_start, text) = match lead {
                Some(c) => (c.start(), format!("{}{}", c.text(), text)),
                None => (start, text),
            };
            if !text.is_empty() {
                out.push(
                    Candidate::new(text, CandidateKind::BestMatch, range_start..n, score)
                        .corrected(corrected),
                );
            }
        }

        if start < limit_end {
            for j in start + 1..=limit_end.min(start + max_len) {
                for p in table.get(start, j) {
                    out.push(
                        Candidate::new(p.text.clone(), CandidateKind::Normal, start..j, p.score)
                            .corrected(p.corrected),
                    );
                }
            }
            if self.config.use_divided_table {
                out.extend(self.divided_candidates(&spans[start], start));
            }
            if self.config.use_resplit_table && start + 2 <= limit_end {
                out.extend(self.resplit_candidates(&spans[start], &spans[start + 1], start));
            }
        }

        let ranked = rank_and_dedup(out, self.config.max_candidates);
        debug!(candidate_count = ranked.len(), start);
        ranked
    }

    /// Best-path sentence over spans `[start, n)`, passing through `forced`
    /// unchanged. Returns `(text, score, corrected)`.
    fn guess_sentence(
        &self,
        table: &mut PhraseTable<'_, P>,
        start: usize,
        n: usize,
        forced: Option<&Constraint>,
        max_len: usize,
    ) -> Option<(String, f32, bool)> {
        if start >= n {
            return Some((String::new(), 0.0, false));
        }

        // best[i]: (score, back pointer, phrase text, corrected so far)
        let mut best: Vec<Option<(f32, usize, String, bool)>> = vec![None; n + 1];
        best[start] = Some((0.0, start, String::new(), false));

        for i in start..n {
            let Some((base, _, _, base_corrected)) = best[i].clone() else {
                continue;
            };
            let mut relax = |j: usize, text: String, score: f32, corrected: bool| {
                let total = base + score;
                let better = match &best[j] {
                    Some((s, ..)) => total > *s,
                    None => true,
                };
                if better {
                    best[j] = Some((total, i, text, base_corrected || corrected));
                }
            };

            if let Some(c) = forced {
                if i == c.start() {
                    relax(c.end(), c.text().to_string(), 0.0, false);
                    continue;
                }
            }
            for j in i + 1..=n.min(i + max_len) {
                if let Some(c) = forced {
                    // phrases may not cross into the fixed segment
                    if i < c.start() && j > c.start() {
                        break;
                    }
                }
                if let Some(p) = table.get(i, j).first() {
                    relax(j, p.text.clone(), p.score, p.corrected);
                }
            }
        }

        let (score, _, _, corrected) = best[n].clone()?;
        let mut pieces = Vec::new();
        let mut cur = n;
        while cur > start {
            let (_, prev, text, _) = best[cur].as_ref()?;
            pieces.push(text.clone());
            cur = *prev;
        }
        pieces.reverse();
        trace!(pieces = ?pieces, score, "sentence guess");
        Some((pieces.concat(), score, corrected))
    }

    fn divided_candidates(&self, span: &SyllableSpan, index: usize) -> Vec<Candidate> {
        let SyllableKey::Complete(syllable) = &span.key else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (a, b) in self.parser.divisions(syllable) {
            for entry in self.lexicon.entries(&join_key(&[a.as_str(), b.as_str()])) {
                let score = self.score(entry.freq, span.distance, 2);
                out.push(
                    Candidate::new(
                        entry.text.clone(),
                        CandidateKind::Divided,
                        index..index + 1,
                        score,
                    )
                    .corrected(span.distance > 0.0),
                );
            }
        }
        out
    }

    fn resplit_candidates(
        &self,
        left: &SyllableSpan,
        right: &SyllableSpan,
        index: usize,
    ) -> Vec<Candidate> {
        let (SyllableKey::Complete(a), SyllableKey::Complete(b)) = (&left.key, &right.key) else {
            return Vec::new();
        };
        let penalty = left.distance + right.distance;
        let mut out = Vec::new();
        for (c, d) in self.parser.resplits(a, b) {
            for entry in self.lexicon.entries(&join_key(&[c.as_str(), d.as_str()])) {
                let score = self.score(entry.freq, penalty, 2);
                out.push(
                    Candidate::new(
                        entry.text.clone(),
                        CandidateKind::Resplit,
                        index..index + 2,
                        score,
                    )
                    .corrected(penalty > 0.0),
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits on `'` only; enough to drive the engine without a real parser.
    struct ApostropheParser;

    impl SyllableParser for ApostropheParser {
        fn segment(&self, input: &str) -> Vec<SyllableSpan> {
            let mut spans = Vec::new();
            let mut start = 0;
            for part in input.split('\'') {
                let len = part.chars().count();
                let extra = usize::from(start + len < input.chars().count());
                spans.push(SyllableSpan::new(
                    start,
                    len + extra,
                    SyllableKey::Complete(part.to_string()),
                ));
                start += len + extra;
            }
            spans
        }

        fn divisions(&self, syllable: &str) -> Vec<(String, String)> {
            match syllable {
                "xian" => vec![("xi".into(), "an".into())],
                _ => Vec::new(),
            }
        }
    }

    fn engine() -> Engine<ApostropheParser> {
        Engine::new(Lexicon::load_demo(), ApostropheParser, Config::default())
    }

    #[test]
    fn sentence_guess_prefers_whole_phrase() {
        let e = engine();
        let spans = e.segment("ni'hao");
        let cands = e.generate(&spans, "", None);
        assert_eq!(cands[0].kind, CandidateKind::BestMatch);
        assert_eq!(cands[0].text, "你好");
        assert!(cands.iter().any(|c| c.text == "你" && c.span_range == (0..1)));
    }

    #[test]
    fn unresolvable_span_drops_sentence_guess() {
        let e = engine();
        let spans = e.segment("ni'qqq");
        let cands = e.generate(&spans, "", None);
        assert!(cands.iter().all(|c| c.kind == CandidateKind::Normal));
        assert!(cands.iter().any(|c| c.text == "你"));
    }

    #[test]
    fn divided_candidate_covers_one_span() {
        let e = engine();
        let spans = e.segment("xian");
        let cands = e.generate(&spans, "", None);
        let divided = cands
            .iter()
            .find(|c| c.kind == CandidateKind::Divided)
            .expect("divided candidate");
        assert_eq!(divided.text, "西安");
        assert_eq!(divided.span_range, 0..1);
    }

    #[test]
    fn mid_constraint_is_kept_in_sentence() {
        let e = engine();
        let spans = e.segment("ni'hao");
        let fixed = Candidate::new("号", CandidateKind::Normal, 1..2, 0.0);
        let c = Constraint::new(1, fixed, spans.len()).unwrap();
        let cands = e.generate(&spans, "", Some(&c));
        assert_eq!(cands[0].text, "你号");
    }
}
