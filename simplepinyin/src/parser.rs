// simplepinyin/src/parser.rs
//
// Pinyin parser for syllable segmentation.
// - Trie of spellings: canonical syllables, correction variants and bare
//   initials, each pointing at the key it stands for
// - DP over the input picking the parse with the fewest unresolved spans,
//   then the fewest spans, then the smallest correction distance
// - `'` is an explicit separator, kept inside the span it follows
// - Fuzzy alternatives attached to each complete span for the generator

use simplepinyin_core::{FuzzyMap, SyllableKey, SyllableParser, SyllableSpan, TrieNode};
use tracing::{debug, trace};

use crate::config::PinyinConfig;
use crate::syllables::{self, INITIALS, PINYIN_SYLLABLES};

/// Explicit syllable separator.
pub const SEPARATOR: char = '\'';

/// Typed spelling → the key it stands for and the cost of reading it so.
type Reading = (SyllableKey, f32);

/// Accumulated cost of a parse. Compared field by field.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cost {
    unresolved: usize,
    distance: f32,
    spans: usize,
}

impl Cost {
    const ZERO: Cost = Cost {
        unresolved: 0,
        distance: 0.0,
        spans: 0,
    };

    fn step(self, unresolved: bool, distance: f32) -> Cost {
        Cost {
            unresolved: self.unresolved + usize::from(unresolved),
            distance: self.distance + distance,
            spans: self.spans + 1,
        }
    }

    fn better_than(&self, other: &Cost) -> bool {
        self.unresolved
            .cmp(&other.unresolved)
            .then_with(|| self.spans.cmp(&other.spans))
            .then_with(|| {
                self.distance
                    .partial_cmp(&other.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .is_lt()
    }
}

/// Best parse of the input suffix starting at some boundary.
#[derive(Debug, Clone)]
struct Step {
    cost: Cost,
    /// Boundary after this span and the separators attached to it.
    next: usize,
    key: SyllableKey,
    distance: f32,
}

/// Correction spellings of a canonical syllable enabled in `config`.
///
/// Variants that are themselves valid syllables are skipped.
pub fn correction_variants(syllable: &str, config: &PinyinConfig) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let replace_tail = |from: &str, to: &str| {
        syllable
            .strip_suffix(from)
            .map(|head| format!("{head}{to}"))
    };
    let jqxy = syllable.starts_with(['j', 'q', 'x', 'y']);

    let mut candidates: Vec<Option<String>> = Vec::new();
    if config.correct_gn_ng {
        candidates.push(replace_tail("ng", "gn"));
    }
    if config.correct_mg_ng {
        candidates.push(replace_tail("ng", "mg"));
    }
    if config.correct_iou_iu {
        candidates.push(replace_tail("iu", "iou"));
    }
    if config.correct_uei_ui {
        candidates.push(replace_tail("ui", "uei"));
    }
    if config.correct_uen_un {
        candidates.push(replace_tail("un", "uen"));
    }
    if config.correct_ue_ve {
        candidates.push(replace_tail("ve", "ue"));
        if jqxy {
            candidates.push(replace_tail("ue", "ve"));
        }
    }
    if config.correct_v_u && jqxy && syllable[1..].starts_with('u') {
        candidates.push(Some(format!("{}v{}", &syllable[..1], &syllable[2..])));
    }
    if config.correct_on_ong {
        candidates.push(replace_tail("ong", "on"));
    }

    for variant in candidates.into_iter().flatten() {
        if variant != syllable && !syllables::is_syllable(&variant) && !out.contains(&variant) {
            out.push(variant);
        }
    }
    out
}

/// Pinyin segmenter.
///
/// Public entrypoints:
/// - `Parser::new` to build the spelling trie from a `PinyinConfig`
/// - `SyllableParser::segment` to split raw input into spans
#[derive(Debug)]
pub struct Parser {
    trie: TrieNode<Reading>,
    fuzzy: FuzzyMap,
    fuzzy_penalty_multiplier: f32,
    unknown_penalty: f32,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(&PinyinConfig::default())
    }
}

impl Parser {
    pub fn new(config: &PinyinConfig) -> Self {
        let base = config.base();
        let mut parser = Self {
            trie: TrieNode::new(),
            fuzzy: FuzzyMap::from_rules(&base.fuzzy),
            fuzzy_penalty_multiplier: base.fuzzy_penalty_multiplier,
            unknown_penalty: base.unknown_penalty,
        };

        for &syllable in PINYIN_SYLLABLES {
            parser.register(syllable, SyllableKey::Complete(syllable.to_string()), 0.0);
        }
        let mut corrections = 0;
        for &syllable in PINYIN_SYLLABLES {
            for variant in correction_variants(syllable, config) {
                parser.register(
                    &variant,
                    SyllableKey::Complete(syllable.to_string()),
                    base.correction_penalty,
                );
                corrections += 1;
            }
        }
        if config.pinyin_incomplete {
            for &initial in INITIALS {
                if !syllables::is_syllable(initial) {
                    parser.register(
                        initial,
                        SyllableKey::Partial(initial.to_string()),
                        base.incomplete_penalty,
                    );
                }
            }
        }
        debug!(
            syllables = PINYIN_SYLLABLES.len(),
            corrections,
            incomplete = config.pinyin_incomplete,
            "pinyin parser ready"
        );
        parser
    }

    fn register(&mut self, spelling: &str, key: SyllableKey, distance: f32) {
        if self.trie.get(spelling).iter().any(|(k, _)| *k == key) {
            return;
        }
        self.trie.insert(spelling, (key, distance));
    }

    /// True if `spelling` is a registered spelling of any kind.
    pub fn contains_spelling(&self, spelling: &str) -> bool {
        self.trie.contains_word(&spelling.to_ascii_lowercase())
    }

    /// Keys a typed spelling resolves to, with their distance.
    pub fn readings(&self, spelling: &str) -> &[Reading] {
        self.trie.get(spelling)
    }

    /// Fuzzy alternatives of a complete syllable that are valid syllables
    /// themselves, with their scaled penalty. The syllable itself is
    /// excluded.
    pub fn fuzzy_alternatives(&self, syllable: &str) -> Vec<(String, f32)> {
        if self.fuzzy.is_empty() {
            return Vec::new();
        }
        self.fuzzy
            .alternatives(syllable)
            .into_iter()
            .skip(1)
            .filter(|(alt, _)| syllables::is_syllable(alt))
            .map(|(alt, p)| (alt, p * self.fuzzy_penalty_multiplier))
            .collect()
    }

    fn normalize(input: &str) -> Vec<char> {
        input
            .chars()
            .map(|c| match c {
                'ü' | 'Ü' => 'v',
                c => c.to_ascii_lowercase(),
            })
            .collect()
    }

    fn build_span(&self, start: usize, end: usize, step: &Step) -> SyllableSpan {
        let mut span = SyllableSpan::new(start, end - start, step.key.clone());
        span.distance = step.distance;
        if let SyllableKey::Complete(s) = &step.key {
            span.alternatives = self.fuzzy_alternatives(s);
        }
        span
    }
}

impl SyllableParser for Parser {
    fn segment(&self, input: &str) -> Vec<SyllableSpan> {
        let chars = Self::normalize(input);
        let n = chars.len();
        if n == 0 {
            return Vec::new();
        }

        let skip_separators = |mut j: usize| {
            while j < n && chars[j] == SEPARATOR {
                j += 1;
            }
            j
        };
        let lead = skip_separators(0);
        if lead == n {
            let raw: String = chars.iter().collect();
            return vec![SyllableSpan::new(0, n, SyllableKey::Unresolved(raw))];
        }

        // best[i]: cheapest parse of chars[i..]; separator positions stay None
        let mut best: Vec<Option<Step>> = vec![None; n + 1];

        for i in (lead..n).rev() {
            if chars[i] == SEPARATOR {
                continue;
            }
            let mut choice: Option<Step> = None;
            let mut consider = |next: usize, key: &SyllableKey, distance: f32, unresolved: bool,
                                best: &[Option<Step>]| {
                let rest = if next == n {
                    Cost::ZERO
                } else {
                    match &best[next] {
                        Some(step) => step.cost,
                        None => return,
                    }
                };
                let cost = rest.step(unresolved, distance);
                if choice.as_ref().map_or(true, |c| cost.better_than(&c.cost)) {
                    choice = Some(Step {
                        cost,
                        next,
                        key: key.clone(),
                        distance,
                    });
                }
            };

            // longest spelling first; equal costs keep the earlier choice
            for (end, readings) in self.trie.walk_prefixes(&chars, i).into_iter().rev() {
                let next = skip_separators(end);
                for (key, distance) in readings {
                    consider(next, key, *distance, false, &best);
                }
            }
            let unknown = SyllableKey::Unresolved(chars[i].to_string());
            consider(skip_separators(i + 1), &unknown, self.unknown_penalty, true, &best);

            best[i] = choice;
        }

        let mut spans = Vec::new();
        let mut cur = lead;
        while cur < n {
            let Some(step) = &best[cur] else {
                break;
            };
            let start = if spans.is_empty() { 0 } else { cur };
            spans.push(self.build_span(start, step.next, step));
            cur = step.next;
        }

        trace!(
            input,
            keys = ?spans.iter().map(|s| s.key.as_str()).collect::<Vec<_>>(),
            "segmented"
        );
        spans
    }

    fn divisions(&self, syllable: &str) -> Vec<(String, String)> {
        syllables::divisions(syllable)
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    fn resplits(&self, left: &str, right: &str) -> Vec<(String, String)> {
        syllables::resplits(left, right)
    }

    fn completions(&self, partial: &str) -> Vec<String> {
        syllables::completions(partial)
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
