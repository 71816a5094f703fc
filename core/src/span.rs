//! Syllable spans over the raw input and the cumulative match lengths
//! derived from them.

use std::fmt;
use std::ops::Range;

use crate::candidate::{Candidate, CandidateKind};
use crate::error::Result;

/// Normalized phonetic unit used for lexicon lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyllableKey {
    /// A full syllable such as `hao`.
    Complete(String),
    /// An initial typed without its final, such as `zh`.
    Partial(String),
    /// Sentinel for input that forms no registered spelling.
    Unresolved(String),
}

impl SyllableKey {
    pub fn as_str(&self) -> &str {
        match self {
            SyllableKey::Complete(s) | SyllableKey::Partial(s) | SyllableKey::Unresolved(s) => s,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, SyllableKey::Complete(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, SyllableKey::Unresolved(_))
    }
}

impl fmt::Display for SyllableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognized unit of the raw input.
#[derive(Debug, Clone, PartialEq)]
pub struct SyllableSpan {
    /// Offset in characters from the start of the raw input.
    pub start: usize,
    /// Characters consumed, including any separator attached to the span.
    pub length: usize,
    pub key: SyllableKey,
    /// Correction cost paid to resolve the typed spelling to `key`.
    pub distance: f32,
    /// Fuzzy-equivalent complete syllables with their penalty. Does not
    /// include `key` itself.
    pub alternatives: Vec<(String, f32)>,
}

impl SyllableSpan {
    pub fn new(start: usize, length: usize, key: SyllableKey) -> Self {
        Self {
            start,
            length,
            key,
            distance: 0.0,
            alternatives: Vec::new(),
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// True if `spans` tile `[0, input_len)` without gaps or overlaps.
pub fn covers(spans: &[SyllableSpan], input_len: usize) -> bool {
    let mut pos = 0;
    for span in spans {
        if span.start != pos || span.length == 0 {
            return false;
        }
        pos = span.end();
    }
    pos == input_len
}

/// Cumulative consumed lengths, one per span.
///
/// `lengths()[i]` is the number of raw-input characters consumed by spans
/// `0..=i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSpan {
    cumulative: Vec<usize>,
}

impl MatchSpan {
    pub fn from_spans(spans: &[SyllableSpan]) -> Result<Self> {
        let mut cumulative = Vec::new();
        cumulative.try_reserve_exact(spans.len())?;
        let mut total = 0;
        for span in spans {
            total += span.length;
            cumulative.push(total);
        }
        Ok(Self { cumulative })
    }

    pub fn lengths(&self) -> &[usize] {
        &self.cumulative
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Characters of `raw_input` consumed by choosing `candidate`.
    pub fn match_length(&self, candidate: &Candidate, raw_input: &str) -> usize {
        compute_match_length(
            candidate.kind,
            candidate.selection_index(),
            &self.cumulative,
            raw_input.chars().count(),
        )
    }
}

/// Consumed length for a candidate of `kind` whose selection ends at the
/// 1-based `selection_index`.
///
/// - `BestMatch` covers the whole input.
/// - `Divided` reads `cumulative[selection_index - 2]`, clamped to the last
///   span: dividing one syllable adds one boundary. Only a single divided
///   syllable per candidate is accounted for.
/// - `Resplit` and `Normal` read `cumulative[selection_index - 1]`.
///
/// Indices that fall outside `cumulative` give 0. The result never exceeds
/// `input_len`.
pub fn compute_match_length(
    kind: CandidateKind,
    selection_index: usize,
    cumulative: &[usize],
    input_len: usize,
) -> usize {
    let consumed = match kind {
        CandidateKind::BestMatch => input_len,
        CandidateKind::Divided => match cumulative.len() {
            0 => 0,
            n => cumulative[selection_index.saturating_sub(2).min(n - 1)],
        },
        CandidateKind::Resplit | CandidateKind::Normal => selection_index
            .checked_sub(1)
            .and_then(|i| cumulative.get(i))
            .copied()
            .unwrap_or(0),
    };
    consumed.min(input_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_of(lengths: &[usize]) -> Vec<SyllableSpan> {
        let mut start = 0;
        lengths
            .iter()
            .map(|&len| {
                let s = SyllableSpan::new(start, len, SyllableKey::Complete("x".into()));
                start += len;
                s
            })
            .collect()
    }

    #[test]
    fn cumulative_lengths_are_monotonic() {
        let spans = spans_of(&[2, 3, 1]);
        let ms = MatchSpan::from_spans(&spans).unwrap();
        assert_eq!(ms.lengths(), &[2, 5, 6]);
        assert!(covers(&spans, 6));
        assert!(!covers(&spans, 7));
    }

    #[test]
    fn best_match_consumes_everything() {
        assert_eq!(compute_match_length(CandidateKind::BestMatch, 0, &[2, 5], 5), 5);
    }

    #[test]
    fn normal_and_resplit_read_through_selection() {
        let cum = [2, 5, 8];
        assert_eq!(compute_match_length(CandidateKind::Normal, 1, &cum, 8), 2);
        assert_eq!(compute_match_length(CandidateKind::Resplit, 3, &cum, 8), 8);
        assert_eq!(compute_match_length(CandidateKind::Normal, 0, &cum, 8), 0);
        assert_eq!(compute_match_length(CandidateKind::Normal, 9, &cum, 8), 0);
    }

    #[test]
    fn divided_clamps_both_ends() {
        let cum = [2, 5];
        // selection 1 on two spans: max(0, -1) = 0
        assert_eq!(compute_match_length(CandidateKind::Divided, 1, &cum, 5), 2);
        assert_eq!(compute_match_length(CandidateKind::Divided, 3, &cum, 5), 5);
        assert_eq!(compute_match_length(CandidateKind::Divided, 7, &cum, 5), 5);
        assert_eq!(compute_match_length(CandidateKind::Divided, 2, &[], 0), 0);
    }

    #[test]
    fn never_exceeds_input() {
        assert_eq!(compute_match_length(CandidateKind::Normal, 2, &[3, 9], 4), 4);
    }
}
