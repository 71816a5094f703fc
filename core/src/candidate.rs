//! Conversion candidates and their ranking.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::Range;

/// How a candidate relates to the current parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateKind {
    /// Sentence guess covering every remaining span.
    BestMatch,
    /// One span read as two syllables (`xian` as `xi'an`).
    Divided,
    /// Two spans whose boundary moves (`fang'an` as `fan'gan`).
    Resplit,
    /// A phrase over consecutive spans of the parse as segmented.
    Normal,
}

/// A single conversion candidate.
///
/// `span_range` indexes spans of the parse the candidate was generated from.
/// Scores are relative; higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub kind: CandidateKind,
    pub span_range: Range<usize>,
    pub score: f32,
    /// Reached through a fuzzy rule or a spelling correction.
    pub corrected: bool,
}

impl Candidate {
    pub fn new<T: Into<String>>(
        text: T,
        kind: CandidateKind,
        span_range: Range<usize>,
        score: f32,
    ) -> Self {
        Candidate {
            text: text.into(),
            kind,
            span_range,
            score,
            corrected: false,
        }
    }

    pub fn corrected(mut self, corrected: bool) -> Self {
        self.corrected = corrected;
        self
    }

    /// 1-based position reached by choosing this candidate, counted in
    /// syllables after any division. A divided candidate turns one span into
    /// two keys, so its selection sits one past the span end.
    pub fn selection_index(&self) -> usize {
        match self.kind {
            CandidateKind::Divided => self.span_range.end + 1,
            CandidateKind::BestMatch | CandidateKind::Resplit | CandidateKind::Normal => {
                self.span_range.end
            }
        }
    }

    /// Number of spans consumed from the start of the parse.
    pub fn consumed_spans(&self) -> usize {
        self.span_range.end
    }
}

/// Total order used to rank candidates, best first: the sentence guess,
/// then exact before corrected, higher score, fewer consumed spans, and
/// finally the text itself.
pub fn rank_cmp(a: &Candidate, b: &Candidate) -> Ordering {
    let pinned = |c: &Candidate| c.kind != CandidateKind::BestMatch;
    pinned(a)
        .cmp(&pinned(b))
        .then_with(|| a.corrected.cmp(&b.corrected))
        .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
        .then_with(|| a.consumed_spans().cmp(&b.consumed_spans()))
        .then_with(|| a.text.cmp(&b.text))
}

/// Sort best first and drop repeated texts, keeping the best-ranked one.
pub fn rank_and_dedup(mut candidates: Vec<Candidate>, limit: usize) -> Vec<Candidate> {
    candidates.sort_by(rank_cmp);
    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.text.clone()));
    if limit > 0 {
        candidates.truncate(limit);
    }
    candidates
}
