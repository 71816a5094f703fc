//! Conversion sessions.
//!
//! An `Instance` holds the mutable state of one conversion context: the raw
//! input, its parse, the constraint slot and the last candidate list. The
//! shared `Engine` is only read. One request runs
//! segment → generate → match lengths → reset, after which the instance is
//! ready for the next one.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use crate::candidate::Candidate;
use crate::constraint::Constraint;
use crate::engine::{Engine, SyllableParser};
use crate::error::{Error, Result};
use crate::span::{MatchSpan, SyllableSpan};

/// Result of one request: candidate texts and, at the same index, how many
/// leading input characters each one consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub candidates: Vec<String>,
    pub match_lengths: Vec<usize>,
}

impl Conversion {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.candidates
            .iter()
            .map(String::as_str)
            .zip(self.match_lengths.iter().copied())
    }
}

/// One conversion session bound to a shared engine.
///
/// Not meant for concurrent use; create one per session instead.
pub struct Instance<P> {
    engine: Arc<Engine<P>>,
    input: String,
    spans: Vec<SyllableSpan>,
    constraint: Option<Constraint>,
    candidates: Vec<Candidate>,
    cache: LruCache<String, Vec<SyllableSpan>>,
}

impl<P: SyllableParser> Instance<P> {
    pub fn new(engine: Arc<Engine<P>>) -> Self {
        let capacity =
            NonZeroUsize::new(engine.config().max_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            engine,
            input: String::new(),
            spans: Vec::new(),
            constraint: None,
            candidates: Vec::new(),
            cache: LruCache::new(capacity),
        }
    }

    pub fn engine(&self) -> &Arc<Engine<P>> {
        &self.engine
    }

    /// Parse `raw` as the new input. Drops the previous constraint and
    /// candidates. Empty input is rejected.
    pub fn segment(&mut self, raw: &str) -> Result<&[SyllableSpan]> {
        if raw.is_empty() {
            return Err(Error::InvalidInput("empty pinyin input".into()));
        }
        let spans = match self.cache.get(raw) {
            Some(cached) => cached.clone(),
            None => {
                let spans = self.engine.segment(raw);
                self.cache.put(raw.to_string(), spans.clone());
                spans
            }
        };
        debug!(input = raw, span_count = spans.len(), "segmented");
        self.input = raw.to_string();
        self.spans = spans;
        self.constraint = None;
        self.candidates.clear();
        Ok(&self.spans)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn spans(&self) -> &[SyllableSpan] {
        &self.spans
    }

    /// Cumulative consumed lengths of the current parse.
    pub fn match_span(&self) -> Result<MatchSpan> {
        MatchSpan::from_spans(&self.spans)
    }

    /// Generate candidates for the current parse, continuing after `prefix`
    /// and honoring the active constraint.
    pub fn generate(&mut self, prefix: &str) -> &[Candidate] {
        self.candidates = self
            .engine
            .generate(&self.spans, prefix, self.constraint.as_ref());
        &self.candidates
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn count(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidate(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    /// Fix `candidate` at span `position`, replacing any earlier constraint.
    pub fn set_constraint(&mut self, position: usize, candidate: Candidate) -> Result<()> {
        let constraint = Constraint::new(position, candidate, self.spans.len())?;
        debug!(position, text = constraint.text(), "constraint set");
        self.constraint = Some(constraint);
        Ok(())
    }

    /// Remove the constraint at `position`. Returns whether one was removed.
    pub fn clear_constraint(&mut self, position: usize) -> bool {
        match &self.constraint {
            Some(c) if c.position == position => {
                self.constraint = None;
                true
            }
            _ => false,
        }
    }

    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    /// Clear the constraint and the candidate list. The parse is kept.
    pub fn reset(&mut self) {
        self.constraint = None;
        self.candidates.clear();
    }

    /// Characters of the current input consumed by `candidate`.
    pub fn match_length(&self, candidate: &Candidate) -> Result<usize> {
        Ok(self.match_span()?.match_length(candidate, &self.input))
    }

    /// Run a whole request and leave the instance reset for the next one.
    pub fn convert(&mut self, pinyin: &str, prefix: &str) -> Result<Conversion> {
        let _span = debug_span!("convert", pinyin, prefix).entered();
        self.segment(pinyin)?;
        self.generate(prefix);

        let result = self.collect();
        self.reset();
        result
    }

    fn collect(&self) -> Result<Conversion> {
        let match_span = self.match_span()?;
        let mut out = Conversion::default();
        out.candidates.try_reserve_exact(self.candidates.len())?;
        out.match_lengths.try_reserve_exact(self.candidates.len())?;
        for cand in &self.candidates {
            out.candidates.push(cand.text.clone());
            out.match_lengths
                .push(match_span.match_length(cand, &self.input));
        }
        debug!(candidate_count = out.len(), "converted");
        Ok(out)
    }
}
