//! Caller-confirmed segments.

use crate::candidate::Candidate;
use crate::error::{Error, Result};

/// A candidate fixed at a span position. Generation treats the covered
/// spans as already converted text.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub position: usize,
    pub candidate: Candidate,
}

impl Constraint {
    /// Build a constraint, checking that `candidate` covers a non-empty run
    /// of spans starting at `position` inside a parse of `span_count` spans.
    pub fn new(position: usize, candidate: Candidate, span_count: usize) -> Result<Self> {
        let range = &candidate.span_range;
        if range.is_empty() {
            return Err(Error::InvalidInput(format!(
                "constraint candidate {:?} covers no spans",
                candidate.text
            )));
        }
        if range.start != position {
            return Err(Error::InvalidInput(format!(
                "constraint at {} but candidate starts at span {}",
                position, range.start
            )));
        }
        if range.end > span_count {
            return Err(Error::InvalidInput(format!(
                "candidate ends at span {} but the parse has {}",
                range.end, span_count
            )));
        }
        Ok(Self {
            position,
            candidate,
        })
    }

    pub fn start(&self) -> usize {
        self.candidate.span_range.start
    }

    pub fn end(&self) -> usize {
        self.candidate.span_range.end
    }

    pub fn text(&self) -> &str {
        &self.candidate.text
    }
}
