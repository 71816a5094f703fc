//! simplepinyin-core
//!
//! Language-neutral conversion core shared by the pinyin crate: phrase
//! lexicon, syllable spans, candidate generation, constraints and the
//! per-session `Instance`.
//!
//! Public API:
//! - `Lexicon` - syllable-key → phrase dictionary (in memory, text table, fst + bincode)
//! - `SyllableSpan` / `SyllableKey` - segmentation output
//! - `Candidate` / `CandidateKind` - ranked conversion results
//! - `MatchSpan` - cumulative consumed lengths and per-candidate match length
//! - `Engine` - lexicon + parser, shared read-only between sessions
//! - `Instance` - one conversion session with its constraint slot
//! - `Config` - scoring penalties and feature switches
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod trie;
pub use trie::TrieNode;

pub mod fuzzy;
pub use fuzzy::{FuzzyMap, FuzzyRule};

pub mod lexicon;
pub use lexicon::{Lexicon, PhraseEntry};

pub mod span;
pub use span::{compute_match_length, MatchSpan, SyllableKey, SyllableSpan};

pub mod candidate;
pub use candidate::{Candidate, CandidateKind};

pub mod constraint;
pub use constraint::Constraint;

pub mod engine;
pub use engine::{Engine, SyllableParser};

pub mod session;
pub use session::{Conversion, Instance};

/// Generic configuration for the conversion core.
///
/// Penalties are in score units (natural-log frequency), so a penalty of
/// `1.0` costs as much as a phrase being `e` times rarer. Language-specific
/// switches (pinyin corrections) live in the language crate's config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Fuzzy equivalence rules (e.g., "zh=z", "an=ang:1.5").
    /// Language crates populate this with their defaults.
    pub fuzzy: Vec<String>,

    /// Cost of reading a typed spelling through a correction rule
    /// (`bagn` as `bang`).
    pub correction_penalty: f32,
    /// Multiplier applied to a fuzzy rule's own penalty.
    pub fuzzy_penalty_multiplier: f32,
    /// Cost of a bare initial standing for a whole syllable.
    pub incomplete_penalty: f32,
    /// Segmentation cost of a character that forms no spelling.
    pub unknown_penalty: f32,

    /// Score bonus per syllable beyond the first in a phrase. Positive
    /// values prefer longer phrases.
    pub phrase_length_weight: f32,
    /// Longest phrase, in syllables, considered during generation.
    pub max_phrase_length: usize,
    /// Maximum candidates returned per request (0 = unlimited).
    pub max_candidates: usize,
    /// Maximum key sequences tried per span range (0 = unlimited). Fuzzy
    /// alternatives and partial-key completions both count toward it.
    pub fuzzy_expansion_limit: usize,

    /// Entries in each session's segmentation cache.
    pub max_cache_size: usize,

    /// Let partial keys (bare initials) resolve to their completions.
    pub allow_incomplete: bool,
    /// Offer candidates that read one syllable as two (`xian` as `xi'an`).
    pub use_divided_table: bool,
    /// Offer candidates that move a boundary between two syllables.
    pub use_resplit_table: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fuzzy: vec![],
            correction_penalty: 2.0,
            fuzzy_penalty_multiplier: 1.5,
            incomplete_penalty: 3.0,
            unknown_penalty: 10.0,
            phrase_length_weight: 3.0,
            max_phrase_length: 8,
            max_candidates: 64,
            fuzzy_expansion_limit: 512,
            max_cache_size: 64,
            allow_incomplete: true,
            use_divided_table: true,
            use_resplit_table: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}
