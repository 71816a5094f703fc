//! simplepinyin crate root
//!
//! This crate provides the pinyin syllable tables, the pinyin `Parser` and a
//! shared `Context` that composes the parser with the `simplepinyin-core`
//! lexicon and candidate generator.
//!
//! Public API exported here:
//! - `Context` - process-wide lexicon + parser, shared through `Arc`
//! - `Instance` - one conversion session created from a `Context`
//! - `Parser` from `parser`
//! - `PinyinConfig` from `config`
//!
//! ```rust
//! use simplepinyin::Context;
//!
//! let ctx = Context::demo();
//! let mut instance = ctx.new_instance();
//! let conv = instance.convert("nihao", "").unwrap();
//! assert_eq!(conv.candidates[0], "你好");
//! assert_eq!(conv.match_lengths[0], 5);
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

pub mod config;
pub mod parser;
pub mod syllables;

pub use config::{pinyin_default_fuzzy_rules, PinyinConfig};
pub use parser::Parser;
pub use syllables::PINYIN_SYLLABLES;

// Re-export the core types callers need alongside a context.
pub use simplepinyin_core::{
    Candidate, CandidateKind, Config, Conversion, Error, Lexicon, MatchSpan, Result,
    SyllableKey, SyllableParser, SyllableSpan,
};

/// Conversion session bound to the pinyin parser.
pub type Instance = simplepinyin_core::Instance<Parser>;

/// Shared conversion state: lexicon, parser and configuration.
///
/// Immutable after construction. The inner engine sits behind an `Arc`, so
/// cloning a context is cheap and every instance keeps it alive.
#[derive(Clone, Debug)]
pub struct Context {
    inner: Arc<simplepinyin_core::Engine<Parser>>,
}

impl Context {
    pub fn new(lexicon: Lexicon, config: PinyinConfig) -> Self {
        let parser = Parser::new(&config);
        debug!(entries = lexicon.len(), "context ready");
        Self {
            inner: Arc::new(simplepinyin_core::Engine::new(
                lexicon,
                parser,
                config.into_base(),
            )),
        }
    }

    /// Load from a data directory holding `lexicon.fst` and
    /// `lexicon.bincode`.
    pub fn from_data_dir<P: AsRef<Path>>(dir: P, config: PinyinConfig) -> Result<Self> {
        let lexicon = Lexicon::load_fst_bincode(dir.as_ref()).map_err(Error::into_initialization)?;
        Ok(Self::new(lexicon, config))
    }

    /// Load from a text phrase table.
    pub fn from_table<P: AsRef<Path>>(path: P, config: PinyinConfig) -> Result<Self> {
        let lexicon = Lexicon::load_table(path.as_ref()).map_err(Error::into_initialization)?;
        Ok(Self::new(lexicon, config))
    }

    /// Load from `data_dir` if given, else from `table`, else fall back to
    /// the built-in demo lexicon.
    pub fn open(
        data_dir: Option<&Path>,
        table: Option<&Path>,
        config: PinyinConfig,
    ) -> Result<Self> {
        if let Some(dir) = data_dir {
            return Self::from_data_dir(dir, config);
        }
        if let Some(table) = table {
            return Self::from_table(table, config);
        }
        warn!("no data directory or phrase table given, using the built-in demo lexicon");
        Ok(Self::new(Lexicon::load_demo(), config))
    }

    /// Small built-in lexicon with default configuration.
    pub fn demo() -> Self {
        Self::new(Lexicon::load_demo(), PinyinConfig::default())
    }

    /// Start a new session sharing this context.
    pub fn new_instance(&self) -> Instance {
        Instance::new(Arc::clone(&self.inner))
    }

    pub fn engine(&self) -> &Arc<simplepinyin_core::Engine<Parser>> {
        &self.inner
    }

    pub fn lexicon(&self) -> &Lexicon {
        self.inner.lexicon()
    }

    pub fn parser(&self) -> &Parser {
        self.inner.parser()
    }

    pub fn config(&self) -> &Config {
        self.inner.config()
    }
}

/// Read a text phrase table and write `lexicon.fst` and `lexicon.bincode`
/// into `output`. Returns the number of keys written.
pub fn build_artifacts<P: AsRef<Path>, Q: AsRef<Path>>(table: P, output: Q) -> Result<usize> {
    let lexicon = Lexicon::load_table(table.as_ref())?;
    lexicon.save_fst_bincode(output.as_ref())?;
    info!(keys = lexicon.len(), output = %output.as_ref().display(), "built lexicon artifacts");
    Ok(lexicon.len())
}
