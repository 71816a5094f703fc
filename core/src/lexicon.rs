//! Phrase lexicon: syllable-sequence keys to script phrases.
//!
//! Keys are normalized syllables joined with `'` (`ni'hao`). Entries can be
//! inserted in memory, read from a text phrase table, or loaded from the
//! compact on-disk pair produced by [`Lexicon::save_fst_bincode`]:
//!
//! - `lexicon.fst`: `fst::Map` from key to payload index
//! - `lexicon.bincode`: `Vec<Vec<PhraseEntry>>` in index order
//!
//! A lexicon is built once and then shared read-only between sessions.

use ahash::AHashMap;
use fst::{Map, MapBuilder, Streamer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// Separator between syllables in a lexicon key.
pub const KEY_SEPARATOR: char = '\'';

pub const FST_FILE: &str = "lexicon.fst";
pub const PAYLOAD_FILE: &str = "lexicon.bincode";

/// A single phrase with its corpus frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseEntry {
    pub text: String,
    pub freq: u64,
}

impl PhraseEntry {
    pub fn new<T: Into<String>>(text: T, freq: u64) -> Self {
        Self {
            text: text.into(),
            freq,
        }
    }
}

/// Join syllables into a lexicon key.
pub fn join_key<S: AsRef<str>>(syllables: &[S]) -> String {
    let mut key = String::new();
    for (i, s) in syllables.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(s.as_ref());
    }
    key
}

fn normalize_key(key: &str) -> String {
    key.trim()
        .split(KEY_SEPARATOR)
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("'")
}

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    map: AHashMap<String, Vec<PhraseEntry>>,
    fst_map: Option<Map<Vec<u8>>>,
    payloads: Vec<Vec<PhraseEntry>>,
    total_freq: u64,
    max_syllables: usize,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a phrase for `key`. A repeated phrase accumulates frequency.
    pub fn insert<K: AsRef<str>, T: Into<String>>(&mut self, key: K, phrase: T, freq: u64) {
        let key = normalize_key(key.as_ref());
        if key.is_empty() {
            return;
        }
        let phrase = phrase.into();
        if !self.map.contains_key(&key) {
            // keep artifact entries visible once the key is shadowed in memory
            let inherited = self.artifact_entries(&key).to_vec();
            self.map.insert(key.clone(), inherited);
        }
        let syllables = key.split(KEY_SEPARATOR).count();
        let bucket = self.map.entry(key).or_default();
        match bucket.iter_mut().find(|e| e.text == phrase) {
            Some(e) => e.freq = e.freq.saturating_add(freq),
            None => bucket.push(PhraseEntry::new(phrase, freq)),
        }
        self.total_freq = self.total_freq.saturating_add(freq);
        self.max_syllables = self.max_syllables.max(syllables);
    }

    fn artifact_entries(&self, key: &str) -> &[PhraseEntry] {
        self.fst_map
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(|idx| self.payloads.get(idx as usize))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Phrases stored for `key`, in insertion order.
    pub fn entries(&self, key: &str) -> &[PhraseEntry] {
        match self.map.get(key) {
            Some(v) => v,
            None => self.artifact_entries(key),
        }
    }

    /// Phrase texts for `key`.
    pub fn lookup(&self, key: &str) -> Vec<String> {
        self.entries(key).iter().map(|e| e.text.clone()).collect()
    }

    pub fn contains_phrase(&self, key: &str, text: &str) -> bool {
        self.entries(key).iter().any(|e| e.text == text)
    }

    /// True if any phrase is stored for `key`.
    pub fn has_key(&self, key: &str) -> bool {
        !self.entries(key).is_empty()
    }

    /// Smoothed natural-log relative frequency of a phrase.
    pub fn log_prob(&self, freq: u64) -> f32 {
        let total = self.total_freq as f64 + 1.0;
        ((freq as f64 + 1.0) / total).ln() as f32
    }

    pub fn total_freq(&self) -> u64 {
        self.total_freq
    }

    /// Longest key in the lexicon, counted in syllables.
    pub fn max_syllables(&self) -> usize {
        self.max_syllables
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        let artifact_only = self
            .fst_map
            .as_ref()
            .map(|m| {
                let mut stream = m.keys();
                let mut n = 0;
                while let Some(k) = stream.next() {
                    if std::str::from_utf8(k).map_or(true, |k| !self.map.contains_key(k)) {
                        n += 1;
                    }
                }
                n
            })
            .unwrap_or(0);
        self.map.len() + artifact_only
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys with their entries, sorted by key.
    pub fn to_sorted(&self) -> BTreeMap<String, Vec<PhraseEntry>> {
        let mut out: BTreeMap<String, Vec<PhraseEntry>> = BTreeMap::new();
        if let Some(m) = &self.fst_map {
            let mut stream = m.stream();
            while let Some((k, idx)) = stream.next() {
                if let (Ok(k), Some(v)) = (std::str::from_utf8(k), self.payloads.get(idx as usize))
                {
                    out.insert(k.to_string(), v.clone());
                }
            }
        }
        for (k, v) in self.map.iter() {
            out.insert(k.clone(), v.clone());
        }
        out
    }

    /// Parse a text phrase table.
    ///
    /// Each non-empty, non-`#` line is either `key\tphrase\ttoken\tfreq`
    /// (tab separated, the converted-table layout) or `key phrase [freq]`
    /// (whitespace separated). A missing frequency counts as 1.
    pub fn from_table_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lx = Self::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = if trimmed.contains('\t') {
                trimmed.split('\t').map(str::trim).collect()
            } else {
                trimmed.split_whitespace().collect()
            };
            let (key, phrase, freq) = match parts.as_slice() {
                [key, phrase] => (*key, *phrase, "1"),
                [key, phrase, freq] => (*key, *phrase, *freq),
                [key, phrase, _token, freq, ..] => (*key, *phrase, *freq),
                _ => {
                    return Err(Error::Table {
                        line: i + 1,
                        reason: format!("expected key and phrase, got {:?}", trimmed),
                    })
                }
            };
            let freq = freq.parse::<u64>().map_err(|e| Error::Table {
                line: i + 1,
                reason: format!("bad frequency {:?}: {}", freq, e),
            })?;
            lx.insert(key, phrase, freq);
        }
        tracing::debug!(keys = lx.len(), total_freq = lx.total_freq, "parsed phrase table");
        Ok(lx)
    }

    pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_table_reader(BufReader::new(file))
    }

    /// Write `lexicon.fst` and `lexicon.bincode` into `dir`.
    pub fn save_fst_bincode<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let sorted = self.to_sorted();
        let mut builder = MapBuilder::new(BufWriter::new(File::create(dir.join(FST_FILE))?))?;
        let mut payloads: Vec<Vec<PhraseEntry>> = Vec::with_capacity(sorted.len());
        for (i, (k, v)) in sorted.into_iter().enumerate() {
            builder.insert(&k, i as u64)?;
            payloads.push(v);
        }
        builder.finish()?;

        let writer = BufWriter::new(File::create(dir.join(PAYLOAD_FILE))?);
        bincode::serialize_into(writer, &payloads)?;
        Ok(())
    }

    /// Load the pair written by [`Lexicon::save_fst_bincode`].
    pub fn load_fst_bincode<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let mut buf = Vec::new();
        File::open(dir.join(FST_FILE))?.read_to_end(&mut buf)?;
        let fst_map = Map::new(buf)?;

        let reader = BufReader::new(File::open(dir.join(PAYLOAD_FILE))?);
        let payloads: Vec<Vec<PhraseEntry>> = bincode::deserialize_from(reader)?;

        if fst_map.len() != payloads.len() {
            return Err(Error::Initialization(format!(
                "{} keys in {} but {} payloads in {}",
                fst_map.len(),
                FST_FILE,
                payloads.len(),
                PAYLOAD_FILE
            )));
        }

        let mut total_freq = 0u64;
        for e in payloads.iter().flatten() {
            total_freq = total_freq.saturating_add(e.freq);
        }
        let mut max_syllables = 0;
        let mut stream = fst_map.keys();
        while let Some(k) = stream.next() {
            let n = k.iter().filter(|b| **b == KEY_SEPARATOR as u8).count() + 1;
            max_syllables = max_syllables.max(n);
        }

        tracing::debug!(keys = payloads.len(), total_freq, "loaded lexicon artifacts");
        Ok(Self {
            map: AHashMap::new(),
            fst_map: Some(fst_map),
            payloads,
            total_freq,
            max_syllables,
        })
    }

    /// Save every entry as one bincode snapshot.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, &self.to_sorted())?;
        Ok(())
    }

    pub fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let sorted: BTreeMap<String, Vec<PhraseEntry>> = bincode::deserialize_from(reader)?;
        let mut lx = Self::new();
        for (k, entries) in sorted {
            for e in entries {
                lx.insert(&k, e.text, e.freq);
            }
        }
        Ok(lx)
    }

    /// Small built-in lexicon for demos and tests.
    pub fn load_demo() -> Self {
        let mut lx = Self::new();
        for (key, phrase, freq) in DEMO_PHRASES {
            lx.insert(key, *phrase, *freq);
        }
        lx
    }
}

const DEMO_PHRASES: &[(&str, &str, u64)] = &[
    ("ni", "你", 900),
    ("ni", "尼", 80),
    ("ni", "泥", 60),
    ("hao", "好", 800),
    ("hao", "号", 300),
    ("hao", "毫", 40),
    ("ni'hao", "你好", 500),
    ("ma", "吗", 600),
    ("ma", "妈", 200),
    ("ni'hao'ma", "你好吗", 50),
    ("wo", "我", 1000),
    ("ai", "爱", 400),
    ("wo'ai", "我爱", 30),
    ("ni'men", "你们", 300),
    ("men", "们", 500),
    ("zhong", "中", 700),
    ("zhong", "种", 200),
    ("guo", "国", 600),
    ("guo", "过", 500),
    ("zhong'guo", "中国", 900),
    ("zhong'guo'ren", "中国人", 120),
    ("ren", "人", 900),
    ("xian", "先", 300),
    ("xian", "现", 400),
    ("xian", "线", 150),
    ("xian'zai", "现在", 500),
    ("zai", "在", 900),
    ("xi", "西", 300),
    ("xi", "洗", 100),
    ("an", "安", 200),
    ("an", "按", 100),
    ("xi'an", "西安", 200),
    ("fang", "方", 300),
    ("fang", "放", 250),
    ("fan", "饭", 200),
    ("fan", "反", 150),
    ("gan", "感", 200),
    ("gan", "干", 300),
    ("fang'an", "方案", 250),
    ("fan'gan", "反感", 80),
    ("shi", "是", 1200),
    ("shi", "事", 300),
    ("jie", "界", 100),
    ("jie", "接", 200),
    ("shi'jie", "世界", 400),
    ("lve", "略", 50),
    ("nve", "虐", 30),
    ("jue", "觉", 200),
    ("jue'de", "觉得", 300),
    ("de", "的", 2000),
    ("de", "得", 400),
    ("liu", "六", 200),
    ("liu", "流", 150),
    ("zan", "咱", 100),
    ("zan'men", "咱们", 120),
    ("zhan", "站", 200),
    ("zhang", "张", 250),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut lx = Lexicon::new();
        lx.insert("ni'hao", "你好", 1);
        lx.insert("NI'HAO", "你号", 2);
        let res = lx.lookup("ni'hao");
        assert_eq!(res, vec!["你好".to_string(), "你号".to_string()]);
        assert_eq!(lx.max_syllables(), 2);
        assert_eq!(lx.total_freq(), 3);
    }

    #[test]
    fn duplicate_insert_increments_freq() {
        let mut lx = Lexicon::new();
        lx.insert("k", "x", 1);
        lx.insert("k", "x", 3);
        let entries = lx.entries("k");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].freq, 4);
    }

    #[test]
    fn log_prob_orders_by_frequency() {
        let lx = Lexicon::load_demo();
        assert!(lx.log_prob(900) > lx.log_prob(80));
        assert!(lx.log_prob(0) < 0.0);
    }

    #[test]
    fn table_parsing_accepts_both_layouts() {
        let text = "# comment\nni'hao\t你好\t17\t500\nni 你 900\nhao 好\n";
        let lx = Lexicon::from_table_reader(text.as_bytes()).unwrap();
        assert_eq!(lx.entries("ni'hao")[0].freq, 500);
        assert_eq!(lx.entries("ni")[0].freq, 900);
        assert_eq!(lx.entries("hao")[0].freq, 1);
    }

    #[test]
    fn table_parsing_reports_line() {
        let err = Lexicon::from_table_reader("ni 你\nbroken\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Table { line: 2, .. }));
    }

    #[test]
    fn bincode_snapshot_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "simplepinyin_lexicon_snapshot_{}.bincode",
            std::process::id()
        ));
        let lx = Lexicon::load_demo();
        lx.save_bincode(&path).unwrap();
        let loaded = Lexicon::load_bincode(&path).unwrap();
        assert_eq!(loaded.len(), lx.len());
        assert_eq!(loaded.entries("zhong'guo"), lx.entries("zhong'guo"));
        let _ = std::fs::remove_file(&path);
    }
}
