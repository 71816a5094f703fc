//! Pinyin-specific configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All generic options from `simplepinyin_core::Config` (flattened via serde)
//! - Abbreviated (incomplete) pinyin
//! - Pinyin-specific correction switches (gn/ng, ue/ve, v/u, ...)
//!
//! # Example
//!
//! ```rust
//! use simplepinyin::PinyinConfig;
//!
//! let config = PinyinConfig::from_toml_str("correct_on_ong = false\nmax_candidates = 10\n").unwrap();
//! assert!(!config.correct_on_ong);
//! assert_eq!(config.base().max_candidates, 10);
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PinyinConfig {
    /// Base configuration fields (fuzzy rules, penalties, limits)
    #[serde(flatten)]
    pub base: simplepinyin_core::Config,

    // Bare initials typed as abbreviations (e.g., "zh", "b")
    pub pinyin_incomplete: bool,

    // Correction options for common misspellings
    pub correct_gn_ng: bool,   // bagn -> bang
    pub correct_mg_ng: bool,   // bamg -> bang
    pub correct_iou_iu: bool,  // liou -> liu
    pub correct_uei_ui: bool,  // guei -> gui
    pub correct_uen_un: bool,  // luen -> lun
    pub correct_ue_ve: bool,   // lue -> lve, jve -> jue
    pub correct_v_u: bool,     // jv -> ju
    pub correct_on_ong: bool,  // zhon -> zhong
}

impl Default for PinyinConfig {
    fn default() -> Self {
        Self {
            base: simplepinyin_core::Config::default(),
            pinyin_incomplete: true,
            correct_gn_ng: true,
            correct_mg_ng: true,
            correct_iou_iu: true,
            correct_uei_ui: true,
            correct_uen_un: true,
            correct_ue_ve: true,
            correct_v_u: true,
            correct_on_ong: true,
        }
    }
}

impl PinyinConfig {
    /// Convert this pinyin config into the base config.
    pub fn into_base(self) -> simplepinyin_core::Config {
        self.base
    }

    pub fn base(&self) -> &simplepinyin_core::Config {
        &self.base
    }

    /// Turn every correction family on or off at once.
    pub fn set_all_corrections(&mut self, enabled: bool) {
        self.correct_gn_ng = enabled;
        self.correct_mg_ng = enabled;
        self.correct_iou_iu = enabled;
        self.correct_uei_ui = enabled;
        self.correct_uen_un = enabled;
        self.correct_ue_ve = enabled;
        self.correct_v_u = enabled;
        self.correct_on_ong = enabled;
    }

    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Returns the default fuzzy matching rules for Pinyin input.
///
/// These rules handle common confusion patterns in Mandarin pronunciation:
/// - Retroflex vs non-retroflex initials: zh=z, ch=c, sh=s
/// - Nasal finals: an=ang, en=eng, in=ing, ian=iang, uan=uang
/// - Common consonant confusions: l=n, f=h, l=r, k=g
///
/// Rules are bidirectional once loaded into a `FuzzyMap`. None is enabled by
/// default; put them in `Config::fuzzy` to opt in.
pub fn pinyin_default_fuzzy_rules() -> Vec<String> {
    [
        // Retroflex vs non-retroflex
        "zh=z", "ch=c", "sh=s",
        // Nasal finals
        "an=ang", "en=eng", "in=ing", "ian=iang", "uan=uang",
        // Consonant confusions
        "l=n", "f=h", "l=r", "k=g",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
