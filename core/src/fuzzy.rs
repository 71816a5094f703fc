//! Fuzzy equivalences between phonetic units.
//!
//! Rules are textual pairs such as `"zh=z"` or `"an=ang:1.5"`. A rule applies
//! to a whole syllable (`"zi=zhi"`), to its leading initial (`"zh=z"` turns
//! `zhang` into `zang`) or to its trailing final (`"an=ang"` turns `fan` into
//! `fang`). The map only rewrites spellings; whether a rewrite names a real
//! syllable is for the caller to check.
use std::collections::HashMap;

/// A single fuzzy rule with penalty.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyRule {
    pub from: String,
    pub to: String,
    /// Cost of using the rule, higher means less likely.
    pub penalty: f32,
}

impl FuzzyRule {
    pub fn new(from: &str, to: &str, penalty: f32) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            penalty,
        }
    }

    /// Parse `"a=b"` or `"a=b:penalty"`. Returns `None` for malformed text.
    pub fn parse(text: &str, default_penalty: f32) -> Option<Self> {
        let (rule, penalty) = match text.split_once(':') {
            Some((rule, p)) => (rule, p.trim().parse::<f32>().unwrap_or(default_penalty)),
            None => (text, default_penalty),
        };
        let (a, b) = rule.split_once('=')?;
        let (a, b) = (a.trim().to_ascii_lowercase(), b.trim().to_ascii_lowercase());
        if a.is_empty() || b.is_empty() || a == b {
            return None;
        }
        Some(Self::new(&a, &b, penalty))
    }
}

/// Fuzzy alternatives for syllables.
#[derive(Debug, Clone, Default)]
pub struct FuzzyMap {
    /// from -> [(to, penalty)]
    map: HashMap<String, Vec<(String, f32)>>,
    default_penalty: f32,
}

impl FuzzyMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            default_penalty: 1.0,
        }
    }

    /// Build a map from rule strings; every pair is inserted in both
    /// directions. Malformed entries are skipped.
    pub fn from_rules<S: AsRef<str>>(rules: &[S]) -> Self {
        let mut fm = Self::new();
        for text in rules {
            match FuzzyRule::parse(text.as_ref(), fm.default_penalty) {
                Some(rule) => fm.add_rule(&rule.from, &rule.to, rule.penalty),
                None => tracing::debug!(rule = text.as_ref(), "skipping malformed fuzzy rule"),
            }
        }
        fm
    }

    /// Add a rule in both directions.
    pub fn add_rule(&mut self, from: &str, to: &str, penalty: f32) {
        self.add_rule_unidirectional(from, to, penalty);
        self.add_rule_unidirectional(to, from, penalty);
    }

    /// Add a rule only from `from` to `to`.
    pub fn add_rule_unidirectional(&mut self, from: &str, to: &str, penalty: f32) {
        let bucket = self.map.entry(from.to_string()).or_default();
        match bucket.iter_mut().find(|(t, _)| t == to) {
            Some(existing) => existing.1 = existing.1.min(penalty),
            None => bucket.push((to.to_string(), penalty)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Every spelling reachable from `syllable` by one rule, with the
    /// syllable itself first at penalty 0.0. Each spelling appears once with
    /// its cheapest penalty.
    pub fn alternatives(&self, syllable: &str) -> Vec<(String, f32)> {
        let key = syllable.trim().to_ascii_lowercase();
        let mut out: Vec<(String, f32)> = vec![(key.clone(), 0.0)];
        let mut push = |alt: String, penalty: f32| {
            match out.iter_mut().find(|(s, _)| *s == alt) {
                Some(existing) => existing.1 = existing.1.min(penalty),
                None => out.push((alt, penalty)),
            }
        };

        for (from, targets) in self.map.iter() {
            for (to, penalty) in targets {
                if key == *from {
                    push(to.clone(), *penalty);
                    continue;
                }
                if key.len() > from.len() {
                    if let Some(rest) = key.strip_prefix(from.as_str()) {
                        push(format!("{to}{rest}"), *penalty);
                    }
                    if let Some(head) = key.strip_suffix(from.as_str()) {
                        push(format!("{head}{to}"), *penalty);
                    }
                }
            }
        }

        // HashMap iteration order is unstable; keep output deterministic.
        out[1..].sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        out
    }

    /// Penalty for reading `a` as `b`, if they are equivalent.
    pub fn is_equivalent(&self, a: &str, b: &str) -> Option<f32> {
        let b = b.trim().to_ascii_lowercase();
        self.alternatives(a)
            .into_iter()
            .find(|(s, _)| *s == b)
            .map(|(_, p)| p)
    }

    /// Expand a sequence of per-position alternatives into whole sequences
    /// with their summed penalty, cheapest first. `limit == 0` means no
    /// limit.
    pub fn expand_sequence<T: Clone>(
        choices: &[Vec<(T, f32)>],
        limit: usize,
    ) -> Vec<(Vec<T>, f32)> {
        if choices.is_empty() {
            return vec![];
        }

        let mut results: Vec<(Vec<T>, f32)> = vec![(Vec::new(), 0.0)];
        for alts in choices {
            let mut next: Vec<(Vec<T>, f32)> = Vec::with_capacity(results.len() * alts.len());
            for (seq, current) in results.iter() {
                for (alt, penalty) in alts {
                    let mut ns = seq.clone();
                    ns.push(alt.clone());
                    next.push((ns, current + penalty));
                }
            }
            // stable sort keeps the exact path ahead of equal-cost ones
            next.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
            if limit > 0 {
                next.truncate(limit);
            }
            results = next;
        }
        results
    }
}
