//! Prefix trie mapping spellings to payloads.

use std::collections::HashMap;

/// A prefix tree over `char`s where each terminal node carries one or more
/// payloads.
///
/// The segmenter stores every registered spelling (canonical syllables,
/// correction variants, bare initials) with the key it resolves to, so that
/// walking the input from an offset yields every spelling that can start
/// there together with its resolutions.
///
/// # Example
/// ```
/// use simplepinyin_core::trie::TrieNode;
///
/// let mut trie = TrieNode::new();
/// trie.insert("ni", 1u8);
/// trie.insert("hao", 2u8);
///
/// assert!(trie.contains_word("ni"));
/// assert!(!trie.contains_word("n"));
///
/// let input: Vec<char> = "nihao".chars().collect();
/// let prefixes = trie.walk_prefixes(&input, 0);
/// assert_eq!(prefixes.len(), 1);
/// assert_eq!(prefixes[0], (2, &[1u8][..]));
/// ```
#[derive(Debug, Clone)]
pub struct TrieNode<V> {
    children: HashMap<char, Box<TrieNode<V>>>,
    /// Non-empty exactly when a registered spelling ends here.
    payloads: Vec<V>,
}

impl<V> Default for TrieNode<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TrieNode<V> {
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            payloads: Vec::new(),
        }
    }

    /// Register `word` with one more payload.
    pub fn insert(&mut self, word: &str, value: V) {
        let mut node = self;
        for ch in word.chars() {
            node = node
                .children
                .entry(ch)
                .or_insert_with(|| Box::new(TrieNode::new()));
        }
        node.payloads.push(value);
    }

    fn find(&self, word: &str) -> Option<&TrieNode<V>> {
        let mut node = self;
        for ch in word.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }

    /// True only if `word` was registered as a whole, not merely as a prefix.
    pub fn contains_word(&self, word: &str) -> bool {
        self.find(word).is_some_and(|n| !n.payloads.is_empty())
    }

    /// Payloads registered for exactly `word`.
    pub fn get(&self, word: &str) -> &[V] {
        self.find(word).map(|n| n.payloads.as_slice()).unwrap_or(&[])
    }

    /// Walk from `start` in `input` and return every registered spelling
    /// found along the way as `(end_index, payloads)`, shortest first.
    /// `end_index` is exclusive.
    pub fn walk_prefixes(&self, input: &[char], start: usize) -> Vec<(usize, &[V])> {
        let mut res = Vec::new();
        let mut node = self;
        let mut idx = start;
        while idx < input.len() {
            match node.children.get(&input[idx]) {
                Some(child) => {
                    node = child;
                    idx += 1;
                    if !node.payloads.is_empty() {
                        res.push((idx, node.payloads.as_slice()));
                    }
                }
                None => break,
            }
        }
        res
    }
}
