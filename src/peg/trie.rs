//! Byte-level prefix trie for string-set rules
//!
//! A `StringSet` rule matches the longest candidate that is a prefix of the
//! remaining input. The trie walks the input once and remembers the deepest
//! terminal node it passed.

use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Default)]
struct TrieNode {
    /// Outgoing edges sorted by byte
    edges: Vec<(u8, usize)>,
    terminal: bool,
}

/// Prefix trie over a fixed set of byte strings
#[derive(Debug, Clone)]
pub struct StringTrie {
    nodes: Vec<TrieNode>,
    /// Distinct candidates, sorted
    candidates: Vec<String>,
}

impl StringTrie {
    /// Build a trie from `candidates`; duplicates are ignored
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut candidates: Vec<String> = candidates.into_iter().map(Into::into).collect();
        candidates.sort();
        candidates.dedup();

        let mut nodes = vec![TrieNode::default()];
        for candidate in &candidates {
            let mut node = 0;
            for &b in candidate.as_bytes() {
                node = match nodes[node].edges.binary_search_by_key(&b, |(k, _)| *k) {
                    Ok(pos) => nodes[node].edges[pos].1,
                    Err(pos) => {
                        let next = nodes.len();
                        nodes.push(TrieNode::default());
                        nodes[node].edges.insert(pos, (b, next));
                        next
                    }
                };
            }
            nodes[node].terminal = true;
        }

        Self { nodes, candidates }
    }

    /// Length of the longest candidate that is a prefix of `input`
    pub fn longest_match(&self, input: &[u8]) -> Option<usize> {
        let mut node = 0;
        let mut best = self.nodes[0].terminal.then_some(0);

        for (i, b) in input.iter().enumerate() {
            let edges = &self.nodes[node].edges;
            match edges.binary_search_by_key(b, |(k, _)| *k) {
                Ok(pos) => node = edges[pos].1,
                Err(_) => break,
            }
            if self.nodes[node].terminal {
                best = Some(i + 1);
            }
        }

        best
    }

    /// The distinct candidates in sorted order
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Number of distinct candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the trie holds no candidates
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl PartialEq for StringTrie {
    fn eq(&self, other: &Self) -> bool {
        self.candidates == other.candidates
    }
}

impl Eq for StringTrie {}

impl Hash for StringTrie {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.candidates.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_match_wins() {
        let trie = StringTrie::new(["foo", "football", "foobar"]);
        assert_eq!(trie.longest_match(b"football!"), Some(8));
        assert_eq!(trie.longest_match(b"foobar"), Some(6));
        assert_eq!(trie.longest_match(b"fooba"), Some(3));
        assert_eq!(trie.longest_match(b"fo"), None);
    }

    #[test]
    fn test_empty_candidate_matches_everywhere() {
        let trie = StringTrie::new(["", "x"]);
        assert_eq!(trie.longest_match(b"y"), Some(0));
        assert_eq!(trie.longest_match(b"xy"), Some(1));
    }

    #[test]
    fn test_duplicates_collapse() {
        let a = StringTrie::new(["b", "a", "b"]);
        let b = StringTrie::new(["a", "b"]);
        assert_eq!(a.len(), 2);
        assert_eq!(a, b);
        assert_eq!(a.candidates(), &["a".to_string(), "b".to_string()]);
    }
}
