//! Thread-local cache of anchored regexes
//!
//! Regex rules always match at the current input index, so every pattern is
//! compiled as `^(?:pattern)`. Grammars built on the same thread that reuse a
//! pattern share one compiled program.

use super::error::GrammarError;
use hashbrown::HashMap;
use regex::Regex;
use std::cell::RefCell;

thread_local! {
    /// Pattern as written -> anchored compiled regex
    static ANCHORED: RefCell<HashMap<String, Regex>> = RefCell::new(HashMap::new());
}

/// Compile `pattern` anchored at the start of the haystack, reusing a cached
/// program when one exists
pub fn compile_anchored(pattern: &str) -> Result<Regex, GrammarError> {
    ANCHORED.with(|cache| {
        if let Some(regex) = cache.borrow().get(pattern) {
            return Ok(regex.clone());
        }

        let regex =
            Regex::new(&format!("^(?:{})", pattern)).map_err(|e| GrammarError::InvalidRegex {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
        cache
            .borrow_mut()
            .insert(pattern.to_string(), regex.clone());
        Ok(regex)
    })
}

/// Drop every cached program on this thread
pub fn clear_cache() {
    ANCHORED.with(|cache| cache.borrow_mut().clear());
}

/// Number of programs cached on this thread
pub fn cache_size() -> usize {
    ANCHORED.with(|cache| cache.borrow().len())
}
