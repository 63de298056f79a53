//! Grammar construction
//!
//! [`GrammarBuilder`] owns the rule arena while a grammar is being defined.
//! Constructors return [`RuleId`]s and normalise degenerate arguments (an
//! empty sequence is `Empty`, a one-element set is a single character, ...).
//! Structurally equal nodes are interned, so asking twice for `'a'` yields one
//! node.
//!
//! # Self-referential productions
//!
//! A production is a named, optionally parameterized rule body. Bodies call
//! other productions, or themselves, through [`GrammarBuilder::production`]:
//!
//! 1. The first call for a key installs a `Reference` placeholder, then runs
//!    the body.
//! 2. A recursive call for the same key, made while the body is still
//!    running, returns the placeholder.
//! 3. When the body returns, the key resolves to the real rule; later calls
//!    return it directly.
//!
//! [`GrammarBuilder::build`] then rewrites every placeholder edge to the rule
//! its key resolved to, which is where cycles get wired in.
//!
//! ```rust
//! use pegknot::peg::{GrammarBuilder, GrammarError, RuleId};
//!
//! // expr := 'a' / '(' expr ')'
//! fn expr(b: &mut GrammarBuilder<()>) -> Result<RuleId, GrammarError> {
//!     b.production("expr", |b| {
//!         let a = b.ch(b'a');
//!         let open = b.ch(b'(');
//!         let inner = expr(b)?;
//!         let close = b.ch(b')');
//!         let nested = b.sequence([open, inner, close]);
//!         Ok(b.first_of([a, nested]))
//!     })
//! }
//!
//! let mut b = GrammarBuilder::new();
//! let root = expr(&mut b).unwrap();
//! let grammar = b.build(root).unwrap();
//! assert!(grammar.parse("((a))").unwrap().matched_entire_input);
//! ```

use super::char_class::{ByteSet, CharacterPattern};
use super::context::MatchContext;
use super::error::{ActionError, GrammarError};
use super::grammar::Grammar;
use super::regex_cache;
use super::rule::{ProductionKey, Rule, RuleId};
use super::trie::StringTrie;
use hashbrown::HashMap;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Construction state of a production key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProductionState {
    /// Body still running; the id is the placeholder
    Pending(RuleId),
    /// Body finished with this rule
    Resolved(RuleId),
}

/// Builder for a [`Grammar`]
pub struct GrammarBuilder<V> {
    /// Rule arena
    rules: Vec<Rule<V>>,

    /// Structural hash -> ids with that hash
    interned: HashMap<u64, Vec<RuleId>>,

    /// Hasher for interning
    hasher: ahash::RandomState,

    /// Production memo table
    productions: HashMap<ProductionKey, ProductionState>,

    /// One shared node per named character class
    classes: HashMap<CharacterPattern, RuleId>,
}

impl<V> Default for GrammarBuilder<V> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            interned: HashMap::new(),
            hasher: ahash::RandomState::new(),
            productions: HashMap::new(),
            classes: HashMap::new(),
        }
    }
}

impl<V> GrammarBuilder<V> {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rules created so far, placeholders included
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule has been created yet
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule created by this builder
    pub fn rule(&self, id: RuleId) -> Option<&Rule<V>> {
        self.rules.get(id.index())
    }

    /// Add `rule`, returning the id of an existing equal rule if there is one
    pub fn add(&mut self, rule: Rule<V>) -> RuleId {
        let hash = self.hasher.hash_one(&rule);
        let bucket = self.interned.entry(hash).or_default();
        if let Some(&existing) = bucket
            .iter()
            .find(|id| self.rules[id.index()] == rule)
        {
            return existing;
        }

        let id = RuleId::new(self.rules.len());
        self.rules.push(rule);
        bucket.push(id);
        id
    }

    // ========================================================================
    // Productions
    // ========================================================================

    /// Build the production identified by `key` with `body`, at most once
    ///
    /// A recursive call for `key` made while `body` runs returns a
    /// placeholder that [`build`](Self::build) later rewrites to the real
    /// rule. Once `body` has returned, every call with an equal key returns
    /// the same [`RuleId`]. If `body` fails, the key is forgotten and the
    /// error is returned.
    pub fn production<K, F>(&mut self, key: K, body: F) -> Result<RuleId, GrammarError>
    where
        K: Into<ProductionKey>,
        F: FnOnce(&mut Self) -> Result<RuleId, GrammarError>,
    {
        let key = key.into();
        match self.productions.get(&key) {
            Some(ProductionState::Pending(placeholder)) => return Ok(*placeholder),
            Some(ProductionState::Resolved(id)) => return Ok(*id),
            None => {}
        }

        let placeholder = self.add(Rule::Reference { key: key.clone() });
        self.productions
            .insert(key.clone(), ProductionState::Pending(placeholder));

        match body(self) {
            Ok(id) => {
                log_trace!("production {} resolved to {}", key, id);
                self.productions.insert(key, ProductionState::Resolved(id));
                Ok(id)
            }
            Err(err) => {
                self.productions.remove(&key);
                Err(err)
            }
        }
    }

    /// Whether `key` has finished building
    pub fn is_resolved(&self, key: &ProductionKey) -> bool {
        matches!(
            self.productions.get(key),
            Some(ProductionState::Resolved(_))
        )
    }

    // ========================================================================
    // Primitive rules
    // ========================================================================

    /// Always succeeds without consuming
    pub fn empty(&mut self) -> RuleId {
        self.add(Rule::Empty)
    }

    /// Always fails
    pub fn never(&mut self) -> RuleId {
        self.add(Rule::Never)
    }

    /// End of input
    pub fn eoi(&mut self) -> RuleId {
        self.add(Rule::EndOfInput)
    }

    /// Any single byte
    pub fn any_char(&mut self) -> RuleId {
        self.add(Rule::AnyChar)
    }

    /// Any single code point
    pub fn any_code_point(&mut self) -> RuleId {
        self.add(Rule::AnyCodePoint)
    }

    /// One byte
    pub fn ch(&mut self, byte: u8) -> RuleId {
        self.add(Rule::Char {
            byte,
            ignore_case: false,
        })
    }

    /// One byte, ASCII letters compared case-insensitively
    pub fn ch_ignore_case(&mut self, byte: u8) -> RuleId {
        if !byte.is_ascii_alphabetic() {
            return self.ch(byte);
        }
        self.add(Rule::Char {
            byte: byte.to_ascii_lowercase(),
            ignore_case: true,
        })
    }

    /// A byte in `low..=high`
    pub fn char_range(&mut self, low: u8, high: u8) -> Result<RuleId, GrammarError> {
        if low > high {
            return Err(GrammarError::InvalidArgument {
                reason: format!("character range {:#04x}..={:#04x} is inverted", low, high),
            });
        }
        if low == high {
            return Ok(self.ch(low));
        }
        Ok(self.add(Rule::CharRange { low, high }))
    }

    /// Any byte of `bytes`
    pub fn any_of(&mut self, bytes: impl AsRef<[u8]>) -> RuleId {
        let set: ByteSet = bytes.as_ref().iter().copied().collect();
        if set.is_empty() {
            return self.never();
        }
        if let Some(byte) = set.single() {
            return self.ch(byte);
        }
        self.add(Rule::CharSet {
            set,
            negated: false,
        })
    }

    /// Any byte not in `bytes`
    pub fn none_of(&mut self, bytes: impl AsRef<[u8]>) -> RuleId {
        let set: ByteSet = bytes.as_ref().iter().copied().collect();
        if set.is_empty() {
            return self.any_char();
        }
        self.add(Rule::CharSet { set, negated: true })
    }

    /// A byte accepted by `predicate`, labelled for traces and diagrams
    pub fn char_predicate<F>(
        &mut self,
        label: impl Into<Cow<'static, str>>,
        predicate: F,
    ) -> RuleId
    where
        F: Fn(u8) -> bool + Send + Sync + 'static,
    {
        self.add(Rule::CharPredicate {
            label: label.into(),
            predicate: Arc::new(predicate),
        })
    }

    /// A byte of a named character class
    pub fn class(&mut self, pattern: CharacterPattern) -> RuleId {
        if let Some(&id) = self.classes.get(&pattern) {
            return id;
        }
        let id = self.char_predicate(pattern.label(), pattern.predicate());
        self.classes.insert(pattern, id);
        id
    }

    /// One code point
    pub fn code_point(&mut self, value: char) -> RuleId {
        self.add(Rule::CodePoint {
            value,
            ignore_case: false,
        })
    }

    /// One code point, compared by simple case mapping
    pub fn code_point_ignore_case(&mut self, value: char) -> RuleId {
        let mut lower = value.to_lowercase();
        let folded = match (lower.next(), lower.next()) {
            (Some(c), None) => c,
            _ => value,
        };
        self.add(Rule::CodePoint {
            value: folded,
            ignore_case: true,
        })
    }

    /// A code point in `low..=high`
    pub fn code_point_range(&mut self, low: char, high: char) -> Result<RuleId, GrammarError> {
        if low > high {
            return Err(GrammarError::InvalidArgument {
                reason: format!("code point range {:?}..={:?} is inverted", low, high),
            });
        }
        if low == high {
            return Ok(self.code_point(low));
        }
        Ok(self.add(Rule::CodePointRange { low, high }))
    }

    /// Any code point of `chars`
    pub fn any_of_code_points(&mut self, chars: impl IntoIterator<Item = char>) -> RuleId {
        let set: BTreeSet<char> = chars.into_iter().collect();
        if set.is_empty() {
            return self.never();
        }
        if set.len() == 1 {
            if let Some(&only) = set.first() {
                return self.code_point(only);
            }
        }
        self.add(Rule::CodePointSet {
            set,
            negated: false,
        })
    }

    /// Any code point not in `chars`
    pub fn none_of_code_points(&mut self, chars: impl IntoIterator<Item = char>) -> RuleId {
        let set: BTreeSet<char> = chars.into_iter().collect();
        if set.is_empty() {
            return self.any_code_point();
        }
        self.add(Rule::CodePointSet { set, negated: true })
    }

    /// A code point accepted by `predicate`
    pub fn code_point_predicate<F>(
        &mut self,
        label: impl Into<Cow<'static, str>>,
        predicate: F,
    ) -> RuleId
    where
        F: Fn(char) -> bool + Send + Sync + 'static,
    {
        self.add(Rule::CodePointPredicate {
            label: label.into(),
            predicate: Arc::new(predicate),
        })
    }

    /// A literal string
    pub fn string(&mut self, literal: &str) -> RuleId {
        match literal.as_bytes() {
            [] => self.empty(),
            [byte] => self.ch(*byte),
            _ => self.add(Rule::String {
                literal: literal.to_string(),
                ignore_case: false,
            }),
        }
    }

    /// A literal string compared case-insensitively
    pub fn string_ignore_case(&mut self, literal: &str) -> RuleId {
        match literal.as_bytes() {
            [] => self.empty(),
            [byte] => self.ch_ignore_case(*byte),
            _ => self.add(Rule::String {
                literal: literal.to_lowercase(),
                ignore_case: true,
            }),
        }
    }

    /// The longest of `candidates` that prefixes the remaining input
    pub fn strings<I, S>(&mut self, candidates: I) -> Result<RuleId, GrammarError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let trie = StringTrie::new(candidates);
        match trie.candidates() {
            [] => Err(GrammarError::InvalidArgument {
                reason: "string set needs at least one candidate".to_string(),
            }),
            [only] => {
                let only = only.clone();
                Ok(self.string(&only))
            }
            _ => Ok(self.add(Rule::StringSet { trie })),
        }
    }

    /// A regex matched at the current index
    ///
    /// A plain ASCII bracket class such as `[0-9]` becomes the shared
    /// [`class`](Self::class) rule instead of a compiled regex.
    pub fn regex(&mut self, pattern: &str) -> Result<RuleId, GrammarError> {
        if let Some(class) = CharacterPattern::from_ascii_bracket(pattern) {
            return Ok(self.class(class));
        }
        let regex = regex_cache::compile_anchored(pattern)?;
        Ok(self.add(Rule::Regex {
            pattern: pattern.to_string(),
            regex,
        }))
    }

    // ========================================================================
    // Composite rules
    // ========================================================================

    /// All of `children` in order
    ///
    /// No children gives [`Rule::Empty`]. A single child replaces the
    /// sequence only when it restores the value stack on failure by itself
    /// (a sequence or an action); any other lone child stays wrapped so a
    /// failed match still rolls back.
    pub fn sequence(&mut self, children: impl IntoIterator<Item = RuleId>) -> RuleId {
        let children: Vec<RuleId> = children.into_iter().collect();
        match children.as_slice() {
            [] => self.empty(),
            // a lone child replaces the sequence only if it rolls back itself
            [only]
                if self
                    .rules
                    .get(only.index())
                    .is_some_and(Rule::is_transactional) =>
            {
                *only
            }
            _ => self.add(Rule::Sequence { children }),
        }
    }

    /// The first of `children` that matches
    pub fn first_of(&mut self, children: impl IntoIterator<Item = RuleId>) -> RuleId {
        let children: Vec<RuleId> = children.into_iter().collect();
        match children.as_slice() {
            [] => self.never(),
            [only] => *only,
            _ => self.add(Rule::FirstOf { children }),
        }
    }

    /// `child`, or nothing
    pub fn optional(&mut self, child: RuleId) -> RuleId {
        self.add(Rule::Optional { child })
    }

    /// `child` any number of times
    pub fn zero_or_more(&mut self, child: RuleId) -> RuleId {
        self.add(Rule::Repeat {
            child,
            min: 0,
            max: None,
        })
    }

    /// `child` at least once
    pub fn one_or_more(&mut self, child: RuleId) -> RuleId {
        self.add(Rule::Repeat {
            child,
            min: 1,
            max: None,
        })
    }

    /// `child` between `min` and `max` times (`None` = unbounded)
    pub fn repeat(
        &mut self,
        child: RuleId,
        min: usize,
        max: Option<usize>,
    ) -> Result<RuleId, GrammarError> {
        match max {
            Some(max) if max < min => Err(GrammarError::InvalidRepeatBounds { min, max }),
            Some(0) => Ok(self.empty()),
            Some(1) if min == 1 => Ok(child),
            Some(1) => Ok(self.optional(child)),
            _ => Ok(self.add(Rule::Repeat { child, min, max })),
        }
    }

    /// Positive lookahead
    pub fn test(&mut self, child: RuleId) -> RuleId {
        self.add(Rule::Test { child })
    }

    /// Negative lookahead
    pub fn test_not(&mut self, child: RuleId) -> RuleId {
        self.add(Rule::TestNot { child })
    }

    /// Run `action` with access to the value stack
    pub fn action<F>(&mut self, action: F) -> RuleId
    where
        F: Fn(&mut MatchContext<'_, '_, V>) -> Result<bool, ActionError> + Send + Sync + 'static,
    {
        self.add(Rule::Action {
            action: Arc::new(action),
            skippable: false,
        })
    }

    /// Like [`action`](Self::action), but succeeds without running inside a
    /// lookahead
    pub fn skippable_action<F>(&mut self, action: F) -> RuleId
    where
        F: Fn(&mut MatchContext<'_, '_, V>) -> Result<bool, ActionError> + Send + Sync + 'static,
    {
        self.add(Rule::Action {
            action: Arc::new(action),
            skippable: true,
        })
    }

    /// `then` when `condition` holds, else `otherwise` (or success)
    pub fn conditional<F>(
        &mut self,
        condition: F,
        then: RuleId,
        otherwise: Option<RuleId>,
    ) -> RuleId
    where
        F: Fn(&MatchContext<'_, '_, V>) -> bool + Send + Sync + 'static,
    {
        self.add(Rule::Conditional {
            condition: Arc::new(condition),
            then,
            otherwise,
        })
    }

    // ========================================================================
    // Finishing
    // ========================================================================

    /// Resolve placeholders and produce the grammar rooted at `root`
    ///
    /// Only rules reachable from `root` are kept; ids are renumbered in
    /// depth-first order with the root at 0.
    pub fn build(self, root: RuleId) -> Result<Grammar<V>, GrammarError> {
        let GrammarBuilder {
            mut rules,
            productions,
            ..
        } = self;

        // old id (placeholders included) -> new id
        let mut remap: Vec<Option<RuleId>> = vec![None; rules.len()];
        // old ids of kept rules, in new-id order
        let mut order: Vec<usize> = Vec::new();

        let root_target = resolve(&rules, &productions, root)?;
        remap[root_target.index()] = Some(RuleId::new(0));
        remap[root.index()] = Some(RuleId::new(0));
        order.push(root_target.index());

        let mut worklist = vec![root_target];
        while let Some(old) = worklist.pop() {
            for child in rules[old.index()].children() {
                let target = resolve(&rules, &productions, child)?;
                let new = match remap[target.index()] {
                    Some(new) => new,
                    None => {
                        let new = RuleId::new(order.len());
                        remap[target.index()] = Some(new);
                        order.push(target.index());
                        worklist.push(target);
                        new
                    }
                };
                remap[child.index()] = Some(new);
            }
        }

        let mut kept = Vec::with_capacity(order.len());
        for &old in &order {
            let mut rule = std::mem::replace(&mut rules[old], Rule::Never);
            rule.try_map_children(|child| {
                remap
                    .get(child.index())
                    .copied()
                    .flatten()
                    .ok_or(GrammarError::UnknownRule { id: child.index() })
            })?;
            kept.push(rule);
        }

        if let Some(Rule::Reference { key }) = kept.iter().find(|rule| rule.is_reference()) {
            return Err(GrammarError::UnresolvedReference {
                key: key.to_string(),
            });
        }

        let mut names: Vec<(String, RuleId)> = productions
            .iter()
            .filter_map(|(key, state)| match state {
                ProductionState::Resolved(id) => remap
                    .get(id.index())
                    .copied()
                    .flatten()
                    .map(|new| (key.to_string(), new)),
                ProductionState::Pending(_) => None,
            })
            .collect();
        names.sort();

        log_debug!(
            "built grammar: {} of {} rules reachable, {} productions",
            kept.len(),
            rules.len(),
            names.len()
        );

        Ok(Grammar::new(kept, RuleId::new(0), names))
    }
}

/// Follow placeholder edges from `id` to a real rule
fn resolve<V>(
    rules: &[Rule<V>],
    productions: &HashMap<ProductionKey, ProductionState>,
    mut id: RuleId,
) -> Result<RuleId, GrammarError> {
    // a chain longer than the number of productions must revisit a key
    for _ in 0..=productions.len() {
        match rules.get(id.index()) {
            None => return Err(GrammarError::UnknownRule { id: id.index() }),
            Some(Rule::Reference { key }) => match productions.get(key) {
                Some(ProductionState::Resolved(target)) => id = *target,
                _ => {
                    log_warn!("production {} never finished building", key);
                    return Err(GrammarError::UnresolvedReference {
                        key: key.to_string(),
                    });
                }
            },
            Some(_) => return Ok(id),
        }
    }

    let key = match rules.get(id.index()) {
        Some(Rule::Reference { key }) => key.to_string(),
        _ => id.to_string(),
    };
    log_warn!("production {} resolves to itself", key);
    Err(GrammarError::UnresolvedReference { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_shares_equal_nodes() {
        let mut b = GrammarBuilder::<()>::new();
        let a1 = b.ch(b'a');
        let a2 = b.ch(b'a');
        let c = b.ch(b'c');
        assert_eq!(a1, a2);
        assert_ne!(a1, c);

        let s1 = b.sequence([a1, c]);
        let s2 = b.sequence([a2, c]);
        assert_eq!(s1, s2);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_degenerate_constructors() {
        let mut b = GrammarBuilder::<()>::new();
        let empty = b.empty();
        let never = b.never();
        let x = b.ch(b'x');

        assert_eq!(b.string(""), empty);
        assert_eq!(b.string("x"), x);
        assert_eq!(b.sequence([]), empty);
        assert_ne!(b.sequence([x]), x);
        let act = b.action(|_| Ok(true));
        assert_eq!(b.sequence([act]), act);
        assert_eq!(b.first_of([]), never);
        assert_eq!(b.first_of([x]), x);
        assert_eq!(b.any_of(""), never);
        assert_eq!(b.any_of("x"), x);
        assert_eq!(b.char_range(b'x', b'x').unwrap(), x);
        assert_eq!(b.strings(["x"]).unwrap(), x);
        assert_eq!(b.repeat(x, 0, Some(0)).unwrap(), empty);
        assert_eq!(b.repeat(x, 1, Some(1)).unwrap(), x);

        let opt = b.optional(x);
        assert_eq!(b.repeat(x, 0, Some(1)).unwrap(), opt);

        let any = b.any_char();
        assert_eq!(b.none_of(""), any);
        let any_cp = b.any_code_point();
        assert_eq!(b.none_of_code_points([]), any_cp);
    }

    #[test]
    fn test_invalid_arguments() {
        let mut b = GrammarBuilder::<()>::new();
        let x = b.ch(b'x');
        assert!(matches!(
            b.char_range(b'z', b'a'),
            Err(GrammarError::InvalidArgument { .. })
        ));
        assert!(b.code_point_range('z', 'a').is_err());
        assert!(b.strings(Vec::<String>::new()).is_err());
        assert_eq!(
            b.repeat(x, 3, Some(1)),
            Err(GrammarError::InvalidRepeatBounds { min: 3, max: 1 })
        );
        assert!(matches!(
            b.regex("(unclosed"),
            Err(GrammarError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_class_nodes_are_shared() {
        let mut b = GrammarBuilder::<()>::new();
        let d1 = b.class(CharacterPattern::Digit);
        let d2 = b.class(CharacterPattern::Digit);
        let w = b.class(CharacterPattern::Word);
        assert_eq!(d1, d2);
        assert_ne!(d1, w);
    }

    #[test]
    fn test_bracket_regex_resolves_to_class() {
        let mut b = GrammarBuilder::<()>::new();
        let digit = b.class(CharacterPattern::Digit);
        assert_eq!(b.regex("[0-9]").unwrap(), digit);
        assert_eq!(b.regex("[a-zA-Z0-9_]").unwrap(), b.class(CharacterPattern::Word));

        let unicode = b.regex("\\d").unwrap();
        assert_ne!(unicode, digit);
        assert!(matches!(b.rule(unicode), Some(Rule::Regex { .. })));
        let digits = b.regex("[0-9]+").unwrap();
        assert!(matches!(b.rule(digits), Some(Rule::Regex { .. })));
    }

    #[test]
    fn test_production_memoized_by_key_and_args() {
        let mut b = GrammarBuilder::<()>::new();
        let mut runs = 0;
        let first = b
            .production(ProductionKey::new("digit").with_arg(1), |b| {
                runs += 1;
                Ok(b.class(CharacterPattern::Digit))
            })
            .unwrap();
        let again = b
            .production(ProductionKey::new("digit").with_arg(1), |_| {
                unreachable!("memoized production body must not run twice")
            })
            .unwrap();
        let other = b
            .production(ProductionKey::new("digit").with_arg(2), |b| Ok(b.ch(b'0')))
            .unwrap();

        assert_eq!(runs, 1);
        assert_eq!(first, again);
        assert_ne!(first, other);
        assert!(b.is_resolved(&ProductionKey::new("digit").with_arg(1)));
    }

    #[test]
    fn test_recursive_call_returns_placeholder() {
        let mut b = GrammarBuilder::<()>::new();
        let mut seen = None;
        let real = b
            .production("list", |b| {
                let inner = b.production("list", |_| unreachable!())?;
                seen = Some(inner);
                let x = b.ch(b'x');
                let tail = b.optional(inner);
                Ok(b.sequence([x, tail]))
            })
            .unwrap();

        let placeholder = seen.unwrap();
        assert_ne!(placeholder, real);
        assert!(b.rule(placeholder).unwrap().is_reference());

        let grammar = b.build(real).unwrap();
        assert!(grammar.iter().all(|(_, rule)| !rule.is_reference()));
        assert!(grammar.parse("xxx").unwrap().matched_entire_input);
    }

    #[test]
    fn test_failed_body_is_forgotten() {
        let mut b = GrammarBuilder::<()>::new();
        let err = b
            .production("bad", |b| b.regex("["))
            .unwrap_err();
        assert!(matches!(err, GrammarError::InvalidRegex { .. }));
        assert!(!b.is_resolved(&ProductionKey::new("bad")));

        let ok = b.production("bad", |b| Ok(b.ch(b'b'))).unwrap();
        assert_eq!(b.rule(ok).map(|r| r.kind_name()), Some("Char"));
    }

    #[test]
    fn test_self_resolving_production_is_rejected() {
        let mut b = GrammarBuilder::<()>::new();
        let id = b
            .production("loop", |b| b.production("loop", |_| unreachable!()))
            .unwrap();
        assert!(matches!(
            b.build(id),
            Err(GrammarError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn test_build_keeps_only_reachable_rules() {
        let mut b = GrammarBuilder::<()>::new();
        let _unused = b.string("unused");
        let a = b.ch(b'a');
        let c = b.ch(b'c');
        let root = b.sequence([a, c]);
        let grammar = b.build(root).unwrap();

        assert_eq!(grammar.len(), 3);
        assert_eq!(grammar.root(), RuleId::new(0));
        assert_eq!(grammar.rule(grammar.root()).kind_name(), "Sequence");
    }

    #[test]
    fn test_build_unknown_root() {
        let b = GrammarBuilder::<()>::new();
        assert_eq!(
            b.build(RuleId::new(7)).unwrap_err(),
            GrammarError::UnknownRule { id: 7 }
        );
    }
}
