//! Finished rule graphs
//!
//! A [`Grammar`] is the immutable output of
//! [`GrammarBuilder::build`](super::builder::GrammarBuilder::build): a
//! compacted rule arena with every placeholder resolved, rooted at rule 0.
//! It is `Send + Sync` and can be shared by any number of concurrent parses.

use super::error::ParseError;
use super::rule::{Rule, RuleId};
use super::runner::{ParseResult, ParseRunner};
use hashbrown::HashMap;
use std::ops::Index;

/// An immutable, fully resolved rule graph
pub struct Grammar<V> {
    /// Rule arena, indexed by [`RuleId`]
    rules: Vec<Rule<V>>,

    /// Entry rule
    root: RuleId,

    /// Production names, sorted by name
    productions: Vec<(String, RuleId)>,

    /// Rule -> first production name that resolved to it
    names: HashMap<RuleId, usize>,
}

impl<V> Grammar<V> {
    pub(crate) fn new(
        rules: Vec<Rule<V>>,
        root: RuleId,
        productions: Vec<(String, RuleId)>,
    ) -> Self {
        let mut names = HashMap::new();
        for (i, (_, id)) in productions.iter().enumerate() {
            names.entry(*id).or_insert(i);
        }
        Self {
            rules,
            root,
            productions,
            names,
        }
    }

    /// Entry rule
    #[inline]
    pub fn root(&self) -> RuleId {
        self.root
    }

    /// The rule with id `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this grammar; ids handed out by the
    /// grammar itself are always valid.
    #[inline]
    pub fn rule(&self, id: RuleId) -> &Rule<V> {
        &self.rules[id.index()]
    }

    /// The rule with id `id`, if it exists
    #[inline]
    pub fn get(&self, id: RuleId) -> Option<&Rule<V>> {
        self.rules.get(id.index())
    }

    /// Number of rules
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the grammar has no rules (never true for a built grammar)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules with their ids
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Rule<V>)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (RuleId::new(i), rule))
    }

    /// Production names and the rules they resolved to, sorted by name
    pub fn production_names(&self) -> impl Iterator<Item = (&str, RuleId)> {
        self.productions
            .iter()
            .map(|(name, id)| (name.as_str(), *id))
    }

    /// Name of a production that resolved to `id`
    pub fn production_name(&self, id: RuleId) -> Option<&str> {
        self.names
            .get(&id)
            .map(|&i| self.productions[i].0.as_str())
    }

    /// Name of `id` for display: its production name, else `r<n>`
    pub fn display_name(&self, id: RuleId) -> String {
        match self.production_name(id) {
            Some(name) => name.to_string(),
            None => id.to_string(),
        }
    }

    /// A runner with default configuration
    pub fn runner(&self) -> ParseRunner<'_, V> {
        ParseRunner::new(self)
    }

    /// Parse `input` with a default runner
    pub fn parse(&self, input: &str) -> Result<ParseResult<V>, ParseError>
    where
        V: Clone,
    {
        self.runner().run(input)
    }
}

impl<V> Index<RuleId> for Grammar<V> {
    type Output = Rule<V>;

    fn index(&self, id: RuleId) -> &Rule<V> {
        self.rule(id)
    }
}

impl<V> std::fmt::Debug for Grammar<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("root", &self.root)
            .field("rules", &self.rules)
            .field("productions", &self.productions)
            .finish()
    }
}
