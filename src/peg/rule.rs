//! Rule graph nodes
//!
//! A grammar is a possibly cyclic graph of [`Rule`] nodes stored in an arena.
//! Children are [`RuleId`] indices into that arena, so a recursive production
//! is just an index edge pointing back up the graph.
//!
//! Nodes compare and hash structurally (variant, parameters, children). The
//! builder uses this to hand out one shared node for every structurally equal
//! request. Callbacks compare by `Arc` identity, regexes by pattern, string
//! sets by their candidate list.

use super::char_class::ByteSet;
use super::context::MatchContext;
use super::error::{ActionError, GrammarError};
use super::trie::StringTrie;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Index of a rule in its grammar's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleId(usize);

impl RuleId {
    /// Wrap a raw arena index
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw arena index
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Callback run by an `Action` rule
///
/// `Ok(true)` succeeds, `Ok(false)` fails the rule (rolling back stack
/// effects), `Err` aborts the parse.
pub type ActionFn<V> =
    Arc<dyn Fn(&mut MatchContext<'_, '_, V>) -> Result<bool, ActionError> + Send + Sync>;

/// Side-effect-free test evaluated by a `Conditional` rule
pub type ConditionFn<V> = Arc<dyn Fn(&MatchContext<'_, '_, V>) -> bool + Send + Sync>;

/// Byte predicate of a `CharPredicate` rule
pub type BytePredicate = Arc<dyn Fn(u8) -> bool + Send + Sync>;

/// Code point predicate of a `CodePointPredicate` rule
pub type CodePointPredicateFn = Arc<dyn Fn(char) -> bool + Send + Sync>;

/// One argument of a parameterized production
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductionArg {
    /// Boolean flag
    Bool(bool),
    /// Integer parameter
    Int(i64),
    /// Character parameter
    Char(char),
    /// String parameter
    Str(String),
    /// Another rule passed as a parameter
    Rule(RuleId),
}

impl fmt::Display for ProductionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductionArg::Bool(b) => write!(f, "{}", b),
            ProductionArg::Int(i) => write!(f, "{}", i),
            ProductionArg::Char(c) => write!(f, "{:?}", c),
            ProductionArg::Str(s) => write!(f, "{:?}", s),
            ProductionArg::Rule(id) => write!(f, "{}", id),
        }
    }
}

impl From<bool> for ProductionArg {
    fn from(v: bool) -> Self {
        ProductionArg::Bool(v)
    }
}

impl From<i64> for ProductionArg {
    fn from(v: i64) -> Self {
        ProductionArg::Int(v)
    }
}

impl From<i32> for ProductionArg {
    fn from(v: i32) -> Self {
        ProductionArg::Int(v as i64)
    }
}

impl From<usize> for ProductionArg {
    fn from(v: usize) -> Self {
        ProductionArg::Int(v as i64)
    }
}

impl From<char> for ProductionArg {
    fn from(v: char) -> Self {
        ProductionArg::Char(v)
    }
}

impl From<&str> for ProductionArg {
    fn from(v: &str) -> Self {
        ProductionArg::Str(v.to_string())
    }
}

impl From<String> for ProductionArg {
    fn from(v: String) -> Self {
        ProductionArg::Str(v)
    }
}

impl From<RuleId> for ProductionArg {
    fn from(v: RuleId) -> Self {
        ProductionArg::Rule(v)
    }
}

/// Identity of a production call: its name plus argument values
///
/// Two calls with equal keys build one shared rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductionKey {
    /// Production name
    pub name: Cow<'static, str>,
    /// Argument values, in call order
    pub args: Vec<ProductionArg>,
}

impl ProductionKey {
    /// Key for a production without arguments
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument
    pub fn with_arg(mut self, arg: impl Into<ProductionArg>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl From<&'static str> for ProductionKey {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ProductionKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ProductionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// A node of the rule graph
///
/// "Char" variants test single input bytes. "CodePoint" variants decode one
/// Unicode scalar value at the current index and advance by its UTF-8 width.
pub enum Rule<V> {
    /// Always succeeds without consuming
    Empty,

    /// Always fails
    Never,

    /// Succeeds only at the end of input
    EndOfInput,

    /// Any single byte
    AnyChar,

    /// Any single code point
    AnyCodePoint,

    /// One specific byte
    Char {
        /// Byte to match
        byte: u8,
        /// Compare ASCII letters case-insensitively
        ignore_case: bool,
    },

    /// A byte in `low..=high`
    CharRange {
        /// Lowest accepted byte
        low: u8,
        /// Highest accepted byte
        high: u8,
    },

    /// A byte in (or, negated, not in) a set
    CharSet {
        /// Member bytes
        set: ByteSet,
        /// Accept bytes outside the set instead
        negated: bool,
    },

    /// One specific code point
    CodePoint {
        /// Code point to match
        value: char,
        /// Compare by simple case mapping
        ignore_case: bool,
    },

    /// A code point in `low..=high`
    CodePointRange {
        /// Lowest accepted code point
        low: char,
        /// Highest accepted code point
        high: char,
    },

    /// A code point in (or, negated, not in) a set
    CodePointSet {
        /// Member code points
        set: BTreeSet<char>,
        /// Accept code points outside the set instead
        negated: bool,
    },

    /// A byte accepted by a predicate
    CharPredicate {
        /// Name shown in traces and diagrams
        label: Cow<'static, str>,
        /// Membership test
        predicate: BytePredicate,
    },

    /// A code point accepted by a predicate
    CodePointPredicate {
        /// Name shown in traces and diagrams
        label: Cow<'static, str>,
        /// Membership test
        predicate: CodePointPredicateFn,
    },

    /// A literal string
    String {
        /// Text to match (lowercased when `ignore_case`)
        literal: String,
        /// Compare case-insensitively
        ignore_case: bool,
    },

    /// The longest of several literal strings
    StringSet {
        /// Candidate trie
        trie: StringTrie,
    },

    /// A regex anchored at the current index
    Regex {
        /// Pattern as written by the grammar author
        pattern: String,
        /// Compiled, anchored program
        regex: Regex,
    },

    /// All children in order
    Sequence {
        /// Child rules
        children: Vec<RuleId>,
    },

    /// The first child that matches
    FirstOf {
        /// Alternatives, in priority order
        children: Vec<RuleId>,
    },

    /// The child, or nothing
    Optional {
        /// Child rule
        child: RuleId,
    },

    /// The child between `min` and `max` times
    Repeat {
        /// Child rule
        child: RuleId,
        /// Minimum number of successes
        min: usize,
        /// Maximum number of attempts (`None` = unbounded)
        max: Option<usize>,
    },

    /// Positive lookahead
    Test {
        /// Child rule
        child: RuleId,
    },

    /// Negative lookahead
    TestNot {
        /// Child rule
        child: RuleId,
    },

    /// User callback with access to the value stack
    Action {
        /// Callback
        action: ActionFn<V>,
        /// Succeed without running inside a lookahead
        skippable: bool,
    },

    /// Choose a branch with a side-effect-free condition
    Conditional {
        /// Condition evaluated against the current context
        condition: ConditionFn<V>,
        /// Rule run when the condition holds
        then: RuleId,
        /// Rule run otherwise; absent means trivial success
        otherwise: Option<RuleId>,
    },

    /// Construction-time placeholder for a production still being built
    Reference {
        /// Production the placeholder stands for
        key: ProductionKey,
    },
}

impl<V> Rule<V> {
    /// Variant name
    pub fn kind_name(&self) -> &'static str {
        match self {
            Rule::Empty => "Empty",
            Rule::Never => "Never",
            Rule::EndOfInput => "EndOfInput",
            Rule::AnyChar => "AnyChar",
            Rule::AnyCodePoint => "AnyCodePoint",
            Rule::Char { .. } => "Char",
            Rule::CharRange { .. } => "CharRange",
            Rule::CharSet { .. } => "CharSet",
            Rule::CodePoint { .. } => "CodePoint",
            Rule::CodePointRange { .. } => "CodePointRange",
            Rule::CodePointSet { .. } => "CodePointSet",
            Rule::CharPredicate { .. } => "CharPredicate",
            Rule::CodePointPredicate { .. } => "CodePointPredicate",
            Rule::String { .. } => "String",
            Rule::StringSet { .. } => "StringSet",
            Rule::Regex { .. } => "Regex",
            Rule::Sequence { .. } => "Sequence",
            Rule::FirstOf { .. } => "FirstOf",
            Rule::Optional { .. } => "Optional",
            Rule::Repeat { .. } => "Repeat",
            Rule::Test { .. } => "Test",
            Rule::TestNot { .. } => "TestNot",
            Rule::Action { .. } => "Action",
            Rule::Conditional { .. } => "Conditional",
            Rule::Reference { .. } => "Reference",
        }
    }

    /// Short human-readable rendering of the node, children as ids
    pub fn describe(&self) -> String {
        match self {
            Rule::Empty => "EMPTY".to_string(),
            Rule::Never => "NEVER".to_string(),
            Rule::EndOfInput => "EOI".to_string(),
            Rule::AnyChar => "ANY".to_string(),
            Rule::AnyCodePoint => "ANY_CODE_POINT".to_string(),
            Rule::Char { byte, ignore_case } => format!(
                "'{}'{}",
                std::ascii::escape_default(*byte),
                if *ignore_case { "i" } else { "" }
            ),
            Rule::CharRange { low, high } => format!(
                "[{}-{}]",
                std::ascii::escape_default(*low),
                std::ascii::escape_default(*high)
            ),
            Rule::CharSet { set, negated } => {
                format!("{}{:?}", if *negated { "!" } else { "" }, set)
            }
            Rule::CodePoint { value, ignore_case } => {
                format!("{:?}{}", value, if *ignore_case { "i" } else { "" })
            }
            Rule::CodePointRange { low, high } => format!("[{:?}-{:?}]", low, high),
            Rule::CodePointSet { set, negated } => format!(
                "{}[{}]",
                if *negated { "!" } else { "" },
                set.iter().collect::<String>()
            ),
            Rule::CharPredicate { label, .. } | Rule::CodePointPredicate { label, .. } => {
                format!("<{}>", label)
            }
            Rule::String {
                literal,
                ignore_case,
            } => format!("{:?}{}", literal, if *ignore_case { "i" } else { "" }),
            Rule::StringSet { trie } => format!("{{{}}}", trie.candidates().join(" | ")),
            Rule::Regex { pattern, .. } => format!("/{}/", pattern),
            Rule::Sequence { children } => format!("seq({})", join_ids(children)),
            Rule::FirstOf { children } => format!("first_of({})", join_ids(children)),
            Rule::Optional { child } => format!("{}?", child),
            Rule::Repeat { child, min, max } => match max {
                Some(max) => format!("{}{{{},{}}}", child, min, max),
                None => format!("{}{{{},}}", child, min),
            },
            Rule::Test { child } => format!("&{}", child),
            Rule::TestNot { child } => format!("!{}", child),
            Rule::Action { skippable, .. } => {
                if *skippable {
                    "action(skippable)".to_string()
                } else {
                    "action".to_string()
                }
            }
            Rule::Conditional {
                then, otherwise, ..
            } => match otherwise {
                Some(otherwise) => format!("if ? {} : {}", then, otherwise),
                None => format!("if ? {}", then),
            },
            Rule::Reference { key } => format!("ref({})", key),
        }
    }

    /// Child rule ids in evaluation order
    pub fn children(&self) -> Vec<RuleId> {
        match self {
            Rule::Sequence { children } | Rule::FirstOf { children } => children.clone(),
            Rule::Optional { child }
            | Rule::Repeat { child, .. }
            | Rule::Test { child }
            | Rule::TestNot { child } => vec![*child],
            Rule::Conditional {
                then, otherwise, ..
            } => std::iter::once(*then).chain(*otherwise).collect(),
            _ => Vec::new(),
        }
    }

    /// Rewrite every child id in place
    pub fn try_map_children<F>(&mut self, mut f: F) -> Result<(), GrammarError>
    where
        F: FnMut(RuleId) -> Result<RuleId, GrammarError>,
    {
        match self {
            Rule::Sequence { children } | Rule::FirstOf { children } => {
                for child in children.iter_mut() {
                    *child = f(*child)?;
                }
            }
            Rule::Optional { child }
            | Rule::Repeat { child, .. }
            | Rule::Test { child }
            | Rule::TestNot { child } => {
                *child = f(*child)?;
            }
            Rule::Conditional {
                then, otherwise, ..
            } => {
                *then = f(*then)?;
                if let Some(otherwise) = otherwise {
                    *otherwise = f(*otherwise)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Whether the rule is a lookahead (`Test` / `TestNot`)
    #[inline]
    pub fn is_predicate(&self) -> bool {
        matches!(self, Rule::Test { .. } | Rule::TestNot { .. })
    }

    /// Whether a failed match of this rule leaves the value stack untouched
    #[inline]
    pub fn is_transactional(&self) -> bool {
        matches!(self, Rule::Sequence { .. } | Rule::Action { .. })
    }

    /// Whether the rule is a placeholder
    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self, Rule::Reference { .. })
    }
}

fn join_ids(ids: &[RuleId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl<V> fmt::Debug for Rule<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind_name(), self.describe())
    }
}

impl<V> Clone for Rule<V> {
    fn clone(&self) -> Self {
        match self {
            Rule::Empty => Rule::Empty,
            Rule::Never => Rule::Never,
            Rule::EndOfInput => Rule::EndOfInput,
            Rule::AnyChar => Rule::AnyChar,
            Rule::AnyCodePoint => Rule::AnyCodePoint,
            Rule::Char { byte, ignore_case } => Rule::Char {
                byte: *byte,
                ignore_case: *ignore_case,
            },
            Rule::CharRange { low, high } => Rule::CharRange {
                low: *low,
                high: *high,
            },
            Rule::CharSet { set, negated } => Rule::CharSet {
                set: *set,
                negated: *negated,
            },
            Rule::CodePoint { value, ignore_case } => Rule::CodePoint {
                value: *value,
                ignore_case: *ignore_case,
            },
            Rule::CodePointRange { low, high } => Rule::CodePointRange {
                low: *low,
                high: *high,
            },
            Rule::CodePointSet { set, negated } => Rule::CodePointSet {
                set: set.clone(),
                negated: *negated,
            },
            Rule::CharPredicate { label, predicate } => Rule::CharPredicate {
                label: label.clone(),
                predicate: Arc::clone(predicate),
            },
            Rule::CodePointPredicate { label, predicate } => Rule::CodePointPredicate {
                label: label.clone(),
                predicate: Arc::clone(predicate),
            },
            Rule::String {
                literal,
                ignore_case,
            } => Rule::String {
                literal: literal.clone(),
                ignore_case: *ignore_case,
            },
            Rule::StringSet { trie } => Rule::StringSet { trie: trie.clone() },
            Rule::Regex { pattern, regex } => Rule::Regex {
                pattern: pattern.clone(),
                regex: regex.clone(),
            },
            Rule::Sequence { children } => Rule::Sequence {
                children: children.clone(),
            },
            Rule::FirstOf { children } => Rule::FirstOf {
                children: children.clone(),
            },
            Rule::Optional { child } => Rule::Optional { child: *child },
            Rule::Repeat { child, min, max } => Rule::Repeat {
                child: *child,
                min: *min,
                max: *max,
            },
            Rule::Test { child } => Rule::Test { child: *child },
            Rule::TestNot { child } => Rule::TestNot { child: *child },
            Rule::Action { action, skippable } => Rule::Action {
                action: Arc::clone(action),
                skippable: *skippable,
            },
            Rule::Conditional {
                condition,
                then,
                otherwise,
            } => Rule::Conditional {
                condition: Arc::clone(condition),
                then: *then,
                otherwise: *otherwise,
            },
            Rule::Reference { key } => Rule::Reference { key: key.clone() },
        }
    }
}

impl<V> PartialEq for Rule<V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Rule::Empty, Rule::Empty)
            | (Rule::Never, Rule::Never)
            | (Rule::EndOfInput, Rule::EndOfInput)
            | (Rule::AnyChar, Rule::AnyChar)
            | (Rule::AnyCodePoint, Rule::AnyCodePoint) => true,
            (
                Rule::Char {
                    byte: a,
                    ignore_case: ai,
                },
                Rule::Char {
                    byte: b,
                    ignore_case: bi,
                },
            ) => a == b && ai == bi,
            (Rule::CharRange { low: al, high: ah }, Rule::CharRange { low: bl, high: bh }) => {
                al == bl && ah == bh
            }
            (
                Rule::CharSet {
                    set: a,
                    negated: an,
                },
                Rule::CharSet {
                    set: b,
                    negated: bn,
                },
            ) => a == b && an == bn,
            (
                Rule::CodePoint {
                    value: a,
                    ignore_case: ai,
                },
                Rule::CodePoint {
                    value: b,
                    ignore_case: bi,
                },
            ) => a == b && ai == bi,
            (
                Rule::CodePointRange { low: al, high: ah },
                Rule::CodePointRange { low: bl, high: bh },
            ) => al == bl && ah == bh,
            (
                Rule::CodePointSet {
                    set: a,
                    negated: an,
                },
                Rule::CodePointSet {
                    set: b,
                    negated: bn,
                },
            ) => a == b && an == bn,
            (
                Rule::CharPredicate {
                    label: al,
                    predicate: a,
                },
                Rule::CharPredicate {
                    label: bl,
                    predicate: b,
                },
            ) => al == bl && std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (
                Rule::CodePointPredicate {
                    label: al,
                    predicate: a,
                },
                Rule::CodePointPredicate {
                    label: bl,
                    predicate: b,
                },
            ) => al == bl && std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (
                Rule::String {
                    literal: a,
                    ignore_case: ai,
                },
                Rule::String {
                    literal: b,
                    ignore_case: bi,
                },
            ) => a == b && ai == bi,
            (Rule::StringSet { trie: a }, Rule::StringSet { trie: b }) => a == b,
            (Rule::Regex { pattern: a, .. }, Rule::Regex { pattern: b, .. }) => a == b,
            (Rule::Sequence { children: a }, Rule::Sequence { children: b })
            | (Rule::FirstOf { children: a }, Rule::FirstOf { children: b }) => a == b,
            (Rule::Optional { child: a }, Rule::Optional { child: b })
            | (Rule::Test { child: a }, Rule::Test { child: b })
            | (Rule::TestNot { child: a }, Rule::TestNot { child: b }) => a == b,
            (
                Rule::Repeat {
                    child: a,
                    min: amin,
                    max: amax,
                },
                Rule::Repeat {
                    child: b,
                    min: bmin,
                    max: bmax,
                },
            ) => a == b && amin == bmin && amax == bmax,
            (
                Rule::Action {
                    action: a,
                    skippable: askip,
                },
                Rule::Action {
                    action: b,
                    skippable: bskip,
                },
            ) => askip == bskip && std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (
                Rule::Conditional {
                    condition: a,
                    then: athen,
                    otherwise: aelse,
                },
                Rule::Conditional {
                    condition: b,
                    then: bthen,
                    otherwise: belse,
                },
            ) => {
                athen == bthen
                    && aelse == belse
                    && std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Rule::Reference { key: a }, Rule::Reference { key: b }) => a == b,
            _ => false,
        }
    }
}

impl<V> Eq for Rule<V> {}

impl<V> Hash for Rule<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Rule::Empty | Rule::Never | Rule::EndOfInput | Rule::AnyChar | Rule::AnyCodePoint => {}
            Rule::Char { byte, ignore_case } => {
                byte.hash(state);
                ignore_case.hash(state);
            }
            Rule::CharRange { low, high } => {
                low.hash(state);
                high.hash(state);
            }
            Rule::CharSet { set, negated } => {
                set.hash(state);
                negated.hash(state);
            }
            Rule::CodePoint { value, ignore_case } => {
                value.hash(state);
                ignore_case.hash(state);
            }
            Rule::CodePointRange { low, high } => {
                low.hash(state);
                high.hash(state);
            }
            Rule::CodePointSet { set, negated } => {
                set.hash(state);
                negated.hash(state);
            }
            Rule::CharPredicate { label, predicate } => {
                label.hash(state);
                (Arc::as_ptr(predicate) as *const ()).hash(state);
            }
            Rule::CodePointPredicate { label, predicate } => {
                label.hash(state);
                (Arc::as_ptr(predicate) as *const ()).hash(state);
            }
            Rule::String {
                literal,
                ignore_case,
            } => {
                literal.hash(state);
                ignore_case.hash(state);
            }
            Rule::StringSet { trie } => trie.hash(state),
            Rule::Regex { pattern, .. } => pattern.hash(state),
            Rule::Sequence { children } | Rule::FirstOf { children } => children.hash(state),
            Rule::Optional { child } | Rule::Test { child } | Rule::TestNot { child } => {
                child.hash(state)
            }
            Rule::Repeat { child, min, max } => {
                child.hash(state);
                min.hash(state);
                max.hash(state);
            }
            Rule::Action { action, skippable } => {
                (Arc::as_ptr(action) as *const ()).hash(state);
                skippable.hash(state);
            }
            Rule::Conditional {
                condition,
                then,
                otherwise,
            } => {
                (Arc::as_ptr(condition) as *const ()).hash(state);
                then.hash(state);
                otherwise.hash(state);
            }
            Rule::Reference { key } => key.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(rule: &Rule<()>) -> u64 {
        let mut h = DefaultHasher::new();
        rule.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_structural_equality() {
        let a: Rule<()> = Rule::Sequence {
            children: vec![RuleId::new(1), RuleId::new(2)],
        };
        let b: Rule<()> = Rule::Sequence {
            children: vec![RuleId::new(1), RuleId::new(2)],
        };
        let c: Rule<()> = Rule::FirstOf {
            children: vec![RuleId::new(1), RuleId::new(2)],
        };

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn test_callbacks_compare_by_identity() {
        let pred: BytePredicate = Arc::new(|b| b == b'x');
        let a: Rule<()> = Rule::CharPredicate {
            label: "x".into(),
            predicate: Arc::clone(&pred),
        };
        let b: Rule<()> = Rule::CharPredicate {
            label: "x".into(),
            predicate: pred,
        };
        let c: Rule<()> = Rule::CharPredicate {
            label: "x".into(),
            predicate: Arc::new(|b| b == b'x'),
        };

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn test_children_and_rewrite() {
        let mut rule: Rule<()> = Rule::Conditional {
            condition: Arc::new(|_| true),
            then: RuleId::new(3),
            otherwise: Some(RuleId::new(5)),
        };
        assert_eq!(rule.children(), vec![RuleId::new(3), RuleId::new(5)]);

        rule.try_map_children(|id| Ok(RuleId::new(id.index() * 10)))
            .unwrap();
        assert_eq!(rule.children(), vec![RuleId::new(30), RuleId::new(50)]);
    }

    #[test]
    fn test_predicate_and_transactional_flags() {
        let test: Rule<()> = Rule::Test {
            child: RuleId::new(0),
        };
        let seq: Rule<()> = Rule::Sequence { children: vec![] };
        assert!(test.is_predicate());
        assert!(!seq.is_predicate());
        assert!(seq.is_transactional());
        assert!(!test.is_transactional());
    }

    #[test]
    fn test_production_key_display() {
        let key = ProductionKey::new("list").with_arg(',').with_arg(2);
        assert_eq!(key.to_string(), "list(',', 2)");
        assert_eq!(ProductionKey::from("expr").to_string(), "expr");
    }

    #[test]
    fn test_describe() {
        let rule: Rule<()> = Rule::Repeat {
            child: RuleId::new(2),
            min: 1,
            max: None,
        };
        assert_eq!(rule.describe(), "r2{1,}");
        let rule: Rule<()> = Rule::Char {
            byte: b'a',
            ignore_case: false,
        };
        assert_eq!(rule.describe(), "'a'");
    }
}
