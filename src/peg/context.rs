//! Matching contexts
//!
//! Every rule invocation gets a [`MatchContext`]: a [`Frame`] describing the
//! invocation (rule, level, start and current index, previous match, parent)
//! plus a mutable handle to the parse-wide [`Session`] that owns the value
//! stack and listeners.
//!
//! Child contexts borrow their parent's frame immutably and the session
//! mutably, so the parent chain is a plain linked list of stack frames and
//! the only way a child's progress reaches its parent is through
//! [`MatchContext::run_child`] adopting the end index after a success.

use super::buffer::InputBuffer;
use super::error::ParseError;
use super::grammar::Grammar;
use super::listener::{ListenerSet, MatchEvent};
use super::matcher;
use super::rule::{Rule, RuleId};
use super::source_location::{SourcePosition, Span};
use super::stack::ValueStack;

/// Per-parse state shared by every context of one run
pub(crate) struct Session<'a, V> {
    pub(crate) grammar: &'a Grammar<V>,
    pub(crate) buffer: &'a InputBuffer,
    pub(crate) stack: ValueStack<V>,
    pub(crate) listeners: ListenerSet<V>,
    /// Greatest end index of any successful rule
    pub(crate) furthest_index: usize,
    /// 0 = unlimited
    pub(crate) max_nesting_level: usize,
}

impl<'a, V> Session<'a, V> {
    pub(crate) fn new(
        grammar: &'a Grammar<V>,
        buffer: &'a InputBuffer,
        listeners: ListenerSet<V>,
        max_nesting_level: usize,
    ) -> Self {
        Self {
            grammar,
            buffer,
            stack: ValueStack::new(),
            listeners,
            furthest_index: 0,
            max_nesting_level,
        }
    }

    /// Context for the grammar's root rule at level 0, index 0
    pub(crate) fn root_context(&mut self) -> MatchContext<'_, 'a, V> {
        let root = self.grammar.root();
        MatchContext {
            session: self,
            frame: Frame {
                rule: root,
                level: 0,
                start_index: 0,
                current_index: 0,
                previous_match: None,
                in_predicate: false,
                parent: None,
            },
        }
    }
}

/// Read-only view of one rule invocation
#[derive(Debug, Clone, Copy)]
pub struct Frame<'c> {
    rule: RuleId,
    level: usize,
    start_index: usize,
    current_index: usize,
    previous_match: Option<Span>,
    in_predicate: bool,
    parent: Option<&'c Frame<'c>>,
}

impl<'c> Frame<'c> {
    /// Rule being matched
    #[inline]
    pub fn rule_id(&self) -> RuleId {
        self.rule
    }

    /// Nesting level (root = 0)
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Index at which the invocation started
    #[inline]
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Index reached so far
    #[inline]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Span consumed by the most recent advance seen by this invocation
    #[inline]
    pub fn previous_span(&self) -> Option<Span> {
        self.previous_match
    }

    /// Whether this invocation runs inside a lookahead
    #[inline]
    pub fn in_predicate(&self) -> bool {
        self.in_predicate
    }

    /// The enclosing invocation
    #[inline]
    pub fn parent(&self) -> Option<&'c Frame<'c>> {
        self.parent
    }
}

/// Context handed to rules, actions, conditions and listeners
pub struct MatchContext<'c, 'a, V> {
    session: &'c mut Session<'a, V>,
    frame: Frame<'c>,
}

impl<'c, 'a, V> MatchContext<'c, 'a, V> {
    // ========================================================================
    // Invocation state
    // ========================================================================

    /// This invocation's frame
    #[inline]
    pub fn frame(&self) -> &Frame<'c> {
        &self.frame
    }

    /// Id of the rule being matched
    #[inline]
    pub fn rule_id(&self) -> RuleId {
        self.frame.rule
    }

    /// The rule being matched
    #[inline]
    pub fn rule(&self) -> &'a Rule<V> {
        self.session.grammar.rule(self.frame.rule)
    }

    /// Production name of the rule being matched, if it has one
    pub fn rule_name(&self) -> Option<&'a str> {
        self.session.grammar.production_name(self.frame.rule)
    }

    /// Nesting level (root = 0)
    #[inline]
    pub fn level(&self) -> usize {
        self.frame.level
    }

    /// Index at which this invocation started
    #[inline]
    pub fn start_index(&self) -> usize {
        self.frame.start_index
    }

    /// Index reached so far
    #[inline]
    pub fn current_index(&self) -> usize {
        self.frame.current_index
    }

    /// Whether this rule is a lookahead or runs inside one
    #[inline]
    pub fn in_predicate(&self) -> bool {
        self.frame.in_predicate
    }

    /// The enclosing invocation
    #[inline]
    pub fn parent(&self) -> Option<&'c Frame<'c>> {
        self.frame.parent
    }

    /// Enclosing invocations, innermost first
    pub fn ancestors(&self) -> impl Iterator<Item = &'c Frame<'c>> {
        std::iter::successors(self.frame.parent, |frame| frame.parent)
    }

    /// Span consumed by the most recent advance, inherited from ancestors
    #[inline]
    pub fn previous_span(&self) -> Option<Span> {
        self.frame.previous_match
    }

    /// Text consumed by the most recent advance
    pub fn previous_match(&self) -> Option<&'a str> {
        let span = self.frame.previous_match?;
        self.session.buffer.extract_span(span).ok()
    }

    /// Line and column of the current index
    pub fn position(&self) -> SourcePosition {
        self.session
            .buffer
            .position_or_end(self.frame.current_index)
            .unwrap_or_default()
    }

    // ========================================================================
    // Shared parse state
    // ========================================================================

    /// The input
    #[inline]
    pub fn buffer(&self) -> &'a InputBuffer {
        self.session.buffer
    }

    /// The grammar being run
    #[inline]
    pub fn grammar(&self) -> &'a Grammar<V> {
        self.session.grammar
    }

    /// The parse's value stack
    #[inline]
    pub fn stack(&self) -> &ValueStack<V> {
        &self.session.stack
    }

    /// The parse's value stack, mutably
    #[inline]
    pub fn stack_mut(&mut self) -> &mut ValueStack<V> {
        &mut self.session.stack
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Create a context for `rule` one level deeper, at this context's index
    pub(crate) fn child(&mut self, rule: RuleId) -> Result<MatchContext<'_, 'a, V>, ParseError> {
        let level = self.frame.level + 1;
        let max_level = self.session.max_nesting_level;
        if max_level != 0 && level > max_level {
            return Err(ParseError::NestingLimitExceeded { level, max_level });
        }

        let in_predicate =
            self.frame.in_predicate || self.session.grammar.rule(rule).is_predicate();
        Ok(MatchContext {
            session: &mut *self.session,
            frame: Frame {
                rule,
                level,
                start_index: self.frame.current_index,
                current_index: self.frame.current_index,
                previous_match: self.frame.previous_match,
                in_predicate,
                parent: Some(&self.frame),
            },
        })
    }

    /// Move the current index forward to `index`, recording the consumed span
    #[inline]
    pub(crate) fn advance_to(&mut self, index: usize) {
        if index > self.frame.current_index {
            self.frame.previous_match = Some(Span::new(self.frame.current_index, index));
            self.frame.current_index = index;
        }
    }

    /// Move the current index forward by `n` bytes
    #[inline]
    pub(crate) fn advance_by(&mut self, n: usize) {
        self.advance_to(self.frame.current_index + n);
    }
}

impl<'c, 'a, V: Clone> MatchContext<'c, 'a, V> {
    /// Match `rule` in a child context, adopting its end index on success
    pub(crate) fn run_child(&mut self, rule: RuleId) -> Result<bool, ParseError> {
        let (matched, end) = {
            let mut child = self.child(rule)?;
            let matched = child.run()?;
            (matched, child.frame.current_index)
        };
        if matched {
            self.advance_to(end);
        }
        Ok(matched)
    }

    /// Match `rule` in a child context without adopting its progress
    pub(crate) fn probe_child(&mut self, rule: RuleId) -> Result<bool, ParseError> {
        self.child(rule)?.run()
    }

    /// Run this context's rule with listener notification
    pub(crate) fn run(&mut self) -> Result<bool, ParseError> {
        self.notify(MatchEvent::Before);
        let matched = matcher::match_rule(self)?;
        if matched {
            let end = self.frame.current_index;
            if end > self.session.furthest_index {
                self.session.furthest_index = end;
            }
            self.notify(MatchEvent::Success);
        } else {
            self.notify(MatchEvent::Failure);
        }
        Ok(matched)
    }

    fn notify(&mut self, event: MatchEvent) {
        if self.session.listeners.is_empty() {
            return;
        }
        let mut listeners = std::mem::take(&mut self.session.listeners);
        listeners.dispatch_match(event, self);
        self.session.listeners = listeners;
    }
}
