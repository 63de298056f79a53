//! Developer Experience Tools
//!
//! Debugging and visualization helpers for grammar authors.
//!
//! # Features
//! - Parse tracing through a [`TraceListener`]
//! - Grammar visualization (Mermaid/DOT diagrams of the rule graph)
//! - Source excerpts with a caret under a position

use super::buffer::InputBuffer;
use super::context::MatchContext;
use super::error::{ListenerError, ParseError};
use super::grammar::Grammar;
use super::listener::ParseListener;
use super::rule::RuleId;
use super::runner::{ParseResult, ParseRunner};
use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

/// Grammar visualizer
///
/// Cycles in the rule graph show up as back edges.
pub struct GrammarVisualizer<'a, V> {
    grammar: &'a Grammar<V>,
}

impl<'a, V> GrammarVisualizer<'a, V> {
    /// Create a new grammar visualizer
    pub fn new(grammar: &'a Grammar<V>) -> Self {
        Self { grammar }
    }

    /// Generate a Mermaid diagram
    pub fn to_mermaid(&self) -> String {
        let mut output = String::new();
        output.push_str("graph TD\n");
        let _ = writeln!(output, "  root((root))");

        for (id, rule) in self.grammar.iter() {
            let _ = writeln!(
                output,
                "  r{}[\"{}\"]",
                id.index(),
                escape_label(&self.label(id))
            );
            for child in rule.children() {
                let _ = writeln!(output, "  r{} --> r{}", id.index(), child.index());
            }
        }

        let _ = writeln!(output, "  root --> r{}", self.grammar.root().index());
        output
    }

    /// Generate a GraphViz DOT diagram
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph Grammar {\n");
        output.push_str("  rankdir=TB;\n");
        output.push_str("  node [shape=box];\n");

        for (id, rule) in self.grammar.iter() {
            let _ = writeln!(
                output,
                "  r{} [label=\"{}\"]",
                id.index(),
                escape_label(&self.label(id))
            );
            for child in rule.children() {
                let _ = writeln!(output, "  r{} -> r{}", id.index(), child.index());
            }
        }

        let _ = writeln!(
            output,
            "  r{} [style=filled, fillcolor=lightblue]",
            self.grammar.root().index()
        );
        output.push_str("}\n");
        output
    }

    fn label(&self, id: RuleId) -> String {
        let rule = self.grammar.rule(id);
        match self.grammar.production_name(id) {
            Some(name) => format!("{}: {}", name, rule.describe()),
            None => format!("{}: {}", id, rule.describe()),
        }
    }
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "'")
}

/// Debug trace for parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseTrace {
    /// Trace entries
    pub entries: Vec<TraceEntry>,
}

/// A single trace entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Input index when the event happened
    pub position: usize,
    /// Rule being matched
    pub rule: RuleId,
    /// What happened
    pub action: TraceAction,
    /// Nesting level of the rule
    pub depth: usize,
}

/// Trace action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceAction {
    /// Started matching a rule
    Enter,
    /// Successfully matched
    Match {
        /// Bytes consumed
        length: usize,
    },
    /// Failed to match
    Fail,
}

impl ParseTrace {
    /// Create a new empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry
    pub fn add(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Format as a readable string
    pub fn format<V>(&self, grammar: &Grammar<V>) -> String {
        let mut output = String::new();
        for entry in &self.entries {
            let indent = "  ".repeat(entry.depth);
            match entry.action {
                TraceAction::Enter => {
                    let rule = grammar
                        .get(entry.rule)
                        .map(|r| r.describe())
                        .unwrap_or_else(|| "unknown".to_string());
                    let _ = writeln!(
                        output,
                        "{}-> {} {} at {}",
                        indent,
                        grammar.display_name(entry.rule),
                        rule,
                        entry.position
                    );
                }
                TraceAction::Match { length } => {
                    let _ = writeln!(output, "{}   Match: {} bytes", indent, length);
                }
                TraceAction::Fail => {
                    let _ = writeln!(output, "{}   Fail", indent);
                }
            }
        }
        output
    }
}

/// Listener recording every rule invocation into a [`ParseTrace`]
#[derive(Debug, Clone, Default)]
pub struct TraceListener {
    trace: Rc<RefCell<ParseTrace>>,
}

impl TraceListener {
    /// Create a listener with an empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded trace
    pub fn trace(&self) -> Rc<RefCell<ParseTrace>> {
        Rc::clone(&self.trace)
    }

    /// Take the recorded trace, leaving an empty one
    pub fn take(&self) -> ParseTrace {
        self.trace.take()
    }

    fn record<V>(&self, ctx: &MatchContext<'_, '_, V>, action: TraceAction) {
        self.trace.borrow_mut().add(TraceEntry {
            position: ctx.current_index(),
            rule: ctx.rule_id(),
            action,
            depth: ctx.level(),
        });
    }
}

impl<V> ParseListener<V> for TraceListener {
    fn before_match(&mut self, ctx: &MatchContext<'_, '_, V>) -> Result<(), ListenerError> {
        self.record(ctx, TraceAction::Enter);
        Ok(())
    }

    fn match_success(&mut self, ctx: &MatchContext<'_, '_, V>) -> Result<(), ListenerError> {
        let length = ctx.current_index() - ctx.start_index();
        self.record(ctx, TraceAction::Match { length });
        Ok(())
    }

    fn match_failure(&mut self, ctx: &MatchContext<'_, '_, V>) -> Result<(), ListenerError> {
        self.record(ctx, TraceAction::Fail);
        Ok(())
    }
}

/// Parse `input` with a trace of every rule invocation
pub fn trace_parse<V: Clone>(
    grammar: &Grammar<V>,
    input: &str,
) -> Result<(ParseResult<V>, ParseTrace), ParseError> {
    let listener = TraceListener::new();
    let mut runner = ParseRunner::new(grammar);
    runner.add_listener(listener.clone());
    let result = runner.run(input)?;
    Ok((result, listener.take()))
}

/// Source code formatter for showing parse context
pub struct SourceFormatter;

impl SourceFormatter {
    /// Format the lines around `offset` with a caret under it
    pub fn format_line(buffer: &InputBuffer, offset: usize, context_lines: usize) -> String {
        let mut output = String::new();
        let Ok(pos) = buffer.position_or_end(offset.min(buffer.len())) else {
            return output;
        };

        let first = pos.line.saturating_sub(context_lines).max(1);
        let last = (pos.line + context_lines).min(buffer.line_count());

        for line_num in first..=last {
            let Some(content) = buffer.line(line_num) else {
                continue;
            };
            let _ = writeln!(output, "{:4} | {}", line_num, content);

            if line_num == pos.line {
                let _ = writeln!(output, "     | {}^", " ".repeat(pos.column - 1));
            }
        }

        output
    }
}
