//! Parse runner
//!
//! [`ParseRunner`] runs a grammar over an input: it checks resource limits,
//! creates the per-parse session (value stack, listeners), runs the root rule
//! at index 0 and packages the outcome in a [`ParseResult`]. The grammar is
//! only borrowed, so one grammar can back many runners.

use super::buffer::InputBuffer;
use super::context::Session;
use super::error::{ListenerError, ParseError};
use super::grammar::Grammar;
use super::listener::{ListenerId, ListenerSet, ParseListener};
use super::source_location::SourcePosition;
use serde::{Deserialize, Serialize};

/// Default maximum input size (100 MB)
pub const DEFAULT_MAX_INPUT_SIZE: usize = 100 * 1024 * 1024;

/// Default maximum rule nesting level
///
/// Every level is a few native stack frames, so this stays well inside the
/// 2 MB stack of spawned and rayon worker threads. Raise it only together
/// with the thread's stack size.
pub const DEFAULT_MAX_NESTING_LEVEL: usize = 256;

/// Resource limits for a runner
///
/// # Example
///
/// ```rust
/// use pegknot::peg::RunnerConfig;
///
/// let config = RunnerConfig::new()
///     .with_max_input_size(1024 * 1024)
///     .with_max_nesting_level(200);
/// assert_eq!(config.max_nesting_level, 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Maximum input size in bytes (0 = unlimited)
    pub max_input_size: usize,

    /// Maximum rule nesting level (0 = unlimited)
    pub max_nesting_level: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            max_nesting_level: DEFAULT_MAX_NESTING_LEVEL,
        }
    }
}

impl RunnerConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum input size
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    /// Set the maximum nesting level
    pub fn with_max_nesting_level(mut self, level: usize) -> Self {
        self.max_nesting_level = level;
        self
    }

    /// A config without limits
    pub fn unlimited() -> Self {
        Self {
            max_input_size: 0,
            max_nesting_level: 0,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON; missing fields take their defaults
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Outcome of one parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult<V> {
    /// Whether the root rule matched
    pub matched: bool,

    /// Whether the root rule matched and consumed the whole input
    pub matched_entire_input: bool,

    /// Index reached by the root rule (0 when it did not match)
    pub end_index: usize,

    /// Greatest index reached by any successful rule
    pub furthest_index: usize,

    /// Final value stack, bottom to top
    pub values: Vec<V>,
}

impl<V> ParseResult<V> {
    /// Whether the root rule matched
    #[inline]
    pub fn is_match(&self) -> bool {
        self.matched
    }

    /// Whether the whole input was consumed
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.matched_entire_input
    }

    /// Final stack values, bottom to top
    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Top of the final stack
    #[inline]
    pub fn top(&self) -> Option<&V> {
        self.values.last()
    }

    /// Take the final stack values
    pub fn into_values(self) -> Vec<V> {
        self.values
    }

    /// Line and column of [`furthest_index`](Self::furthest_index)
    pub fn furthest_position(&self, buffer: &InputBuffer) -> SourcePosition {
        buffer
            .position_or_end(self.furthest_index)
            .unwrap_or_default()
    }
}

impl<V: Serialize> ParseResult<V> {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Runs a grammar over inputs
pub struct ParseRunner<'g, V> {
    grammar: &'g Grammar<V>,
    config: RunnerConfig,
    listeners: ListenerSet<V>,
}

impl<'g, V> ParseRunner<'g, V> {
    /// Runner with default limits
    pub fn new(grammar: &'g Grammar<V>) -> Self {
        Self::with_config(grammar, RunnerConfig::default())
    }

    /// Runner with explicit limits
    pub fn with_config(grammar: &'g Grammar<V>, config: RunnerConfig) -> Self {
        Self {
            grammar,
            config,
            listeners: ListenerSet::default(),
        }
    }

    /// The grammar being run
    #[inline]
    pub fn grammar(&self) -> &'g Grammar<V> {
        self.grammar
    }

    /// Active limits
    #[inline]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Register a listener; hooks run in registration order
    pub fn add_listener<L>(&mut self, listener: L) -> ListenerId
    where
        L: ParseListener<V> + 'static,
    {
        self.listeners.add(Box::new(listener))
    }

    /// Unregister a listener, returning it
    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn ParseListener<V>>> {
        self.listeners.remove(id)
    }

    /// Receive errors raised by listener hooks instead of logging them
    pub fn set_error_handler<F>(&mut self, handler: F)
    where
        F: FnMut(ListenerError) + 'static,
    {
        self.listeners.set_handler(Box::new(handler));
    }
}

impl<'g, V: Clone> ParseRunner<'g, V> {
    /// Parse `input`
    pub fn run(&mut self, input: &str) -> Result<ParseResult<V>, ParseError> {
        self.check_input_size(input.len())?;
        let buffer = InputBuffer::new(input);
        self.run_buffer(&buffer)
    }

    /// Parse an already indexed input
    pub fn run_buffer(&mut self, buffer: &InputBuffer) -> Result<ParseResult<V>, ParseError> {
        self.check_input_size(buffer.len())?;
        log_debug!(
            "parse start: {} bytes, {} rules",
            buffer.len(),
            self.grammar.len()
        );

        let listeners = std::mem::take(&mut self.listeners);
        let mut session = Session::new(
            self.grammar,
            buffer,
            listeners,
            self.config.max_nesting_level,
        );
        session.listeners.before_parse(buffer);

        let outcome = {
            let mut root = session.root_context();
            root.run().map(|matched| (matched, root.current_index()))
        };

        let Session {
            stack,
            mut listeners,
            furthest_index,
            ..
        } = session;

        let (matched, end) = match outcome {
            Ok(done) => done,
            Err(err) => {
                log_debug!("parse aborted: {}", err);
                self.listeners = listeners;
                return Err(err);
            }
        };

        let result = ParseResult {
            matched,
            matched_entire_input: matched && end == buffer.len(),
            end_index: if matched { end } else { 0 },
            furthest_index,
            values: stack.into_vec(),
        };
        log_debug!(
            "parse end: matched={} end={} furthest={}",
            result.matched,
            result.end_index,
            result.furthest_index
        );

        listeners.after_parse(&result);
        self.listeners = listeners;
        Ok(result)
    }

    fn check_input_size(&self, size: usize) -> Result<(), ParseError> {
        let max_size = self.config.max_input_size;
        if max_size > 0 && size > max_size {
            return Err(ParseError::InputTooLarge {
                input_size: size,
                max_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peg::builder::GrammarBuilder;

    #[test]
    fn test_config_defaults_and_builders() {
        let config = RunnerConfig::default();
        assert_eq!(config.max_input_size, DEFAULT_MAX_INPUT_SIZE);
        assert_eq!(config.max_nesting_level, DEFAULT_MAX_NESTING_LEVEL);

        let config = RunnerConfig::new().with_max_input_size(10);
        assert_eq!(config.max_input_size, 10);
        assert_eq!(RunnerConfig::unlimited().max_nesting_level, 0);
    }

    #[test]
    fn test_config_json() {
        let config = RunnerConfig::new().with_max_nesting_level(7);
        let json = config.to_json().unwrap();
        assert_eq!(RunnerConfig::from_json(&json).unwrap(), config);

        let partial = RunnerConfig::from_json(r#"{"max_input_size": 3}"#).unwrap();
        assert_eq!(partial.max_input_size, 3);
        assert_eq!(partial.max_nesting_level, DEFAULT_MAX_NESTING_LEVEL);
    }

    #[test]
    fn test_input_too_large() {
        let mut b = GrammarBuilder::<()>::new();
        let root = b.any_char();
        let grammar = b.build(root).unwrap();
        let mut runner =
            ParseRunner::with_config(&grammar, RunnerConfig::new().with_max_input_size(2));

        assert!(runner.run("ab").is_ok());
        assert!(matches!(
            runner.run("abc"),
            Err(ParseError::InputTooLarge {
                input_size: 3,
                max_size: 2
            })
        ));
    }

    #[test]
    fn test_result_fields() {
        let mut b = GrammarBuilder::<()>::new();
        let root = b.string("ab");
        let grammar = b.build(root).unwrap();

        let partial = grammar.parse("abc").unwrap();
        assert!(partial.is_match());
        assert!(!partial.is_complete());
        assert_eq!(partial.end_index, 2);

        let miss = grammar.parse("x").unwrap();
        assert!(!miss.matched);
        assert_eq!(miss.end_index, 0);
        assert_eq!(miss.furthest_index, 0);
    }

    #[test]
    fn test_furthest_index_tracks_backtracked_progress() {
        let mut b = GrammarBuilder::<()>::new();
        let long = b.string("abcd");
        let a = b.ch(b'a');
        let bc = b.string("bc");
        let x = b.ch(b'x');
        let partial = b.sequence([a, bc, x]);
        let root = b.first_of([long, partial]);
        let grammar = b.build(root).unwrap();

        let buffer = InputBuffer::new("abcz");
        let result = grammar.runner().run_buffer(&buffer).unwrap();
        assert!(!result.matched);
        assert_eq!(result.furthest_index, 3);
        assert_eq!(result.furthest_position(&buffer).column, 4);
    }
}
