//! The PEG engine
//!
//! # Module Organization
//!
//! ## Rule Graph
//! - [`rule`] - [`Rule`] variants, [`RuleId`] and production keys
//! - [`builder`] - [`GrammarBuilder`] with interning and self-reference resolution
//! - [`grammar`] - the finished, immutable [`Grammar`]
//! - [`parser_dsl`] - parslet combinators on top of the builder
//!
//! ## Matching
//! - [`context`] - [`MatchContext`] handed to actions and listeners
//! - [`stack`] - the transactional [`ValueStack`]
//! - [`buffer`] - [`InputBuffer`] with line/column lookup
//! - [`runner`] - [`ParseRunner`], [`RunnerConfig`] and [`ParseResult`]
//! - [`listener`] - [`ParseListener`] lifecycle hooks
//! - [`parallel`] - batch parsing over a shared grammar
//!
//! ## Support
//! - [`char_class`] - byte sets and named character classes
//! - [`error`] - error types
//! - [`debug`] - tracing, visualization and source excerpts
//! - [`value`] - the dynamic [`Value`] type

// ============================================================================
// Module Declarations
// ============================================================================

pub mod buffer;
pub mod builder;
pub mod char_class;
pub mod context;
pub mod debug;
pub mod error;
pub mod grammar;
pub mod listener;
pub mod parallel;
pub mod parser_dsl;
pub mod regex_cache;
pub mod rule;
pub mod runner;
pub mod source_location;
pub mod stack;
pub mod trie;
pub mod value;

mod matcher;

// ============================================================================
// Core Types
// ============================================================================

pub use builder::GrammarBuilder;
pub use grammar::Grammar;
pub use rule::{ProductionArg, ProductionKey, Rule, RuleId};
pub use runner::{
    ParseResult, ParseRunner, RunnerConfig, DEFAULT_MAX_INPUT_SIZE, DEFAULT_MAX_NESTING_LEVEL,
};

// ============================================================================
// Matching
// ============================================================================

pub use buffer::InputBuffer;
pub use context::{Frame, MatchContext};
pub use listener::{ListenerId, ParseListener};
pub use source_location::{SourcePosition, Span};
pub use stack::ValueStack;

// ============================================================================
// Errors
// ============================================================================

pub use error::{ActionError, BufferError, GrammarError, ListenerError, ParseError, StackError};

// ============================================================================
// Support
// ============================================================================

pub use char_class::{ByteSet, CharacterPattern};
pub use trie::StringTrie;
pub use value::Value;
