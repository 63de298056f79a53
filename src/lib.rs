//! pegknot - a PEG engine over recursive rule graphs
//!
//! Grammars are graphs of [`Rule`](peg::Rule)s held in an arena and addressed
//! by [`RuleId`](peg::RuleId). Productions may refer to themselves, directly
//! or through other productions; the builder hands out placeholders while a
//! production is being defined and rewires them when the grammar is built.
//!
//! It provides:
//! - Primitive rules over bytes, code points, strings, string sets and regexes
//! - Composite rules: sequence, ordered choice, repetition, lookahead,
//!   conditionals and actions
//! - A transactional value stack that actions build results on
//! - A backtracking matcher with line/column positions for every index
//! - Parse listeners, tracing and grammar visualization
//! - A parslet DSL on top of the builder
//!
//! ## Quick Start
//!
//! ```rust
//! use pegknot::peg::{GrammarBuilder, Value};
//!
//! let mut b = GrammarBuilder::<Value>::new();
//! let digits = b.regex("[0-9]+").unwrap();
//! let push = b.action(|ctx| {
//!     let text = ctx.previous_match().unwrap_or_default();
//!     ctx.stack_mut().push(Value::Int(text.parse()?));
//!     Ok(true)
//! });
//! let root = b.sequence([digits, push]);
//! let grammar = b.build(root).unwrap();
//!
//! let result = grammar.parse("42").unwrap();
//! assert!(result.matched_entire_input);
//! assert_eq!(result.top(), Some(&Value::Int(42)));
//! ```
//!
//! ## Using the Parser DSL
//!
//! ```rust
//! use pegknot::prelude::*;
//!
//! let mut b = GrammarBuilder::<()>::new();
//! let root = str("hello").then(str(" ").many1()).then(str("world")).build(&mut b).unwrap();
//! let grammar = b.build(root).unwrap();
//! assert!(grammar.parse("hello   world").unwrap().matched_entire_input);
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Enable debug logging using the `log` crate
//! - `parallel` - Parse batches of inputs on rayon's thread pool

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]
#![allow(clippy::module_inception)]

#[macro_use]
mod logging;

// Prelude module for convenient imports
pub mod prelude;

pub mod peg;

/// Re-export commonly used types for convenience
pub use peg::{
    // Debug tools
    debug::{GrammarVisualizer, ParseTrace, SourceFormatter, TraceListener},
    // Parser DSL
    parser_dsl::{Parslet, ParsletExt},
    Grammar,
    GrammarBuilder,
    GrammarError,
    InputBuffer,
    MatchContext,
    ParseError,
    ParseListener,
    ParseResult,
    ParseRunner,
    Rule,
    RuleId,
    RunnerConfig,
    Value,
    ValueStack,
};
