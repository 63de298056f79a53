//! Prelude module for convenient imports
//!
//! ```
//! use pegknot::prelude::*;
//! ```
//!
//! # Re-exported Items
//!
//! ## Core Types
//! - [`GrammarBuilder`] - Builds rule graphs
//! - [`Grammar`] - Finished rule graph
//! - [`ParseRunner`] - Runs a grammar over inputs
//! - [`ParseResult`] - Result of a parse
//! - [`MatchContext`] - What actions and listeners see
//!
//! ## Parser DSL
//! - [`str()`], [`ch()`], [`re()`], [`any()`], [`eoi()`] - primitives
//! - [`seq()`], [`choice()`], [`dynamic()`], [`call()`] - composition
//! - [`action()`] - stack callbacks
//! - [`Parslet`] and [`ParsletExt`] - parslet traits

// ============================================================================
// Core Types
// ============================================================================

pub use crate::peg::{
    Grammar, GrammarBuilder, InputBuffer, MatchContext, ParseResult, ParseRunner, RuleId,
    RunnerConfig, Value, ValueStack,
};

// ============================================================================
// Parser DSL
// ============================================================================

pub use crate::peg::parser_dsl::{
    action, any, call, ch, choice, class, cp, dynamic, eoi, istr, one_of, re, seq,
    skippable_action, str, strings, Parslet, ParsletExt,
};

// ============================================================================
// Errors and Listeners
// ============================================================================

pub use crate::peg::{ActionError, GrammarError, ParseError, ParseListener};
pub use crate::peg::char_class::CharacterPattern;
