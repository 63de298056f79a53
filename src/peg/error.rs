//! Error types for grammar construction and matching
//!
//! Ordinary match failure is never an error: rules report it as `Ok(false)`.
//! The types here cover the fatal cases:
//! - [`GrammarError`] - a grammar could not be constructed
//! - [`ParseError`] - a parse was aborted (action failure, resource limits)
//! - [`StackError`] / [`BufferError`] - out-of-range accessor arguments

use super::buffer::InputBuffer;
use super::rule::RuleId;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Error raised by a user-supplied action callback
///
/// Any error type converts into this with `?`, including [`StackError`] and
/// [`BufferError`].
pub type ActionError = Box<dyn Error + Send + Sync>;

/// Error raised by a lifecycle listener hook
pub type ListenerError = Box<dyn Error + Send + Sync>;

/// Error type for grammar construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A constructor received an argument it cannot build a rule from
    InvalidArgument {
        /// Why the argument was rejected
        reason: String,
    },

    /// Repetition bounds with `max < min`
    InvalidRepeatBounds {
        /// Minimum number of iterations
        min: usize,
        /// Maximum number of iterations
        max: usize,
    },

    /// A regular expression failed to compile
    InvalidRegex {
        /// The pattern as written by the grammar author
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// A production placeholder was still reachable after resolution
    UnresolvedReference {
        /// Display form of the production key
        key: String,
    },

    /// A rule id that does not belong to this builder
    UnknownRule {
        /// The offending id
        id: usize,
    },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::InvalidArgument { reason } => {
                write!(f, "Invalid rule argument: {}", reason)
            }
            GrammarError::InvalidRepeatBounds { min, max } => {
                write!(
                    f,
                    "Invalid repetition bounds: max {} is less than min {}",
                    max, min
                )
            }
            GrammarError::InvalidRegex { pattern, message } => {
                write!(f, "Invalid regex pattern {:?}: {}", pattern, message)
            }
            GrammarError::UnresolvedReference { key } => {
                write!(f, "Unresolved reference to production {}", key)
            }
            GrammarError::UnknownRule { id } => {
                write!(f, "Unknown rule id r{}", id)
            }
        }
    }
}

impl Error for GrammarError {}

/// Error type for aborted parses
#[derive(Debug, Clone)]
pub enum ParseError {
    /// An action callback returned an error
    ActionFailed {
        /// The action rule that failed
        rule: RuleId,
        /// Input index at which the action ran
        index: usize,
        /// The error raised by the callback
        source: Arc<dyn Error + Send + Sync>,
    },

    /// Input exceeds the configured maximum size
    InputTooLarge {
        /// Size of the input in bytes
        input_size: usize,
        /// Maximum allowed size
        max_size: usize,
    },

    /// Rule nesting exceeded the configured maximum level
    NestingLimitExceeded {
        /// Level that was about to be entered
        level: usize,
        /// Maximum allowed level
        max_level: usize,
    },

    /// Internal invariant violation (shouldn't happen in normal use)
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl ParseError {
    /// Render the error with line/column information from `buffer`
    pub fn format_with_position(&self, buffer: &InputBuffer) -> String {
        match self {
            ParseError::ActionFailed { index, .. } => match buffer.position_or_end(*index) {
                Ok(pos) => format!("{} (at {})", self, pos),
                Err(_) => self.to_string(),
            },
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::ActionFailed {
                rule,
                index,
                source,
            } => {
                write!(
                    f,
                    "Action {} failed at byte offset {}: {}",
                    rule, index, source
                )
            }
            ParseError::InputTooLarge {
                input_size,
                max_size,
            } => {
                write!(
                    f,
                    "Input too large: {} bytes exceeds limit of {} bytes",
                    input_size, max_size
                )
            }
            ParseError::NestingLimitExceeded { level, max_level } => {
                write!(
                    f,
                    "Nesting limit exceeded: level {} exceeds limit of {}",
                    level, max_level
                )
            }
            ParseError::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::ActionFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<StackError> for ParseError {
    fn from(err: StackError) -> Self {
        ParseError::Internal {
            message: err.to_string(),
        }
    }
}

/// Out-of-range access to a [`ValueStack`](super::stack::ValueStack)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// Depth offset `down` is not below the current size
    OutOfRange {
        /// Requested depth (0 = top)
        down: usize,
        /// Stack size at the time of the call
        len: usize,
    },

    /// No open snapshot to restore or discard
    NoSnapshot,
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackError::OutOfRange { down, len } => {
                write!(f, "Stack depth {} out of range for stack of size {}", down, len)
            }
            StackError::NoSnapshot => write!(f, "No stack snapshot to remove"),
        }
    }
}

impl Error for StackError {}

/// Out-of-range access to an [`InputBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// Index outside the valid range
    OutOfRange {
        /// Requested index
        index: usize,
        /// Buffer length in bytes
        len: usize,
    },

    /// Sub-range with `start > end` or `end > len`
    InvalidRange {
        /// Range start
        start: usize,
        /// Range end (exclusive)
        end: usize,
        /// Buffer length in bytes
        len: usize,
    },

    /// Index falls inside a multi-byte UTF-8 sequence
    NotCharBoundary {
        /// Requested index
        index: usize,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::OutOfRange { index, len } => {
                write!(f, "Index {} out of range for input of {} bytes", index, len)
            }
            BufferError::InvalidRange { start, end, len } => {
                write!(
                    f,
                    "Invalid range {}..{} for input of {} bytes",
                    start, end, len
                )
            }
            BufferError::NotCharBoundary { index } => {
                write!(f, "Index {} is not on a character boundary", index)
            }
        }
    }
}

impl Error for BufferError {}
