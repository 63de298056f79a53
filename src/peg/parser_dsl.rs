//! Parser DSL
//!
//! Combinators that describe rules as values and build them into a
//! [`GrammarBuilder`] on demand. Everything here ends up calling the
//! builder's constructors, so DSL rules and hand-built rules mix freely and
//! share interned nodes.
//!
//! ```rust
//! use pegknot::peg::parser_dsl::*;
//! use pegknot::peg::{GrammarBuilder, GrammarError, RuleId};
//!
//! // list := item (',' item)*
//! fn list(b: &mut GrammarBuilder<()>) -> Result<RuleId, GrammarError> {
//!     b.production("list", |b| {
//!         let item = re("[a-z]+");
//!         item.then(ch(b',').then(item).many()).build(b)
//!     })
//! }
//!
//! let mut b = GrammarBuilder::new();
//! let root = list(&mut b).unwrap();
//! let grammar = b.build(root).unwrap();
//! assert!(grammar.parse("a,bc,d").unwrap().matched_entire_input);
//! ```

use super::builder::GrammarBuilder;
use super::char_class::CharacterPattern;
use super::context::MatchContext;
use super::error::{ActionError, GrammarError};
use super::rule::RuleId;
use std::marker::PhantomData;
use std::ops::{BitOr, Shr};

/// Something that can be built into a rule
pub trait Parslet<V> {
    /// Add the rule to `builder`, returning its id
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError>;

    /// Build as the items of an enclosing sequence
    #[doc(hidden)]
    fn build_sequence_items(
        self,
        builder: &mut GrammarBuilder<V>,
        out: &mut Vec<RuleId>,
    ) -> Result<(), GrammarError>
    where
        Self: Sized,
    {
        out.push(self.build(builder)?);
        Ok(())
    }

    /// Build as the alternatives of an enclosing choice
    #[doc(hidden)]
    fn build_choice_items(
        self,
        builder: &mut GrammarBuilder<V>,
        out: &mut Vec<RuleId>,
    ) -> Result<(), GrammarError>
    where
        Self: Sized,
    {
        out.push(self.build(builder)?);
        Ok(())
    }
}

impl<V> Parslet<V> for RuleId {
    fn build(self, _builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        Ok(self)
    }
}

// ============================================================================
// Primitive parslets
// ============================================================================

/// Match a literal string
#[derive(Debug, Clone, Copy)]
pub struct Str<'a>(pub &'a str);

impl<'a, V> Parslet<V> for Str<'a> {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        Ok(builder.string(self.0))
    }
}

/// Match a literal string case-insensitively
#[derive(Debug, Clone, Copy)]
pub struct IStr<'a>(pub &'a str);

impl<'a, V> Parslet<V> for IStr<'a> {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        Ok(builder.string_ignore_case(self.0))
    }
}

/// Match one byte
#[derive(Debug, Clone, Copy)]
pub struct Ch(pub u8);

impl<V> Parslet<V> for Ch {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        Ok(builder.ch(self.0))
    }
}

/// Match one code point
#[derive(Debug, Clone, Copy)]
pub struct Cp(pub char);

impl<V> Parslet<V> for Cp {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        Ok(builder.code_point(self.0))
    }
}

/// Match a regular expression at the current index
#[derive(Debug, Clone, Copy)]
pub struct Re<'a>(pub &'a str);

impl<'a, V> Parslet<V> for Re<'a> {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        builder.regex(self.0)
    }
}

/// Match any single code point
#[derive(Debug, Clone, Copy, Default)]
pub struct Any;

impl<V> Parslet<V> for Any {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        Ok(builder.any_code_point())
    }
}

/// Match the end of input
#[derive(Debug, Clone, Copy, Default)]
pub struct Eoi;

impl<V> Parslet<V> for Eoi {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        Ok(builder.eoi())
    }
}

/// Match any byte of a set
#[derive(Debug, Clone, Copy)]
pub struct OneOf<'a>(pub &'a [u8]);

impl<'a, V> Parslet<V> for OneOf<'a> {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        Ok(builder.any_of(self.0))
    }
}

/// Match the longest of several strings
#[derive(Debug, Clone)]
pub struct Strings(pub Vec<String>);

impl<V> Parslet<V> for Strings {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        builder.strings(self.0)
    }
}

/// Match a byte of a named character class
#[derive(Debug, Clone, Copy)]
pub struct Class(pub CharacterPattern);

impl<V> Parslet<V> for Class {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        Ok(builder.class(self.0))
    }
}

// ============================================================================
// Composite parslets
// ============================================================================

/// Sequence of two parslets; chains with `>>` stay one flat sequence
#[derive(Debug, Clone, Copy)]
pub struct Then<A, B> {
    first: A,
    second: B,
}

impl<V, A: Parslet<V>, B: Parslet<V>> Parslet<V> for Then<A, B> {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        let mut children = Vec::new();
        self.build_sequence_items(builder, &mut children)?;
        Ok(builder.sequence(children))
    }

    fn build_sequence_items(
        self,
        builder: &mut GrammarBuilder<V>,
        out: &mut Vec<RuleId>,
    ) -> Result<(), GrammarError> {
        self.first.build_sequence_items(builder, out)?;
        self.second.build_sequence_items(builder, out)
    }
}

/// Ordered choice of two parslets; chains with `|` stay one flat choice
#[derive(Debug, Clone, Copy)]
pub struct Or<A, B> {
    first: A,
    second: B,
}

impl<V, A: Parslet<V>, B: Parslet<V>> Parslet<V> for Or<A, B> {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        let mut children = Vec::new();
        self.build_choice_items(builder, &mut children)?;
        Ok(builder.first_of(children))
    }

    fn build_choice_items(
        self,
        builder: &mut GrammarBuilder<V>,
        out: &mut Vec<RuleId>,
    ) -> Result<(), GrammarError> {
        self.first.build_choice_items(builder, out)?;
        self.second.build_choice_items(builder, out)
    }
}

impl<A, B, C> Shr<C> for Then<A, B> {
    type Output = Then<Then<A, B>, C>;

    fn shr(self, rhs: C) -> Self::Output {
        Then {
            first: self,
            second: rhs,
        }
    }
}

impl<A, B, C> BitOr<C> for Or<A, B> {
    type Output = Or<Or<A, B>, C>;

    fn bitor(self, rhs: C) -> Self::Output {
        Or {
            first: self,
            second: rhs,
        }
    }
}

/// A sequence of same-typed parslets
#[derive(Debug, Clone)]
pub struct Seq<P>(pub Vec<P>);

impl<V, P: Parslet<V>> Parslet<V> for Seq<P> {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        let children = self
            .0
            .into_iter()
            .map(|p| p.build(builder))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(builder.sequence(children))
    }
}

/// A choice of same-typed parslets
#[derive(Debug, Clone)]
pub struct Choice<P>(pub Vec<P>);

impl<V, P: Parslet<V>> Parslet<V> for Choice<P> {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        let children = self
            .0
            .into_iter()
            .map(|p| p.build(builder))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(builder.first_of(children))
    }
}

/// Repetition between `min` and `max` times
#[derive(Debug, Clone, Copy)]
pub struct Repeat<P> {
    inner: P,
    min: usize,
    max: Option<usize>,
}

impl<V, P: Parslet<V>> Parslet<V> for Repeat<P> {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        let child = self.inner.build(builder)?;
        builder.repeat(child, self.min, self.max)
    }
}

/// The inner parslet, or nothing
#[derive(Debug, Clone, Copy)]
pub struct Optional<P>(P);

impl<V, P: Parslet<V>> Parslet<V> for Optional<P> {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        let child = self.0.build(builder)?;
        Ok(builder.optional(child))
    }
}

/// Lookahead; `positive == false` is a negative lookahead
#[derive(Debug, Clone, Copy)]
pub struct Lookahead<P> {
    inner: P,
    positive: bool,
}

impl<V, P: Parslet<V>> Parslet<V> for Lookahead<P> {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        let child = self.inner.build(builder)?;
        if self.positive {
            Ok(builder.test(child))
        } else {
            Ok(builder.test_not(child))
        }
    }
}

/// Calls a builder function, typically one wrapping a production
#[derive(Debug, Clone, Copy)]
pub struct Call<F>(F);

impl<V, F> Parslet<V> for Call<F>
where
    F: FnOnce(&mut GrammarBuilder<V>) -> Result<RuleId, GrammarError>,
{
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        (self.0)(builder)
    }
}

/// An action callback
pub struct Action<V, F> {
    action: F,
    skippable: bool,
    _value: PhantomData<fn() -> V>,
}

impl<V, F: Clone> Clone for Action<V, F> {
    fn clone(&self) -> Self {
        Action {
            action: self.action.clone(),
            skippable: self.skippable,
            _value: PhantomData,
        }
    }
}

impl<V, F: Copy> Copy for Action<V, F> {}

impl<V, F> Parslet<V> for Action<V, F>
where
    F: Fn(&mut MatchContext<'_, '_, V>) -> Result<bool, ActionError> + Send + Sync + 'static,
{
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        if self.skippable {
            Ok(builder.skippable_action(self.action))
        } else {
            Ok(builder.action(self.action))
        }
    }
}

/// A type-erased parslet (for heterogeneous sequences/choices)
pub struct Dynamic<V>(Box<dyn DynParslet<V>>);

/// Trait for type-erased parslets
pub trait DynParslet<V> {
    /// Build this parslet into a grammar
    fn build_boxed(self: Box<Self>, builder: &mut GrammarBuilder<V>)
        -> Result<RuleId, GrammarError>;
}

impl<V, P: Parslet<V>> DynParslet<V> for P {
    fn build_boxed(
        self: Box<Self>,
        builder: &mut GrammarBuilder<V>,
    ) -> Result<RuleId, GrammarError> {
        (*self).build(builder)
    }
}

impl<V> Parslet<V> for Dynamic<V> {
    fn build(self, builder: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
        self.0.build_boxed(builder)
    }
}

// ============================================================================
// Extension trait for Parslet
// ============================================================================

/// Combinator methods shared by every DSL parslet
pub trait ParsletExt: Sized {
    /// Sequence: `self` then `other`
    fn then<B>(self, other: B) -> Then<Self, B> {
        Then {
            first: self,
            second: other,
        }
    }

    /// Ordered choice: `self`, else `other`
    fn or<B>(self, other: B) -> Or<Self, B> {
        Or {
            first: self,
            second: other,
        }
    }

    /// Match zero or one time
    fn optional(self) -> Optional<Self> {
        Optional(self)
    }

    /// Match zero or more times
    fn many(self) -> Repeat<Self> {
        self.repeat(0, None)
    }

    /// Match one or more times
    fn many1(self) -> Repeat<Self> {
        self.repeat(1, None)
    }

    /// Match between `min` and `max` times
    fn repeat(self, min: usize, max: Option<usize>) -> Repeat<Self> {
        Repeat {
            inner: self,
            min,
            max,
        }
    }

    /// Positive lookahead (must match, doesn't consume)
    fn test(self) -> Lookahead<Self> {
        Lookahead {
            inner: self,
            positive: true,
        }
    }

    /// Negative lookahead (must NOT match, doesn't consume)
    fn test_not(self) -> Lookahead<Self> {
        Lookahead {
            inner: self,
            positive: false,
        }
    }
}

macro_rules! impl_parslet_ext {
    ($($ty:ty),* $(,)?) => {
        $(impl ParsletExt for $ty {})*
    };
}

impl_parslet_ext!(RuleId, Str<'_>, IStr<'_>, Ch, Cp, Re<'_>, Any, Eoi, OneOf<'_>, Strings, Class);

impl<A, B> ParsletExt for Then<A, B> {}
impl<A, B> ParsletExt for Or<A, B> {}
impl<P> ParsletExt for Seq<P> {}
impl<P> ParsletExt for Choice<P> {}
impl<P> ParsletExt for Repeat<P> {}
impl<P> ParsletExt for Optional<P> {}
impl<P> ParsletExt for Lookahead<P> {}
impl<F> ParsletExt for Call<F> {}
impl<V, F> ParsletExt for Action<V, F> {}
impl<V> ParsletExt for Dynamic<V> {}

// ============================================================================
// Helper Functions
// ============================================================================

/// Match a literal string
pub fn str(s: &str) -> Str<'_> {
    Str(s)
}

/// Match a literal string case-insensitively
pub fn istr(s: &str) -> IStr<'_> {
    IStr(s)
}

/// Match one byte
pub fn ch(byte: u8) -> Ch {
    Ch(byte)
}

/// Match one code point
pub fn cp(c: char) -> Cp {
    Cp(c)
}

/// Match a regular expression
pub fn re(pattern: &str) -> Re<'_> {
    Re(pattern)
}

/// Match any single code point
pub fn any() -> Any {
    Any
}

/// Match the end of input
pub fn eoi() -> Eoi {
    Eoi
}

/// Match any byte of `bytes`
pub fn one_of(bytes: &[u8]) -> OneOf<'_> {
    OneOf(bytes)
}

/// Match the longest of `candidates`
pub fn strings<I, S>(candidates: I) -> Strings
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Strings(candidates.into_iter().map(Into::into).collect())
}

/// Match a byte of a named character class
pub fn class(pattern: CharacterPattern) -> Class {
    Class(pattern)
}

/// Create a sequence from multiple parslets
pub fn seq<I, P>(items: I) -> Seq<P>
where
    I: IntoIterator<Item = P>,
{
    Seq(items.into_iter().collect())
}

/// Create a choice from multiple parslets
pub fn choice<I, P>(items: I) -> Choice<P>
where
    I: IntoIterator<Item = P>,
{
    Choice(items.into_iter().collect())
}

/// Build through a function of the builder, e.g. a production
pub fn call<V, F>(f: F) -> Call<F>
where
    F: FnOnce(&mut GrammarBuilder<V>) -> Result<RuleId, GrammarError>,
{
    Call(f)
}

/// Run a callback with access to the value stack
pub fn action<V, F>(f: F) -> Action<V, F>
where
    F: Fn(&mut MatchContext<'_, '_, V>) -> Result<bool, ActionError> + Send + Sync + 'static,
{
    Action {
        action: f,
        skippable: false,
        _value: PhantomData,
    }
}

/// Like [`action`], but succeeds without running inside a lookahead
pub fn skippable_action<V, F>(f: F) -> Action<V, F>
where
    F: Fn(&mut MatchContext<'_, '_, V>) -> Result<bool, ActionError> + Send + Sync + 'static,
{
    Action {
        action: f,
        skippable: true,
        _value: PhantomData,
    }
}

/// Convert any parslet to a dynamic one
pub fn dynamic<V, P: Parslet<V> + 'static>(p: P) -> Dynamic<V> {
    Dynamic(Box::new(p))
}
