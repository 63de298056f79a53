//! Rule matching
//!
//! One match arm per [`Rule`] variant. Every arm reports ordinary failure as
//! `Ok(false)` and leaves the context's index where it was; composite arms
//! descend through [`MatchContext::run_child`], which only moves this context
//! forward when the child succeeded.

use super::context::MatchContext;
use super::error::ParseError;
use super::rule::{Rule, RuleId};
use std::sync::Arc;

/// Match the context's rule at its current index
pub(crate) fn match_rule<V: Clone>(ctx: &mut MatchContext<'_, '_, V>) -> Result<bool, ParseError> {
    let rule = ctx.rule();
    let pos = ctx.current_index();
    let bytes = ctx.buffer().as_bytes();

    match rule {
        Rule::Empty => Ok(true),

        Rule::Never => Ok(false),

        Rule::EndOfInput => Ok(pos == bytes.len()),

        Rule::AnyChar => Ok(consume_byte(ctx, |_| true)),

        Rule::AnyCodePoint => Ok(consume_code_point(ctx, |_| true)),

        Rule::Char { byte, ignore_case } => {
            let byte = *byte;
            if *ignore_case {
                Ok(consume_byte(ctx, |b| b.eq_ignore_ascii_case(&byte)))
            } else {
                Ok(consume_byte(ctx, |b| b == byte))
            }
        }

        Rule::CharRange { low, high } => Ok(consume_byte(ctx, |b| (*low..=*high).contains(&b))),

        Rule::CharSet { set, negated } => Ok(consume_byte(ctx, |b| set.contains(b) != *negated)),

        Rule::CodePoint { value, ignore_case } => {
            let value = *value;
            if *ignore_case {
                Ok(consume_code_point(ctx, |c| chars_eq_ignore_case(c, value)))
            } else {
                Ok(consume_code_point(ctx, |c| c == value))
            }
        }

        Rule::CodePointRange { low, high } => {
            Ok(consume_code_point(ctx, |c| (*low..=*high).contains(&c)))
        }

        Rule::CodePointSet { set, negated } => {
            Ok(consume_code_point(ctx, |c| set.contains(&c) != *negated))
        }

        Rule::CharPredicate { predicate, .. } => Ok(consume_byte(ctx, |b| predicate(b))),

        Rule::CodePointPredicate { predicate, .. } => {
            Ok(consume_code_point(ctx, |c| predicate(c)))
        }

        Rule::String {
            literal,
            ignore_case,
        } => {
            let matched_len = if *ignore_case {
                ctx.buffer()
                    .as_str()
                    .get(pos..)
                    .and_then(|rest| match_string_ignore_case(rest, literal))
            } else if bytes[pos..].starts_with(literal.as_bytes()) {
                Some(literal.len())
            } else {
                None
            };
            match matched_len {
                Some(n) => {
                    ctx.advance_by(n);
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        Rule::StringSet { trie } => match trie.longest_match(&bytes[pos..]) {
            Some(n) => {
                ctx.advance_by(n);
                Ok(true)
            }
            None => Ok(false),
        },

        Rule::Regex { regex, .. } => {
            let Some(rest) = ctx.buffer().as_str().get(pos..) else {
                return Ok(false);
            };
            match regex.find(rest) {
                Some(m) => {
                    ctx.advance_by(m.end());
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        Rule::Sequence { children } => match_sequence(ctx, children),

        Rule::FirstOf { children } => {
            for &child in children {
                if ctx.run_child(child)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }

        Rule::Optional { child } => {
            ctx.run_child(*child)?;
            Ok(true)
        }

        Rule::Repeat { child, min, max } => match_repeat(ctx, *child, *min, *max),

        Rule::Test { child } => {
            ctx.stack_mut().take_snapshot();
            let matched = ctx.probe_child(*child);
            ctx.stack_mut().restore_snapshot()?;
            matched
        }

        Rule::TestNot { child } => {
            ctx.stack_mut().take_snapshot();
            let matched = ctx.probe_child(*child);
            ctx.stack_mut().restore_snapshot()?;
            Ok(!matched?)
        }

        Rule::Action { action, skippable } => {
            if *skippable && ctx.in_predicate() {
                return Ok(true);
            }
            ctx.stack_mut().take_snapshot();
            match action(ctx) {
                Ok(true) => {
                    ctx.stack_mut().discard_snapshot()?;
                    Ok(true)
                }
                Ok(false) => {
                    ctx.stack_mut().restore_snapshot()?;
                    Ok(false)
                }
                Err(source) => {
                    ctx.stack_mut().restore_snapshot()?;
                    Err(ParseError::ActionFailed {
                        rule: ctx.rule_id(),
                        index: ctx.current_index(),
                        source: Arc::from(source),
                    })
                }
            }
        }

        Rule::Conditional {
            condition,
            then,
            otherwise,
        } => {
            if condition(ctx) {
                ctx.run_child(*then)
            } else if let Some(otherwise) = otherwise {
                ctx.run_child(*otherwise)
            } else {
                Ok(true)
            }
        }

        Rule::Reference { key } => {
            log_warn!(
                "unresolved reference to production {} matched at {}",
                key,
                pos
            );
            Ok(false)
        }
    }
}

fn match_sequence<V: Clone>(
    ctx: &mut MatchContext<'_, '_, V>,
    children: &[RuleId],
) -> Result<bool, ParseError> {
    ctx.stack_mut().take_snapshot();
    for &child in children {
        match ctx.run_child(child) {
            Ok(true) => {}
            Ok(false) => {
                ctx.stack_mut().restore_snapshot()?;
                return Ok(false);
            }
            Err(err) => {
                ctx.stack_mut().restore_snapshot()?;
                return Err(err);
            }
        }
    }
    ctx.stack_mut().discard_snapshot()?;
    Ok(true)
}

// No snapshot of its own: a failing last attempt is only undone when the
// child rolls itself back (Sequence, Action).
fn match_repeat<V: Clone>(
    ctx: &mut MatchContext<'_, '_, V>,
    child: RuleId,
    min: usize,
    max: Option<usize>,
) -> Result<bool, ParseError> {
    let mut count = 0;
    while max.map_or(true, |max| count < max) {
        let before = ctx.current_index();
        if !ctx.run_child(child)? {
            break;
        }
        count += 1;
        if max.is_none() && ctx.current_index() == before {
            break;
        }
    }
    Ok(count >= min)
}

/// Consume one byte if `accept` holds for it
#[inline]
fn consume_byte<V>(ctx: &mut MatchContext<'_, '_, V>, accept: impl Fn(u8) -> bool) -> bool {
    match ctx.buffer().as_bytes().get(ctx.current_index()) {
        Some(&b) if accept(b) => {
            ctx.advance_by(1);
            true
        }
        _ => false,
    }
}

/// Consume one code point if `accept` holds for it
#[inline]
fn consume_code_point<V>(
    ctx: &mut MatchContext<'_, '_, V>,
    accept: impl Fn(char) -> bool,
) -> bool {
    match ctx.buffer().peek_code_point(ctx.current_index()) {
        Some(c) if accept(c) => {
            ctx.advance_by(c.len_utf8());
            true
        }
        _ => false,
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Length of the input prefix equal to `literal` (already lowercased)
/// under case folding
fn match_string_ignore_case(rest: &str, literal: &str) -> Option<usize> {
    if literal.is_ascii() {
        let n = literal.len();
        let candidate = rest.as_bytes().get(..n)?;
        return candidate
            .eq_ignore_ascii_case(literal.as_bytes())
            .then_some(n);
    }

    let mut expected = literal.chars();
    let mut consumed = 0;
    let mut pending = expected.next();
    for c in rest.chars() {
        let Some(_) = pending else { break };
        for lower in c.to_lowercase() {
            if pending != Some(lower) {
                return None;
            }
            pending = expected.next();
        }
        consumed += c.len_utf8();
    }
    pending.is_none().then_some(consumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peg::builder::GrammarBuilder;
    use crate::peg::grammar::Grammar;

    fn run<V: Clone>(grammar: &Grammar<V>, input: &str) -> (bool, usize) {
        let result = grammar.parse(input).unwrap();
        (result.matched, result.end_index)
    }

    #[test]
    fn test_char_variants() {
        let mut b = GrammarBuilder::<()>::new();
        let root = b.ch_ignore_case(b'k');
        let g = b.build(root).unwrap();
        assert_eq!(run(&g, "K"), (true, 1));
        assert_eq!(run(&g, "x"), (false, 0));
        assert_eq!(run(&g, ""), (false, 0));
    }

    #[test]
    fn test_code_point_advances_utf8_width() {
        let mut b = GrammarBuilder::<()>::new();
        let root = b.code_point('é');
        let g = b.build(root).unwrap();
        assert_eq!(run(&g, "éa"), (true, 2));
    }

    #[test]
    fn test_any_code_point_rejects_mid_character() {
        let mut b = GrammarBuilder::<()>::new();
        let any = b.any_char();
        let cp = b.any_code_point();
        let root = b.sequence([any, cp]);
        let g = b.build(root).unwrap();
        assert_eq!(run(&g, "é"), (false, 0));
        assert_eq!(run(&g, "aé"), (true, 3));
    }

    #[test]
    fn test_string_ignore_case() {
        assert_eq!(match_string_ignore_case("HeLLo!", "hello"), Some(5));
        assert_eq!(match_string_ignore_case("HEL", "hello"), None);
        assert_eq!(match_string_ignore_case("ÉTÉ x", "été"), Some(5));
        assert_eq!(match_string_ignore_case("ÉTA", "été"), None);
    }

    #[test]
    fn test_regex_is_anchored() {
        let mut b = GrammarBuilder::<()>::new();
        let root = b.regex("[0-9]+").unwrap();
        let g = b.build(root).unwrap();
        assert_eq!(run(&g, "123abc"), (true, 3));
        assert_eq!(run(&g, "a123"), (false, 0));
    }

    #[test]
    fn test_unbounded_repeat_stops_without_progress() {
        let mut b = GrammarBuilder::<()>::new();
        let empty = b.empty();
        let root = b.zero_or_more(empty);
        let g = b.build(root).unwrap();
        assert_eq!(run(&g, "abc"), (true, 0));
    }

    #[test]
    fn test_conditional_branches() {
        let mut b = GrammarBuilder::<()>::new();
        let a = b.ch(b'a');
        let x = b.ch(b'x');
        let at_start = b.conditional(|ctx| ctx.current_index() == 0, a, Some(x));
        let root = b.one_or_more(at_start);
        let g = b.build(root).unwrap();
        assert_eq!(run(&g, "axxb"), (true, 3));
        assert_eq!(run(&g, "xa"), (false, 0));
    }
}
