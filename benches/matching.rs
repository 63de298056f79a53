//! Matching benchmarks
//!
//! 1. Calculator - recursive productions with actions folding values
//! 2. Keywords - string set vs. ordered choice of strings
//! 3. Nesting - deeply recursive input
//!
//! Run with: cargo bench --bench matching

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pegknot::peg::parser_dsl::*;
use pegknot::peg::{
    ActionError, Grammar, GrammarBuilder, GrammarError, MatchContext, RuleId, Value,
};

// ============================================================================
// Calculator
// ============================================================================

mod calc {
    use super::*;

    type Ctx<'c, 'a> = MatchContext<'c, 'a, Value>;

    fn number(b: &mut GrammarBuilder<Value>) -> Result<RuleId, GrammarError> {
        b.production("number", |b| {
            re("[0-9]+")
                .then(action(|ctx: &mut Ctx<'_, '_>| {
                    let text = ctx.previous_match().unwrap_or_default();
                    ctx.stack_mut().push(Value::Int(text.parse()?));
                    Ok(true)
                }))
                .build(b)
        })
    }

    fn fold(
        op: fn(i64, i64) -> i64,
    ) -> impl Fn(&mut Ctx<'_, '_>) -> Result<bool, ActionError> + Send + Sync + 'static {
        move |ctx: &mut Ctx<'_, '_>| {
            let rhs = ctx.stack_mut().pop()?;
            let lhs = ctx.stack_mut().pop()?;
            match (lhs.as_int(), rhs.as_int()) {
                (Some(l), Some(r)) => {
                    ctx.stack_mut().push(Value::Int(op(l, r)));
                    Ok(true)
                }
                _ => Err("operands must be integers".into()),
            }
        }
    }

    // atom := number / '(' expr ')'
    fn atom(b: &mut GrammarBuilder<Value>) -> Result<RuleId, GrammarError> {
        b.production("atom", |b| {
            let nested = ch(b'(').then(call(expr)).then(ch(b')'));
            number(b)?.or(nested).build(b)
        })
    }

    // term := atom ('*' atom)*
    fn term(b: &mut GrammarBuilder<Value>) -> Result<RuleId, GrammarError> {
        b.production("term", |b| {
            let times = ch(b'*')
                .then(call(atom))
                .then(action(fold(|l, r| l.wrapping_mul(r))));
            call(atom).then(times.many()).build(b)
        })
    }

    // expr := term ('+' term)*
    pub fn expr(b: &mut GrammarBuilder<Value>) -> Result<RuleId, GrammarError> {
        b.production("expr", |b| {
            let plus = ch(b'+')
                .then(call(term))
                .then(action(fold(|l, r| l.wrapping_add(r))));
            call(term).then(plus.many()).build(b)
        })
    }

    pub fn grammar() -> Grammar<Value> {
        let mut b = GrammarBuilder::new();
        let root = expr(&mut b).unwrap();
        b.build(root).unwrap()
    }

    pub fn input(terms: usize) -> String {
        (0..terms)
            .map(|i| format!("({}*{}+{})", i, i + 1, i + 2))
            .collect::<Vec<_>>()
            .join("+")
    }
}

fn bench_calc(c: &mut Criterion) {
    let grammar = calc::grammar();
    let mut group = c.benchmark_group("calc");

    for terms in [10, 100, 1000] {
        let input = calc::input(terms);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(terms), &input, |b, input| {
            b.iter(|| {
                let result = grammar.parse(black_box(input)).unwrap();
                black_box(result.values)
            })
        });
    }
    group.finish();
}

// ============================================================================
// Keywords
// ============================================================================

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
    "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

fn keyword_grammar(use_set: bool) -> Grammar<()> {
    let mut b = GrammarBuilder::new();
    let keyword = if use_set {
        b.strings(KEYWORDS.iter().copied()).unwrap()
    } else {
        let mut by_length: Vec<&str> = KEYWORDS.to_vec();
        by_length.sort_by_key(|k| std::cmp::Reverse(k.len()));
        let alternatives: Vec<RuleId> = by_length.into_iter().map(|k| b.string(k)).collect();
        b.first_of(alternatives)
    };
    let root = keyword
        .then(ch(b' ').optional())
        .many()
        .then(eoi())
        .build(&mut b)
        .unwrap();
    b.build(root).unwrap()
}

fn bench_keywords(c: &mut Criterion) {
    let input = KEYWORDS.repeat(20).join(" ");
    let mut group = c.benchmark_group("keywords");
    group.throughput(Throughput::Bytes(input.len() as u64));

    for (name, use_set) in [("string_set", true), ("first_of", false)] {
        let grammar = keyword_grammar(use_set);
        assert!(grammar.parse(&input).unwrap().matched_entire_input);
        group.bench_function(name, |b| {
            b.iter(|| grammar.parse(black_box(&input)).unwrap().matched)
        });
    }
    group.finish();
}

// ============================================================================
// Nesting
// ============================================================================

fn bench_nesting(c: &mut Criterion) {
    let grammar = calc::grammar();
    let mut group = c.benchmark_group("nesting");

    for depth in [10, 25, 50] {
        let input = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &input, |b, input| {
            b.iter(|| grammar.parse(black_box(input)).unwrap().matched_entire_input)
        });
    }
    group.finish();
}

criterion_group!(benches, bench_calc, bench_keywords, bench_nesting);
criterion_main!(benches);
