//! Integration tests for grammar construction and self-referential productions

use pegknot::peg::{
    GrammarBuilder, GrammarError, ParseError, ProductionKey, Rule, RuleId, RunnerConfig,
    DEFAULT_MAX_NESTING_LEVEL,
};

// expr := 'a' / '(' expr ')'
fn expr<V>(b: &mut GrammarBuilder<V>) -> Result<RuleId, GrammarError> {
    b.production("expr", |b| {
        let a = b.ch(b'a');
        let open = b.ch(b'(');
        let inner = expr(b)?;
        let close = b.ch(b')');
        let nested = b.sequence([open, inner, close]);
        Ok(b.first_of([a, nested]))
    })
}

fn nested(depth: usize) -> String {
    format!("{}a{}", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn test_recursive_production_matches_nested_input() {
    let mut b = GrammarBuilder::<()>::new();
    let root = expr(&mut b).unwrap();
    let grammar = b.build(root).unwrap();

    for depth in [0, 1, 5, 100] {
        let result = grammar.parse(&nested(depth)).unwrap();
        assert!(result.matched_entire_input, "depth {}", depth);
    }
    assert!(!grammar.parse("((a)").unwrap().matched);
    assert!(!grammar.parse("b").unwrap().matched);
}

#[test]
fn test_recursive_production_builds_a_cycle() {
    let mut b = GrammarBuilder::<()>::new();
    let root = expr(&mut b).unwrap();
    let grammar = b.build(root).unwrap();

    assert!(grammar.iter().all(|(_, rule)| !rule.is_reference()));
    let Rule::FirstOf { children } = grammar.rule(grammar.root()) else {
        panic!("root should be the choice");
    };
    let Rule::Sequence { children: seq } = grammar.rule(children[1]) else {
        panic!("second alternative should be the sequence");
    };
    assert_eq!(seq[1], grammar.root());
    assert_eq!(grammar.production_name(grammar.root()), Some("expr"));
}

#[test]
fn test_same_production_yields_same_rule() {
    let mut b = GrammarBuilder::<()>::new();
    let first = expr(&mut b).unwrap();
    let second = expr(&mut b).unwrap();
    assert_eq!(first, second);
    assert!(b.is_resolved(&ProductionKey::from("expr")));
}

#[test]
fn test_production_arguments_distinguish_keys() {
    fn keyword(b: &mut GrammarBuilder<()>, word: &'static str) -> Result<RuleId, GrammarError> {
        b.production(ProductionKey::new("keyword").with_arg(word), |b| {
            let text = b.string(word);
            let word_char = b.class(pegknot::peg::CharacterPattern::Word);
            let boundary = b.test_not(word_char);
            Ok(b.sequence([text, boundary]))
        })
    }

    let mut b = GrammarBuilder::<()>::new();
    let if_kw = keyword(&mut b, "if").unwrap();
    let else_kw = keyword(&mut b, "else").unwrap();
    assert_ne!(if_kw, else_kw);
    assert_eq!(keyword(&mut b, "if").unwrap(), if_kw);

    let root = b.first_of([if_kw, else_kw]);
    let grammar = b.build(root).unwrap();
    assert!(grammar.parse("else").unwrap().matched_entire_input);
    assert!(!grammar.parse("elsewhere").unwrap().matched);

    let names: Vec<&str> = grammar.production_names().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["keyword(\"else\")", "keyword(\"if\")"]);
}

#[test]
fn test_mutual_recursion() {
    // list := '[' items? ']'
    // items := list (',' list)*
    fn list(b: &mut GrammarBuilder<()>) -> Result<RuleId, GrammarError> {
        b.production("list", |b| {
            let open = b.ch(b'[');
            let inner = items(b)?;
            let maybe_items = b.optional(inner);
            let close = b.ch(b']');
            Ok(b.sequence([open, maybe_items, close]))
        })
    }

    fn items(b: &mut GrammarBuilder<()>) -> Result<RuleId, GrammarError> {
        b.production("items", |b| {
            let first = list(b)?;
            let comma = b.ch(b',');
            let next = list(b)?;
            let more = b.sequence([comma, next]);
            let rest = b.zero_or_more(more);
            Ok(b.sequence([first, rest]))
        })
    }

    let mut b = GrammarBuilder::new();
    let root = list(&mut b).unwrap();
    let grammar = b.build(root).unwrap();

    for input in ["[]", "[[]]", "[[],[[]],[]]"] {
        assert!(grammar.parse(input).unwrap().matched_entire_input, "{}", input);
    }
    assert!(!grammar.parse("[[]").unwrap().matched);
}

#[test]
fn test_failed_body_is_forgotten() {
    let mut b = GrammarBuilder::<()>::new();
    let mut leaked = None;
    let err = b
        .production("broken", |b| {
            leaked = Some(b.production("broken", |_| unreachable!())?);
            b.regex("(")
        })
        .unwrap_err();
    assert!(matches!(err, GrammarError::InvalidRegex { .. }));
    assert!(!b.is_resolved(&ProductionKey::from("broken")));

    let placeholder = leaked.unwrap();
    assert!(matches!(
        b.build(placeholder),
        Err(GrammarError::UnresolvedReference { key }) if key == "broken"
    ));
}

#[test]
fn test_build_keeps_only_reachable_rules() {
    let mut b = GrammarBuilder::<()>::new();
    let _unused = b.string("unused");
    let x = b.ch(b'x');
    let y = b.ch(b'y');
    let root = b.sequence([x, y]);
    assert_eq!(b.len(), 4);

    let grammar = b.build(root).unwrap();
    assert_eq!(grammar.len(), 3);
    assert_eq!(grammar.root(), RuleId::new(0));
}

#[test]
fn test_invalid_arguments_are_rejected() {
    let mut b = GrammarBuilder::<()>::new();
    let a = b.ch(b'a');
    assert_eq!(
        b.repeat(a, 3, Some(2)),
        Err(GrammarError::InvalidRepeatBounds { min: 3, max: 2 })
    );
    assert!(b.char_range(b'z', b'a').is_err());
    assert!(b.strings(Vec::<String>::new()).is_err());
    assert!(matches!(
        b.regex("[unclosed"),
        Err(GrammarError::InvalidRegex { .. })
    ));
}

#[test]
fn test_deep_nesting_hits_the_limit() {
    let mut b = GrammarBuilder::<()>::new();
    let root = expr(&mut b).unwrap();
    let grammar = b.build(root).unwrap();

    let mut runner = grammar.runner();
    assert!(runner.run(&nested(50)).unwrap().matched_entire_input);

    let mut limited = pegknot::peg::ParseRunner::with_config(
        &grammar,
        RunnerConfig::new().with_max_nesting_level(20),
    );
    assert!(matches!(
        limited.run(&nested(50)),
        Err(ParseError::NestingLimitExceeded { max_level: 20, .. })
    ));
    assert!(limited.run(&nested(2)).unwrap().matched_entire_input);
}

#[test]
fn test_left_recursion_stops_at_default_limit() {
    // left := left 'a' / 'a'
    fn left(b: &mut GrammarBuilder<()>) -> Result<RuleId, GrammarError> {
        b.production("left", |b| {
            let inner = left(b)?;
            let a = b.ch(b'a');
            let grow = b.sequence([inner, a]);
            Ok(b.first_of([grow, a]))
        })
    }

    let mut b = GrammarBuilder::new();
    let root = left(&mut b).unwrap();
    let grammar = b.build(root).unwrap();

    assert_eq!(RunnerConfig::default().max_nesting_level, DEFAULT_MAX_NESTING_LEVEL);
    assert!(matches!(
        grammar.parse("aaa"),
        Err(ParseError::NestingLimitExceeded { max_level, .. })
            if max_level == DEFAULT_MAX_NESTING_LEVEL
    ));

    // worker threads get the same protection
    let handle = std::thread::spawn(move || grammar.parse("aaa").is_err());
    assert!(handle.join().unwrap());
}
