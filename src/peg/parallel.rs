//! Batch parsing
//!
//! Runs one grammar over many independent inputs. Every input gets its own
//! runner and value stack; the grammar is shared read-only.
//!
//! With the `parallel` feature the inputs are spread over rayon's thread
//! pool, otherwise they are parsed one after another. Results come back in
//! input order either way.
//!
//! ```toml
//! [dependencies]
//! pegknot = { version = "0.1", features = ["parallel"] }
//! ```

use super::error::ParseError;
use super::grammar::Grammar;
use super::runner::{ParseResult, ParseRunner, RunnerConfig};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of one input in a batch
pub type BatchResult<V> = Result<ParseResult<V>, ParseError>;

/// Parse every input with default limits
///
/// # Example
///
/// ```rust
/// use pegknot::peg::{parallel::parse_batch, GrammarBuilder};
///
/// let mut b = GrammarBuilder::<()>::new();
/// let root = b.string("hello");
/// let grammar = b.build(root).unwrap();
///
/// let results = parse_batch(&grammar, &["hello", "world"]);
/// assert!(results[0].as_ref().unwrap().matched);
/// assert!(!results[1].as_ref().unwrap().matched);
/// ```
pub fn parse_batch<V>(grammar: &Grammar<V>, inputs: &[&str]) -> Vec<BatchResult<V>>
where
    V: Clone + Send + Sync,
{
    parse_batch_with_config(grammar, inputs, RunnerConfig::default())
}

/// Parse every input with explicit limits
#[cfg(feature = "parallel")]
pub fn parse_batch_with_config<V>(
    grammar: &Grammar<V>,
    inputs: &[&str],
    config: RunnerConfig,
) -> Vec<BatchResult<V>>
where
    V: Clone + Send + Sync,
{
    log_debug!("parallel batch of {} inputs", inputs.len());
    inputs
        .par_iter()
        .map(|input| ParseRunner::with_config(grammar, config).run(input))
        .collect()
}

/// Parse every input with explicit limits (sequential fallback)
#[cfg(not(feature = "parallel"))]
pub fn parse_batch_with_config<V>(
    grammar: &Grammar<V>,
    inputs: &[&str],
    config: RunnerConfig,
) -> Vec<BatchResult<V>>
where
    V: Clone + Send + Sync,
{
    log_debug!("sequential batch of {} inputs", inputs.len());
    inputs
        .iter()
        .map(|input| ParseRunner::with_config(grammar, config).run(input))
        .collect()
}

/// Parse owned inputs with default limits
#[cfg(feature = "parallel")]
pub fn parse_batch_owned<V>(grammar: &Grammar<V>, inputs: Vec<String>) -> Vec<BatchResult<V>>
where
    V: Clone + Send + Sync,
{
    inputs
        .into_par_iter()
        .map(|input| ParseRunner::new(grammar).run(&input))
        .collect()
}

/// Parse owned inputs with default limits (sequential fallback)
#[cfg(not(feature = "parallel"))]
pub fn parse_batch_owned<V>(grammar: &Grammar<V>, inputs: Vec<String>) -> Vec<BatchResult<V>>
where
    V: Clone + Send + Sync,
{
    inputs
        .into_iter()
        .map(|input| ParseRunner::new(grammar).run(&input))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peg::builder::GrammarBuilder;
    use crate::peg::value::Value;

    fn word_grammar() -> Grammar<Value> {
        let mut b = GrammarBuilder::<Value>::new();
        let word = b.regex("[a-z]+").unwrap();
        let push = b.action(|ctx| {
            let text = ctx.previous_match().unwrap_or_default();
            ctx.stack_mut().push(Value::from(text));
            Ok(true)
        });
        let root = b.sequence([word, push]);
        b.build(root).unwrap()
    }

    #[test]
    fn test_results_keep_input_order() {
        let grammar = word_grammar();
        let results = parse_batch(&grammar, &["alpha", "42", "beta"]);

        assert_eq!(results.len(), 3);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.values, vec![Value::from("alpha")]);
        assert!(!results[1].as_ref().unwrap().matched);
        assert_eq!(
            results[2].as_ref().unwrap().top(),
            Some(&Value::from("beta"))
        );
    }

    #[test]
    fn test_each_input_gets_its_own_stack() {
        let grammar = word_grammar();
        let inputs = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        for result in parse_batch_owned(&grammar, inputs) {
            assert_eq!(result.unwrap().values.len(), 1);
        }
    }

    #[test]
    fn test_limits_apply_per_input() {
        let grammar = word_grammar();
        let config = RunnerConfig::new().with_max_input_size(3);
        let results = parse_batch_with_config(&grammar, &["abc", "abcd"], config);

        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(ParseError::InputTooLarge { input_size: 4, .. })
        ));
    }
}
