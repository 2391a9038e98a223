//! Property-based tests for positional argument matching.
//!
//! - A fixed keyword matches itself and rejects anything else
//! - Optional arguments accept empty input
//! - Multi-value arguments consume every remaining token

use command_grammar_core::{Argument, ParseError, Value};
use proptest::prelude::*;

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,10}"
}

fn tokens_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9._-]{1,12}", 0..8)
}

proptest! {
    #[test]
    fn fixed_keyword_matches_itself(name in name_strategy(), rest in tokens_strategy()) {
        let arg = Argument::parse(&name).unwrap();
        let mut tokens = vec![name.clone()];
        tokens.extend(rest.iter().cloned());

        let (value, left) = arg.consume(&tokens).unwrap();
        prop_assert_eq!(value, Some(Value::String(name)));
        prop_assert_eq!(left, rest.as_slice());
    }

    #[test]
    fn fixed_keyword_rejects_other_tokens(name in name_strategy(), other in name_strategy()) {
        prop_assume!(name != other);
        let arg = Argument::parse(&name).unwrap();
        let err = arg.consume(&[other.clone()]).unwrap_err();
        prop_assert_eq!(err, ParseError::fixed(&name, Some(&other)));
    }

    #[test]
    fn optional_accepts_empty_input(name in name_strategy()) {
        for pattern in [format!("[{name}]"), format!("[<{name}>]"), format!("[<{name}>...]")] {
            let arg = Argument::parse(&pattern).unwrap();
            let (value, left) = arg.consume(&[]).unwrap();
            prop_assert_eq!(value, None);
            prop_assert!(left.is_empty());
        }
    }

    #[test]
    fn multiple_consumes_everything(name in name_strategy(), tokens in tokens_strategy()) {
        prop_assume!(!tokens.is_empty());
        let arg = Argument::parse(&format!("<{name}>...")).unwrap();
        let (value, left) = arg.consume(&tokens).unwrap();

        let expected: Vec<Value> = tokens.iter().map(|t| Value::String(t.clone())).collect();
        prop_assert_eq!(value, Some(Value::List(expected)));
        prop_assert!(left.is_empty());
    }

    #[test]
    fn variable_takes_exactly_one(name in name_strategy(), tokens in tokens_strategy()) {
        let arg = Argument::parse(&format!("<{name}>")).unwrap();
        match arg.consume(&tokens) {
            Ok((value, left)) => {
                prop_assert_eq!(value, Some(Value::String(tokens[0].clone())));
                prop_assert_eq!(left.len(), tokens.len() - 1);
            }
            Err(err) => {
                prop_assert!(tokens.is_empty());
                prop_assert_eq!(err, ParseError::MissingArgument(name));
            }
        }
    }
}
