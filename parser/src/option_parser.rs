//! Option tokenizer.
//!
//! Splits a token list into option values and positional tokens in one
//! left-to-right pass. Tokens are classified in order:
//!
//! 1. `--name[=value]`: long option.
//! 2. `-X[value]`: short option; the value is either `=`-prefixed or
//!    directly appended (`-nFoo`), and for flags the suffix is a cluster of
//!    further short flags (`-abc`).
//! 3. Anything else is positional and kept in order.
//!
//! A value option without an inline value takes the next token unless that
//! token starts with `-`. Problems are collected, never raised, so the scan
//! always runs to the end.

use std::collections::VecDeque;
use std::sync::LazyLock;

use command_grammar_core::{OptionSpec, ParamMap, ParseContext, ParseError, Value};
use regex::Regex;
use tracing::{debug, trace};

static LONG_OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A(?P<name>--[^=]*)(?:=(?P<value>.*))?").expect("static regex must compile")
});
static SHORT_OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A(?P<name>-.)(?P<value>.+)?").expect("static regex must compile")
});

/// Result of one tokenizer pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionScan {
    /// Option values, seeded with the defaults given to the parser.
    pub options: ParamMap,
    /// Positional tokens in their original order.
    pub arguments: Vec<String>,
    /// Unknown option tokens (and their values) kept in skip mode.
    pub skipped_options: Vec<String>,
    /// Every problem found, in encounter order.
    pub errors: Vec<ParseError>,
}

/// Inline value attached to an option token.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Inline {
    /// `--name=value` or `-n=value`.
    Assigned(String),
    /// `-nvalue`.
    Attached(String),
}

impl Inline {
    fn into_value(self) -> String {
        match self {
            Inline::Assigned(value) | Inline::Attached(value) => value,
        }
    }
}

/// Single-pass option tokenizer over one grammar.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{CommandGrammar, OptionSpec, ParseContext, Value};
/// use command_grammar_parser::OptionParser;
///
/// let grammar = CommandGrammar::builder("display")
///     .option(OptionSpec::new("echo", "Echo"))
///     .option(OptionSpec::flag("verbose", "Verbose"))
///     .build()
///     .unwrap();
///
/// let tokens = vec!["msg".to_string(), "-e".to_string(), "hi".to_string(), "-v".to_string()];
/// let scan = OptionParser::new(ParseContext::new(&grammar, 0), &tokens, grammar.option_defaults())
///     .parse();
///
/// assert_eq!(scan.arguments, vec!["msg"]);
/// assert_eq!(scan.options.get("echo"), Some(&Value::from("hi")));
/// assert_eq!(scan.options.get("verbose"), Some(&Value::Bool(true)));
/// assert!(scan.errors.is_empty());
/// ```
#[derive(Debug)]
pub struct OptionParser<'g> {
    ctx: ParseContext<'g>,
    tokens: VecDeque<String>,
    scan: OptionScan,
}

impl<'g> OptionParser<'g> {
    /// Prepares a pass over `tokens`; `options` holds the seeded defaults.
    pub fn new(ctx: ParseContext<'g>, tokens: &[String], options: ParamMap) -> Self {
        Self {
            ctx,
            tokens: tokens.iter().cloned().collect(),
            scan: OptionScan {
                options,
                ..OptionScan::default()
            },
        }
    }

    /// Consumes every token and returns the collected state.
    pub fn parse(mut self) -> OptionScan {
        while self.parse_next() {}
        self.scan
    }

    /// Handles one token; returns `false` once the input is exhausted.
    fn parse_next(&mut self) -> bool {
        let Some(token) = self.tokens.pop_front() else {
            return false;
        };

        if let Some(caps) = LONG_OPTION_RE.captures(&token) {
            let name = caps["name"].to_string();
            let value = caps.name("value").map(|v| Inline::Assigned(v.as_str().to_string()));
            trace!(token = %token, kind = "long", "classified token");
            self.parse_long(&name, value);
        } else if let Some(caps) = SHORT_OPTION_RE.captures(&token) {
            let name = caps["name"].to_string();
            let value = caps.name("value").map(|v| {
                let raw = v.as_str();
                match raw.strip_prefix('=') {
                    Some(assigned) => Inline::Assigned(assigned.to_string()),
                    None => Inline::Attached(raw.to_string()),
                }
            });
            trace!(token = %token, kind = "short", "classified token");
            self.parse_short(&name, value);
        } else {
            trace!(token = %token, kind = "positional", "classified token");
            self.scan.arguments.push(token);
        }
        true
    }

    fn parse_long(&mut self, name: &str, value: Option<Inline>) {
        match self.ctx.grammar().find_option_by_long(name) {
            Some(option) => self.parse_option(option, value),
            None => self.handle_unknown_option(name, value.map(Inline::into_value)),
        }
    }

    fn parse_short(&mut self, name: &str, value: Option<Inline>) {
        match self.ctx.grammar().find_option_by_short(name) {
            Some(option) => self.parse_option(option, value),
            None => self.handle_unknown_option(name, value.map(Inline::into_value)),
        }
    }

    fn parse_option(&mut self, option: &'g OptionSpec, value: Option<Inline>) {
        if option.is_flag() {
            return self.parse_flag_option(option, value);
        }

        match self.complete(value.map(Inline::into_value)) {
            Some(value) => self.trigger(option, Value::String(value)),
            None if option.is_argument_optional() => self.trigger(option, Value::Bool(true)),
            None => {
                debug!(option = option.label(), "option value missing");
                self.add_error(ParseError::MissingOptionArgument(option.label().to_string()));
            }
        }
    }

    /// Takes the next token as the value when none was given inline and the
    /// next token does not look like an option.
    fn complete(&mut self, value: Option<String>) -> Option<String> {
        if value.is_some() {
            return value;
        }
        if self.tokens.front().is_some_and(|next| !next.starts_with('-')) {
            return self.tokens.pop_front();
        }
        None
    }

    fn parse_flag_option(&mut self, option: &'g OptionSpec, value: Option<Inline>) {
        match value {
            None => self.trigger(option, Value::Bool(true)),
            Some(Inline::Assigned(value)) => {
                debug!(option = option.label(), value = %value, "flag given a value");
                self.add_error(ParseError::OptionUnexpectedArgument {
                    option: option.label().to_string(),
                    value,
                });
            }
            Some(Inline::Attached(cluster)) => {
                self.trigger(option, Value::Bool(true));
                self.parse_compact_flag_options(&cluster);
            }
        }
    }

    /// Expands `bc` of `-abc` into `-b -c`.
    fn parse_compact_flag_options(&mut self, cluster: &str) {
        for c in cluster.chars() {
            let name = format!("-{c}");
            let Some(option) = self.ctx.grammar().find_option_by_short(&name) else {
                self.handle_unknown_option(&name, None);
                continue;
            };
            if !option.is_flag() {
                self.add_error(ParseError::Option {
                    option: option.label().to_string(),
                    message: format!(
                        "Cannot combine short options that expect argument: {}",
                        option.label()
                    ),
                });
                break;
            }
            self.trigger(option, Value::Bool(true));
        }
    }

    fn handle_unknown_option(&mut self, name: &str, value: Option<String>) {
        if !self.ctx.grammar().skip_options() {
            debug!(option = name, command = self.ctx.grammar().name(), "unknown option");
            self.add_error(ParseError::UnknownOption(name.to_string()));
            return;
        }
        let value = self.complete(value);
        self.scan.skipped_options.push(name.to_string());
        self.scan.skipped_options.extend(value);
    }

    fn trigger(&mut self, option: &OptionSpec, value: Value) {
        if let Err(err) = option.trigger(&self.ctx, &mut self.scan.options, value) {
            self.add_error(err);
        }
    }

    fn add_error(&mut self, err: ParseError) {
        self.scan.errors.push(err);
    }
}

#[cfg(test)]
mod tests {
    use command_grammar_core::{CommandGrammar, OptionSpec, ValueType};

    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn scan(grammar: &CommandGrammar, items: &[&str]) -> OptionScan {
        OptionParser::new(
            ParseContext::new(grammar, 0),
            &tokens(items),
            grammar.option_defaults(),
        )
        .parse()
    }

    fn flags_grammar() -> CommandGrammar {
        CommandGrammar::builder("flags")
            .option(OptionSpec::flag("a", "A"))
            .option(OptionSpec::flag("b", "B"))
            .option(OptionSpec::flag("c", "C"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_regexes_split_name_and_value() {
        let caps = LONG_OPTION_RE.captures("--name=a=b").unwrap();
        assert_eq!(&caps["name"], "--name");
        assert_eq!(&caps["value"], "a=b");

        let caps = SHORT_OPTION_RE.captures("-nValue").unwrap();
        assert_eq!(&caps["name"], "-n");
        assert_eq!(&caps["value"], "Value");

        assert!(SHORT_OPTION_RE.captures("-").is_none());
        assert!(SHORT_OPTION_RE.captures("plain").is_none());
    }

    #[test]
    fn test_value_forms_are_equivalent() {
        let grammar = CommandGrammar::builder("opt")
            .option(OptionSpec::new("name", "Name"))
            .build()
            .unwrap();

        for form in [
            &["--name=Value"][..],
            &["--name", "Value"][..],
            &["-nValue"][..],
            &["-n=Value"][..],
            &["-n", "Value"][..],
        ] {
            let result = scan(&grammar, form);
            assert!(result.errors.is_empty(), "{form:?}: {:?}", result.errors);
            assert_eq!(result.options.get("name"), Some(&Value::from("Value")), "{form:?}");
        }
    }

    #[test]
    fn test_flag_cluster() {
        let result = scan(&flags_grammar(), &["-abc"]);
        assert!(result.errors.is_empty());
        for key in ["a", "b", "c"] {
            assert_eq!(result.options.get(key), Some(&Value::Bool(true)));
        }
    }

    #[test]
    fn test_flag_cluster_stops_at_value_option() {
        let grammar = CommandGrammar::builder("flags")
            .option(OptionSpec::flag("a", "A"))
            .option(OptionSpec::new("b", "B"))
            .option(OptionSpec::flag("c", "C"))
            .build()
            .unwrap();

        let result = scan(&grammar, &["-abc"]);
        assert_eq!(result.options.get("a"), Some(&Value::Bool(true)));
        assert!(!result.options.contains_key("b"));
        assert!(!result.options.contains_key("c"));
        assert!(matches!(
            result.errors.as_slice(),
            [ParseError::Option { option, .. }] if option == "--b"
        ));
    }

    #[test]
    fn test_flag_with_assigned_value() {
        let grammar = flags_grammar();
        let result = scan(&grammar, &["--a=yes"]);
        assert_eq!(
            result.errors,
            vec![ParseError::OptionUnexpectedArgument {
                option: "--a".into(),
                value: "yes".into()
            }]
        );

        let result = scan(&grammar, &["-a=yes"]);
        assert_eq!(result.errors.len(), 1);
        assert!(!result.options.contains_key("a"));
    }

    #[test]
    fn test_missing_value_not_taken_from_option() {
        let grammar = CommandGrammar::builder("opt")
            .option(OptionSpec::new("name", "Name"))
            .option(OptionSpec::flag("verbose", "Verbose"))
            .build()
            .unwrap();

        let result = scan(&grammar, &["--name", "-v"]);
        assert_eq!(
            result.errors,
            vec![ParseError::MissingOptionArgument("--name".into())]
        );
        assert_eq!(result.options.get("verbose"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_optional_value_marks_presence() {
        let grammar = CommandGrammar::builder("opt")
            .option(OptionSpec::new("require", "Require").argument_optional())
            .build()
            .unwrap();

        let result = scan(&grammar, &["--require"]);
        assert!(result.errors.is_empty());
        assert_eq!(result.options.get("require"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_list_options_accumulate() {
        let grammar = CommandGrammar::builder("list")
            .option(OptionSpec::list("echo", "Echo"))
            .option(OptionSpec::list_flag("line", "Line"))
            .build()
            .unwrap();

        let result = scan(&grammar, &["--echo", "msg1", "--echo", "msg2", "-lll"]);
        assert!(result.errors.is_empty());
        assert_eq!(
            result.options.get("echo"),
            Some(&Value::List(vec!["msg1".into(), "msg2".into()]))
        );
        assert_eq!(result.options.get("line"), Some(&Value::Integer(3)));

        let result = scan(&grammar, &["--line", "-l"]);
        assert_eq!(result.options.get("line"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_unknown_option_reported() {
        let result = scan(&flags_grammar(), &["pos", "--other", "-z"]);
        assert_eq!(
            result.errors,
            vec![
                ParseError::UnknownOption("--other".into()),
                ParseError::UnknownOption("-z".into()),
            ]
        );
        assert_eq!(result.arguments, vec!["pos"]);
    }

    #[test]
    fn test_skip_mode_collects_unknown_options() {
        let grammar = CommandGrammar::builder("skip")
            .skip_options(true)
            .option(OptionSpec::flag("verbose", "Verbose"))
            .build()
            .unwrap();

        let result = scan(
            &grammar,
            &["pos", "arg", "--ignore", "value", "--verbose", "-t"],
        );
        assert!(result.errors.is_empty());
        assert_eq!(result.skipped_options, vec!["--ignore", "value", "-t"]);
        assert_eq!(result.arguments, vec!["pos", "arg"]);
        assert_eq!(result.options.get("verbose"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_cast_failure_is_collected() {
        let grammar = CommandGrammar::builder("typed")
            .option(OptionSpec::new("count", "Count").value_type(ValueType::Integer))
            .build()
            .unwrap();

        let result = scan(&grammar, &["--count", "many", "rest"]);
        assert!(matches!(
            result.errors.as_slice(),
            [ParseError::InvalidOptionValue { value, .. }] if value == "many"
        ));
        assert_eq!(result.arguments, vec!["rest"]);

        let result = scan(&grammar, &["-c7"]);
        assert_eq!(result.options.get("count"), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_help_flag_collects_help_error() {
        let grammar = flags_grammar();
        let result = scan(&grammar, &["-h"]);
        assert_eq!(result.options.get("help"), Some(&Value::Bool(true)));
        assert_eq!(result.errors, vec![ParseError::Help(grammar.help())]);
    }
}
